use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, demo_sensors};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn demo() -> Router {
    app_with(demo_sensors())
}

fn reading_dates(sensor: &Value) -> Vec<&str> {
    sensor["readings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect()
}

// --- list ---

#[tokio::test]
async fn list_empty() {
    let resp = app().oneshot(get("/sensor-data")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sensors: Vec<Value> = body_json(resp).await;
    assert!(sensors.is_empty());
}

#[tokio::test]
async fn list_returns_all_seeded_sensors() {
    let resp = demo().oneshot(get("/sensor-data")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sensors: Vec<Value> = body_json(resp).await;
    assert_eq!(sensors.len(), 3);
}

#[tokio::test]
async fn list_filters_on_fields() {
    let resp = demo()
        .oneshot(get("/sensor-data?location=garden&status=ok"))
        .await
        .unwrap();

    let sensors: Vec<Value> = body_json(resp).await;
    let names: Vec<&str> = sensors.iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Greenhouse", "Soil probe"]);
}

#[tokio::test]
async fn list_filter_on_numeric_id() {
    let resp = demo().oneshot(get("/sensor-data?id=2")).await.unwrap();

    let sensors: Vec<Value> = body_json(resp).await;
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0]["name"], "Attic");
}

#[tokio::test]
async fn list_unknown_filter_matches_nothing() {
    let resp = demo().oneshot(get("/sensor-data?colour=blue")).await.unwrap();

    let sensors: Vec<Value> = body_json(resp).await;
    assert!(sensors.is_empty());
}

// --- detail ---

#[tokio::test]
async fn detail_without_range_returns_all_readings() {
    let resp = demo().oneshot(get("/sensor-data/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sensor: Value = body_json(resp).await;
    assert_eq!(sensor["name"], "Greenhouse");
    assert_eq!(
        reading_dates(&sensor),
        vec!["2024-01-01", "2024-01-15", "2024-02-01"]
    );
}

#[tokio::test]
async fn detail_with_start_date_only() {
    let resp = demo()
        .oneshot(get("/sensor-data/1?start_date=2024-01-10"))
        .await
        .unwrap();

    let sensor: Value = body_json(resp).await;
    assert_eq!(reading_dates(&sensor), vec!["2024-01-15", "2024-02-01"]);
}

#[tokio::test]
async fn detail_with_full_range() {
    let resp = demo()
        .oneshot(get("/sensor-data/1?start_date=2024-01-01&end_date=2024-01-15"))
        .await
        .unwrap();

    let sensor: Value = body_json(resp).await;
    assert_eq!(reading_dates(&sensor), vec!["2024-01-01", "2024-01-15"]);
}

#[tokio::test]
async fn detail_empty_date_is_rejected() {
    let resp = demo()
        .oneshot(get("/sensor-data/1?start_date="))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_bad_date_returns_400() {
    let resp = demo()
        .oneshot(get("/sensor-data/1?end_date=tomorrow"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_encoded_string_id() {
    let resp = demo().oneshot(get("/sensor-data/probe%2F7")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sensor: Value = body_json(resp).await;
    assert_eq!(sensor["id"], "probe/7");
}

#[tokio::test]
async fn detail_not_found() {
    let resp = demo().oneshot(get("/sensor-data/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Sensor not found");
}

// --- update ---

#[tokio::test]
async fn update_merges_fields() {
    let resp = demo()
        .oneshot(json_request(
            "PATCH",
            "/sensor-data/2",
            r#"{"status":"ok","battery":80}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sensor: Value = body_json(resp).await;
    assert_eq!(sensor["status"], "ok");
    assert_eq!(sensor["battery"], 80);
    assert_eq!(sensor["name"], "Attic"); // unchanged
}

#[tokio::test]
async fn update_cannot_change_id() {
    let resp = demo()
        .oneshot(json_request("PATCH", "/sensor-data/2", r#"{"id":99}"#))
        .await
        .unwrap();

    let sensor: Value = body_json(resp).await;
    assert_eq!(sensor["id"], 2);
}

#[tokio::test]
async fn update_non_object_returns_422() {
    let resp = demo()
        .oneshot(json_request("PATCH", "/sensor-data/2", r#"["ok"]"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn update_not_found() {
    let resp = demo()
        .oneshot(json_request("PATCH", "/sensor-data/999", r#"{"status":"ok"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_lives_under_sensors() {
    let resp = demo().oneshot(delete("/sensors/2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, json!({"deleted": 2}));
}

#[tokio::test]
async fn delete_on_sensor_data_path_is_not_routed() {
    let resp = demo().oneshot(delete("/sensor-data/2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn delete_not_found() {
    let resp = demo().oneshot(delete("/sensors/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full lifecycle ---

#[tokio::test]
async fn update_delete_lifecycle() {
    use tower::Service;

    let mut app = demo().into_service();

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            "/sensor-data/probe%2F7",
            r#"{"status":"calibrating"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // list sees the change
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/sensor-data?status=calibrating"))
        .await
        .unwrap();
    let sensors: Vec<Value> = body_json(resp).await;
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0]["id"], "probe/7");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(delete("/sensors/probe%2F7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(!body.is_empty());

    // detail after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/sensor-data/probe%2F7"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/sensor-data"))
        .await
        .unwrap();
    let sensors: Vec<Value> = body_json(resp).await;
    assert_eq!(sensors.len(), 2);
}
