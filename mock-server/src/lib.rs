use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// A sensor record, stored as the raw JSON object the client sent or was
/// seeded with. Keyed by the string form of its `id`.
pub type Sensor = Map<String, Value>;

pub type Db = Arc<RwLock<BTreeMap<String, Sensor>>>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    fn is_unbounded(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router seeded with `sensors`. Entries that are not objects with an `id`
/// are skipped.
pub fn app_with(sensors: impl IntoIterator<Item = Value>) -> Router {
    let mut records = BTreeMap::new();
    for sensor in sensors {
        let Value::Object(sensor) = sensor else {
            tracing::warn!("skipping non-object sensor seed");
            continue;
        };
        match sensor.get("id").and_then(id_key) {
            Some(key) => {
                records.insert(key, sensor);
            }
            None => tracing::warn!("skipping sensor seed without id"),
        }
    }
    let db: Db = Arc::new(RwLock::new(records));
    Router::new()
        .route("/sensor-data", get(list_sensor_data))
        .route(
            "/sensor-data/{id}",
            get(get_sensor_detail).patch(update_sensor),
        )
        .route("/sensors/{id}", delete(delete_sensor))
        .with_state(db)
}

pub async fn run(listener: TcpListener, sensors: Vec<Value>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(sensors)).await
}

/// A few sensors with readings, served by the binary for local development.
pub fn demo_sensors() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Greenhouse",
            "location": "garden",
            "status": "ok",
            "readings": [
                {"date": "2024-01-01", "value": 18.5},
                {"date": "2024-01-15", "value": 19.0},
                {"date": "2024-02-01", "value": 21.25}
            ]
        }),
        json!({
            "id": 2,
            "name": "Attic",
            "location": "house",
            "status": "offline",
            "readings": [
                {"date": "2024-01-03", "value": 4.0}
            ]
        }),
        json!({
            "id": "probe/7",
            "name": "Soil probe",
            "location": "garden",
            "status": "ok",
            "readings": []
        }),
    ]
}

fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Compare a stored field with a query-string value by string form.
fn field_matches(field: &Value, wanted: &str) -> bool {
    match field {
        Value::String(s) => s == wanted,
        Value::Number(n) => n.to_string() == wanted,
        Value::Bool(b) => b.to_string() == wanted,
        _ => false,
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Sensor not found"})),
    )
}

async fn list_sensor_data(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Sensor>> {
    tracing::info!(filters = params.len(), "list sensor data");
    let sensors = db.read().await;
    Json(
        sensors
            .values()
            .filter(|sensor| {
                params.iter().all(|(key, wanted)| {
                    sensor
                        .get(key)
                        .is_some_and(|field| field_matches(field, wanted))
                })
            })
            .cloned()
            .collect(),
    )
}

async fn get_sensor_detail(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(range): Query<DateRange>,
) -> ApiResult<Sensor> {
    tracing::info!(%id, start = ?range.start_date, end = ?range.end_date, "get sensor detail");
    let sensors = db.read().await;
    let mut sensor = sensors.get(&id).cloned().ok_or_else(not_found)?;
    if let Some(Value::Array(readings)) = sensor.get_mut("readings") {
        readings.retain(|reading| reading_in_range(reading, &range));
    }
    Ok(Json(sensor))
}

fn reading_in_range(reading: &Value, range: &DateRange) -> bool {
    if range.is_unbounded() {
        return true;
    }
    reading
        .get("date")
        .and_then(Value::as_str)
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .is_some_and(|date| range.contains(date))
}

async fn update_sensor(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<Value>,
) -> ApiResult<Sensor> {
    tracing::info!(%id, "update sensor");
    let Value::Object(changes) = input else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "Body must be a JSON object"})),
        ));
    };
    let mut sensors = db.write().await;
    let sensor = sensors.get_mut(&id).ok_or_else(not_found)?;
    for (key, value) in changes {
        if key != "id" {
            sensor.insert(key, value);
        }
    }
    Ok(Json(sensor.clone()))
}

async fn delete_sensor(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Value> {
    tracing::info!(%id, "delete sensor");
    let mut sensors = db.write().await;
    let removed = sensors.remove(&id).ok_or_else(not_found)?;
    let deleted = removed.get("id").cloned().unwrap_or(Value::String(id));
    Ok(Json(json!({"deleted": deleted})))
}
