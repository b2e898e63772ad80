//! Stateless HTTP request builder and response parser for the sensor-data API.
//!
//! # Design
//! `SensorClient` holds only the parsed base URL and carries no mutable state
//! between calls. Each operation has a `build_*` method that produces an
//! `HttpRequest`; every response goes through the single `parse_response`,
//! since all endpoints share one status and decoding policy.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DetailOptions, SensorDataQuery, SensorId};

const SENSOR_DATA: &str = "sensor-data";
// The delete endpoint lives under a different collection on the server.
const SENSORS: &str = "sensors";

/// Synchronous, stateless client for the sensor-data API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorClient {
    base_url: Url,
}

impl SensorClient {
    /// Parse `base_url` once. A path prefix (`http://host/api`) is kept and a
    /// trailing slash is ignored; any query or fragment is discarded.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{base_url}: cannot resolve paths against it"
            )));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { base_url: url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_list_sensor_data(&self, params: &SensorDataQuery) -> HttpRequest {
        let url = with_query(self.endpoint(&[SENSOR_DATA]), params.pairs());
        HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_sensor_detail(
        &self,
        id: impl Into<SensorId>,
        options: &DetailOptions,
    ) -> Result<HttpRequest, ApiError> {
        let id = id_segment(id)?;
        let pairs = options.query_pairs();
        let url = with_query(
            self.endpoint(&[SENSOR_DATA, id.as_str()]),
            pairs.iter().map(|(k, v)| (*k, v.as_str())),
        );
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_update_sensor<B>(
        &self,
        id: impl Into<SensorId>,
        data: &B,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let id = id_segment(id)?;
        let body = serde_json::to_string(data).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: self.endpoint(&[SENSOR_DATA, id.as_str()]).into(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_delete_sensor(&self, id: impl Into<SensorId>) -> Result<HttpRequest, ApiError> {
        let id = id_segment(id)?;
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.endpoint(&[SENSORS, id.as_str()]).into(),
            headers: Vec::new(),
            body: None,
        })
    }

    /// Apply the status policy, then decode the body as JSON.
    ///
    /// Any 2xx is success. An empty success body decodes as JSON `null`, so
    /// `R = serde_json::Value`, `Option<T>` and `()` all accept it.
    pub fn parse_response<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        check_status(&response)?;
        let body = response.body.trim();
        let body = if body.is_empty() { "null" } else { body };
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Resolve path segments under the base URL, percent-encoding each one so
    /// an id can never escape its segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new(); dot and empty ids in id_segment()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// String form of `id` for use as one path segment.
///
/// `.`, `..` and their `%2e` spellings are dot segments that URL
/// normalization removes, and an empty id names the collection itself, so
/// none of them can address a single sensor.
fn id_segment(id: impl Into<SensorId>) -> Result<String, ApiError> {
    let id = id.into().to_string();
    match id.as_str() {
        "" | "." | ".." => Err(ApiError::InvalidId(id)),
        _ => Ok(id),
    }
}

fn with_query<'a>(mut url: Url, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Url {
    let mut pairs = pairs.into_iter().peekable();
    if pairs.peek().is_some() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// Map non-success status codes to `ApiError::HttpStatus`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body.clone(),
    })
}
