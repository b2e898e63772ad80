//! Domain DTOs for the sensor-data API.
//!
//! # Design
//! The server's schema is only partly known, so every record type here is
//! permissive: known fields are optional and anything else is kept in a
//! flattened `extra` map. Decoding a server payload into these types and
//! serializing it back never drops data. Callers that want no typing at all
//! can decode into `serde_json::Value` instead.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Identifier of a sensor. The server may use strings or any JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorId {
    Number(Number),
    Text(String),
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorId::Number(n) => write!(f, "{n}"),
            SensorId::Text(s) => f.write_str(s),
        }
    }
}

impl From<Number> for SensorId {
    fn from(value: Number) -> Self {
        SensorId::Number(value)
    }
}

impl From<i64> for SensorId {
    fn from(value: i64) -> Self {
        SensorId::Number(value.into())
    }
}

impl From<u64> for SensorId {
    fn from(value: u64) -> Self {
        SensorId::Number(value.into())
    }
}

impl From<i32> for SensorId {
    fn from(value: i32) -> Self {
        SensorId::Number(value.into())
    }
}

impl From<&str> for SensorId {
    fn from(value: &str) -> Self {
        SensorId::Text(value.to_string())
    }
}

impl From<String> for SensorId {
    fn from(value: String) -> Self {
        SensorId::Text(value)
    }
}

impl From<&SensorId> for SensorId {
    fn from(value: &SensorId) -> Self {
        value.clone()
    }
}

/// A sensor record as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub id: SensorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readings: Option<Vec<SensorReading>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single dated measurement attached to a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update payload. Only the fields that are set are sent; omitted
/// fields remain unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SensorUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set a field the typed struct does not know about.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Query parameters for the list endpoint.
///
/// Keys are kept sorted so the generated query string is deterministic.
/// A key mapped to `None` is dropped from the query string entirely rather
/// than sent as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorDataQuery {
    params: BTreeMap<String, Option<String>>,
}

impl SensorDataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), Some(value.to_string()));
        self
    }

    pub fn optional<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params
            .insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_deref())
    }

    /// Key/value pairs that will actually be sent.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }
}

impl<K, V> FromIterator<(K, V)> for SensorDataQuery
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (k, v)| query.param(k, v))
    }
}

/// Optional date range for the detail endpoint. Both bounds default to
/// absent, and an absent bound is omitted from the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl DetailOptions {
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: None,
        }
    }

    pub fn ending(end_date: NaiveDate) -> Self {
        Self {
            start_date: None,
            end_date: Some(end_date),
        }
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}
