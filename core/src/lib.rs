//! Client for the sensor-data REST API.
//!
//! # Overview
//! Two layers:
//! - `SensorClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO), so request shapes
//!   are deterministic and easy to test.
//! - `SensorApiClient` runs those requests over `reqwest` and is what
//!   applications hold on to.
//!
//! # Design
//! - The base URL comes from the caller or from `SENSOR_API_BASE_URL`; it is
//!   never compiled in.
//! - Response bodies are decoded into whatever `DeserializeOwned` type the
//!   caller asks for: `serde_json::Value` for pass-through, or the permissive
//!   `SensorData` records.
//! - No retries, no caching. Errors go straight back to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::SensorClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::SensorApiClient;
pub use types::{DetailOptions, SensorData, SensorDataQuery, SensorId, SensorReading, SensorUpdate};
