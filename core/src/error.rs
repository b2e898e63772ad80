//! Error types for the sensor-data API client.
//!
//! # Design
//! Every failure is surfaced to the caller as-is; nothing here is retried or
//! recovered. A 404 is not special-cased: it lands in `HttpStatus` like any
//! other non-2xx response, with the raw status code and body attached.

use thiserror::Error;

/// Errors returned by `SensorClient` and `SensorApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout, or the
    /// body stream broke mid-read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body could not be decoded into the requested type.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The sensor id cannot be sent as a single path segment (empty, `.` or
    /// `..`).
    #[error("invalid sensor id {0:?}")]
    InvalidId(String),

    /// The configured base URL cannot be used to resolve endpoint paths.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Environment configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Status code of an `HttpStatus` error, `None` for every other kind.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
