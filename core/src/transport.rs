//! Async client that executes requests built by `SensorClient`.
//!
//! # Design
//! Every operation is build → send → parse. Building and parsing are the
//! pure `SensorClient` methods, so the only thing added here is the network
//! round-trip over a single reusable `reqwest::Client`. Nothing is retried:
//! the first failure is returned to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::client::SensorClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DetailOptions, SensorDataQuery, SensorId};

/// Async client for the sensor-data API.
///
/// Cheap to clone; clones share the underlying connection pool and may be
/// used concurrently.
#[derive(Debug, Clone)]
pub struct SensorApiClient {
    core: SensorClient,
    http: reqwest::Client,
}

impl SensorApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let core = SensorClient::new(&config.base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { core, http })
    }

    /// Build from the `SENSOR_API_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Use a caller-supplied reqwest client (shared pool, custom TLS, ...).
    pub fn with_http_client(core: SensorClient, http: reqwest::Client) -> Self {
        Self { core, http }
    }

    pub fn base_url(&self) -> &Url {
        self.core.base_url()
    }

    /// `GET /sensor-data` with `params` as the query string.
    pub async fn list_sensor_data<R: DeserializeOwned>(
        &self,
        params: &SensorDataQuery,
    ) -> Result<R, ApiError> {
        let request = self.core.build_list_sensor_data(params);
        self.execute(request).await
    }

    /// `GET /sensor-data/{id}`, with `start_date`/`end_date` only when set.
    pub async fn get_sensor_detail<R: DeserializeOwned>(
        &self,
        id: impl Into<SensorId>,
        options: &DetailOptions,
    ) -> Result<R, ApiError> {
        let request = self.core.build_get_sensor_detail(id, options)?;
        self.execute(request).await
    }

    /// `PATCH /sensor-data/{id}` with `data` as the JSON body.
    pub async fn update_sensor<B, R>(&self, id: impl Into<SensorId>, data: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.core.build_update_sensor(id, data)?;
        self.execute(request).await
    }

    /// `DELETE /sensors/{id}`.
    pub async fn delete_sensor<R: DeserializeOwned>(
        &self,
        id: impl Into<SensorId>,
    ) -> Result<R, ApiError> {
        let request = self.core.build_delete_sensor(id)?;
        self.execute(request).await
    }

    async fn execute<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let result = match self.send(request).await {
            Ok(response) => self.core.parse_response(response),
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            debug!(%method, %url, error = %err, "sensor api request failed");
        }
        result
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending sensor api request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.http.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "sensor api response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
