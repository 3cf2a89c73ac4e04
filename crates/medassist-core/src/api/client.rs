use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::ApiError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// HTTP client for the medical assistant backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.execute(self.client.get(self.url("/health"))).await
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub(crate) fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(self.url(endpoint))
    }

    pub(crate) fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client.post(self.url(endpoint))
    }

    /// Sends a request and decodes a 2xx JSON body into `T`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "API request failed");
            ApiError::transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %err, "API returned an error status");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "API response did not match the expected shape");
            ApiError::MalformedResponse(e.to_string())
        })
    }
}
