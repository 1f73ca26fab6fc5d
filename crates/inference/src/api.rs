//! REST client for the generation service's HTTP endpoints.
//!
//! Wraps job submission (`POST {api_url}/jobs`) and status retrieval
//! (`GET {api_url}/jobs/{id}`) using [`reqwest`]. Every request carries the
//! configured bearer key.

use std::time::Duration;

use crate::messages::{StatusResponse, SubmitAccepted};

/// HTTP request timeout for a single call to the service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one generation service deployment.
#[derive(Clone)]
pub struct InferenceApi {
    client: reqwest::Client,
    api_url: reqwest::Url,
    api_key: String,
}

/// Errors from the generation service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response whose body does not honour the contract.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl InferenceApi {
    /// Create a new API client with its own connection pool.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `https://inference.example.com/v1`.
    /// * `api_key` - Bearer token sent with every request.
    pub fn new(api_url: String, api_key: String) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_client(client, &api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: &str,
        api_key: String,
    ) -> Result<Self, InferenceError> {
        let api_url = reqwest::Url::parse(api_url)
            .map_err(|e| InferenceError::InvalidUrl(format!("{api_url}: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(InferenceError::InvalidUrl(api_url.to_string()));
        }
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Submit one job. Returns the server-assigned job id.
    ///
    /// A 2xx response without a non-empty id is reported as
    /// [`InferenceError::Malformed`].
    pub async fn submit_job(&self, body: &serde_json::Value) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(self.endpoint(&["jobs"]))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let accepted: SubmitAccepted = Self::parse_response(response).await?;
        match accepted.job_id {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(InferenceError::Malformed(
                "acceptance did not include a job id".to_string(),
            )),
        }
    }

    /// Retrieve the current status of a job.
    pub async fn job_status(&self, job_id: &str) -> Result<StatusResponse, InferenceError> {
        let response = self
            .client
            .get(self.endpoint(&["jobs", job_id]))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Append path segments to the base URL, percent-encoding each one so
    /// an opaque job id can never change which resource is addressed.
    fn endpoint(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Ensure the response has a success status code, capturing the body
    /// text of a failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, InferenceError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| InferenceError::Malformed(e.to_string()))
    }
}
