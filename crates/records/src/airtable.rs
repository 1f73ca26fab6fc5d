//! REST client for an Airtable-style record store.
//!
//! `GET  {api_url}/{base}/{table}/{record}` returns `{"id", "fields"}`.
//! `PATCH` on the same URL with `{"fields": {...}}` updates only the named
//! fields.

use std::time::Duration;

use async_trait::async_trait;
use genbatch_core::types::RecordRef;
use serde::Deserialize;

use crate::store::{Fields, RecordError, RecordStore};

/// HTTP request timeout for a single record-store call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Default public API root.
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

/// Connection settings for the record store.
#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    pub api_url: String,
    pub api_key: String,
    /// Table used when a caller does not name one.
    pub default_table: String,
}

#[derive(Debug, Deserialize)]
struct RecordBody {
    #[serde(default)]
    fields: Fields,
}

/// [`RecordStore`] over the Airtable REST API.
#[derive(Clone)]
pub struct AirtableClient {
    client: reqwest::Client,
    api_url: reqwest::Url,
    api_key: String,
}

impl AirtableClient {
    pub fn new(config: &RecordStoreConfig) -> Result<Self, RecordError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let api_url = reqwest::Url::parse(&config.api_url)
            .map_err(|e| RecordError::Malformed(format!("invalid api url: {e}")))?;
        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Build the record URL, percent-encoding each path segment so table
    /// names with spaces work.
    pub fn record_url(&self, record: &RecordRef) -> Result<reqwest::Url, RecordError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| RecordError::Malformed("api url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&record.base_id)
            .push(&record.table)
            .push(&record.record_id);
        Ok(url)
    }

    async fn ensure_success(
        record: &RecordRef,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RecordError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RecordError::NotFound(record.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RecordError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn get(&self, record: &RecordRef) -> Result<Fields, RecordError> {
        let response = self
            .client
            .get(self.record_url(record)?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let response = Self::ensure_success(record, response).await?;
        let bytes = response.bytes().await?;
        let body: RecordBody =
            serde_json::from_slice(&bytes).map_err(|e| RecordError::Malformed(e.to_string()))?;
        Ok(body.fields)
    }

    async fn patch(&self, record: &RecordRef, fields: Fields) -> Result<(), RecordError> {
        let field_count = fields.len();
        let response = self
            .client
            .patch(self.record_url(record)?)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;

        Self::ensure_success(record, response).await?;
        tracing::debug!(record = %record, field_count, "Record patched");
        Ok(())
    }
}
