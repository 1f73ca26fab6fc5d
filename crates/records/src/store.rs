use async_trait::async_trait;
use genbatch_core::types::RecordRef;

/// Field name to value mapping of one record.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Errors from any record-store implementation.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Record store error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Record not found: {0}")]
    NotFound(String),

    /// A 2xx response whose body could not be understood.
    #[error("Malformed record response: {0}")]
    Malformed(String),

    /// The store refused the operation without a transport error.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed field-map storage holding the batch's inputs and outcome.
///
/// `patch` replaces only the fields it names; every other field on the
/// record is left as it was.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, record: &RecordRef) -> Result<Fields, RecordError>;

    async fn patch(&self, record: &RecordRef, fields: Fields) -> Result<(), RecordError>;
}
