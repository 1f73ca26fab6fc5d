//! The capability the batch orchestrator is written against.

use async_trait::async_trait;
use genbatch_core::job::JobRequest;

use crate::api::InferenceError;
use crate::messages::StatusReport;

/// A remote generation backend that accepts jobs and reports their status.
///
/// Implementations perform exactly one outbound call per method and never
/// retry; retry and deadline policy belong to the caller.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Short name used in logs (e.g. the model identifier).
    fn name(&self) -> &str;

    /// Submit one job and return the server-assigned job id.
    async fn submit(&self, request: &JobRequest) -> Result<String, InferenceError>;

    /// Query the current status of a previously submitted job.
    async fn get_status(&self, job_id: &str) -> Result<StatusReport, InferenceError>;
}
