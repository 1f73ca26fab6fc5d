//! One request in, one job handle out. No retries.

use std::sync::Arc;

use genbatch_core::job::{JobHandle, JobRequest};
use genbatch_inference::backend::JobBackend;

use crate::error::JobError;

pub struct Submitter {
    backend: Arc<dyn JobBackend>,
}

impl Submitter {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self { backend }
    }

    /// Submit one job through the backend.
    ///
    /// A rejected request or an acceptance without an id is a
    /// [`JobError::Submission`]; the caller records it against the slot and
    /// does not resubmit.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle, JobError> {
        let job_id = self
            .backend
            .submit(request)
            .await
            .map_err(|e| JobError::Submission(e.to_string()))?;

        if job_id.trim().is_empty() {
            return Err(JobError::Submission(
                "acceptance did not include a job id".to_string(),
            ));
        }

        tracing::info!(backend = self.backend.name(), job_id = %job_id, "Job submitted");
        Ok(JobHandle::new(job_id))
    }
}
