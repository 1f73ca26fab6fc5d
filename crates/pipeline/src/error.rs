use genbatch_core::error::CoreError;
use genbatch_core::job::JobOutcome;
use genbatch_records::store::RecordError;

// ---------------------------------------------------------------------------
// Per-job errors
// ---------------------------------------------------------------------------

/// Why a single job did not succeed.
///
/// These never abort sibling jobs; each is folded into the slot's
/// [`JobOutcome`] via [`JobError::into_outcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The service rejected the submission or returned no job id.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A status query failed; the job may still be running.
    #[error("status query failed: {0}")]
    PollTransient(String),

    /// The service reported the job as failed.
    #[error("job failed: {0}")]
    PollTerminal(String),

    /// The job completed but its output list was empty or unreadable.
    #[error("malformed result: {0}")]
    MalformedResult(String),

    #[error("timed out after {secs}s ({attempts} status checks)")]
    Timeout { secs: u64, attempts: u32 },
}

impl JobError {
    pub fn into_outcome(self) -> JobOutcome {
        match self {
            JobError::Timeout { .. } => JobOutcome::Timeout {
                reason: self.to_string(),
            },
            other => JobOutcome::Failure {
                reason: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Batch errors
// ---------------------------------------------------------------------------

/// Errors that reach the caller of a batch invocation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A precondition on the record was not met; nothing was submitted.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to read record: {0}")]
    RecordRead(#[source] RecordError),

    /// Every job of the batch failed.
    #[error("All {requested} jobs failed: {detail}")]
    AggregateFailure {
        requested: u32,
        failed: u32,
        detail: String,
    },

    /// The final record write failed. `batch_error` carries the aggregate
    /// failure detail when the batch itself had also failed.
    #[error("Writeback failed: {source}")]
    Writeback {
        #[source]
        source: RecordError,
        requested: u32,
        succeeded: u32,
        failed: u32,
        batch_error: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn timeout_maps_to_timeout_outcome() {
        let outcome = JobError::Timeout {
            secs: 60,
            attempts: 7,
        }
        .into_outcome();
        assert_matches!(
            outcome,
            JobOutcome::Timeout { reason } if reason == "timed out after 60s (7 status checks)"
        );
    }

    #[test]
    fn other_errors_map_to_failure() {
        for err in [
            JobError::Submission("401".into()),
            JobError::PollTerminal("nsfw".into()),
            JobError::MalformedResult("empty".into()),
        ] {
            assert_matches!(err.into_outcome(), JobOutcome::Failure { .. });
        }
    }

    #[test]
    fn submission_reason_keeps_remote_text() {
        let outcome =
            JobError::Submission("Inference API error (400): bad size".into()).into_outcome();
        assert_eq!(
            outcome.reason(),
            Some("submission failed: Inference API error (400): bad size")
        );
    }
}
