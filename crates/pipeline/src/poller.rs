//! Deadline-bounded status polling for a single job.
//!
//! [`Poller::poll`] queries the backend until it sees a terminal status or
//! the deadline passes, waiting between queries according to a
//! [`PollPolicy`]. A failed query is logged and retried on the next tick;
//! only the deadline turns an unknown state into a timeout.

use std::sync::Arc;

use genbatch_core::job::{JobHandle, JobOutcome};
use genbatch_core::polling::PollPolicy;
use genbatch_inference::backend::JobBackend;
use genbatch_inference::messages::RemoteStatus;
use tokio::time::Instant;

use crate::error::JobError;

pub struct Poller {
    backend: Arc<dyn JobBackend>,
    policy: PollPolicy,
}

impl Poller {
    pub fn new(backend: Arc<dyn JobBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    /// Poll `handle` until it reaches a terminal state or `deadline` passes.
    ///
    /// Never returns an error: every path ends in a [`JobOutcome`]. A status
    /// query still in flight at the deadline is abandoned. No cancellation
    /// is sent to the service for a timed-out job.
    pub async fn poll(&self, handle: &JobHandle, deadline: Instant) -> JobOutcome {
        let started = Instant::now();
        let mut delay = self.policy.initial_delay;
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            match tokio::time::timeout_at(deadline, self.backend.get_status(&handle.id)).await {
                Err(_elapsed) => break,
                Ok(Ok(report)) => match report.status {
                    RemoteStatus::Completed => {
                        return match report.output_uris() {
                            Ok(outputs) => {
                                tracing::info!(
                                    job_id = %handle.id,
                                    attempts,
                                    output_count = outputs.len(),
                                    "Job completed",
                                );
                                JobOutcome::Success { outputs }
                            }
                            Err(reason) => {
                                tracing::warn!(
                                    job_id = %handle.id,
                                    %reason,
                                    "Job completed with malformed result",
                                );
                                JobError::MalformedResult(reason).into_outcome()
                            }
                        };
                    }
                    RemoteStatus::Failed => {
                        let reason = report
                            .error
                            .filter(|e| !e.trim().is_empty())
                            .unwrap_or_else(|| {
                                "service reported failure without detail".to_string()
                            });
                        tracing::warn!(job_id = %handle.id, %reason, "Job failed remotely");
                        return JobError::PollTerminal(reason).into_outcome();
                    }
                    RemoteStatus::Pending => {
                        tracing::debug!(job_id = %handle.id, attempts, "Job still pending");
                    }
                },
                Ok(Err(e)) => {
                    let err = JobError::PollTransient(e.to_string());
                    tracing::warn!(
                        job_id = %handle.id,
                        attempts,
                        error = %err,
                        "Retrying on next tick",
                    );
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep_until((now + delay).min(deadline)).await;
            delay = self.policy.next_delay(delay);
        }

        let secs = deadline.saturating_duration_since(started).as_secs();
        tracing::warn!(job_id = %handle.id, attempts, secs, "Job timed out, abandoning");
        JobError::Timeout { secs, attempts }.into_outcome()
    }
}
