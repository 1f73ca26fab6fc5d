//! Fan-out submission and grouped, bounded-concurrency polling.
//!
//! All N submissions run at once. Accepted handles are then polled in
//! groups of `max_concurrency`: every poller in a group runs concurrently,
//! the whole group is awaited, and the next group starts after a short
//! pause. Outcomes land in a slot array indexed by submission order, so the
//! result order never depends on completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use genbatch_core::job::{JobHandle, JobOutcome, JobRequest, SlotOutcome};
use genbatch_core::limits::{
    clamp_concurrency, clamp_job_count, clamp_job_timeout, DEFAULT_MAX_CONCURRENCY,
};
use genbatch_core::polling::PollPolicy;
use genbatch_inference::backend::JobBackend;
use tokio::time::Instant;

use crate::poller::Poller;
use crate::submitter::Submitter;

/// Default pause between polling groups.
const DEFAULT_GROUP_PAUSE: Duration = Duration::from_secs(1);

/// Tunables for a [`BatchScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Jobs polled simultaneously (group size).
    pub max_concurrency: usize,
    /// Pause before each group after the first.
    pub group_pause: Duration,
    pub poll_policy: PollPolicy,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            group_pause: DEFAULT_GROUP_PAUSE,
            poll_policy: PollPolicy::default(),
        }
    }
}

/// Result of the submission phase: slots that were accepted, and the
/// outcome slots already decided by a failed submission.
pub struct Submitted {
    pub handles: Vec<(usize, JobHandle)>,
    slots: Vec<Option<SlotOutcome>>,
}

impl Submitted {
    pub fn rejected_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

pub struct BatchScheduler {
    submitter: Submitter,
    poller: Poller,
    settings: SchedulerSettings,
}

impl BatchScheduler {
    pub fn new(backend: Arc<dyn JobBackend>, settings: SchedulerSettings) -> Self {
        let settings = SchedulerSettings {
            max_concurrency: clamp_concurrency(settings.max_concurrency),
            ..settings
        };
        Self {
            submitter: Submitter::new(Arc::clone(&backend)),
            poller: Poller::new(backend, settings.poll_policy),
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Submit and poll `n` jobs, returning one outcome per slot in
    /// submission order.
    ///
    /// `n` and `per_job_timeout` are clamped silently.
    pub async fn run(
        &self,
        request: &JobRequest,
        n: u32,
        per_job_timeout: Duration,
    ) -> Vec<SlotOutcome> {
        let submitted = self.submit_all(request, n).await;
        self.poll_all(submitted, per_job_timeout).await
    }

    /// Submission phase: `n` concurrent submits. A rejected slot is decided
    /// as a failure immediately and never polled.
    pub async fn submit_all(&self, request: &JobRequest, n: u32) -> Submitted {
        let n = clamp_job_count(n as i64) as usize;

        let results = join_all((0..n).map(|slot| async move {
            (slot, self.submitter.submit(request).await)
        }))
        .await;

        let mut slots: Vec<Option<SlotOutcome>> = vec![None; n];
        let mut handles = Vec::with_capacity(n);

        for (slot, result) in results {
            match result {
                Ok(handle) => handles.push((slot, handle)),
                Err(e) => {
                    tracing::warn!(slot, error = %e, "Submission failed, skipping poll for slot");
                    slots[slot] = Some(SlotOutcome {
                        slot,
                        job_id: None,
                        outcome: e.into_outcome(),
                    });
                }
            }
        }

        Submitted { handles, slots }
    }

    /// Polling phase: groups of `max_concurrency` handles, one group at a
    /// time. Each job's deadline starts when its group starts.
    pub async fn poll_all(
        &self,
        submitted: Submitted,
        per_job_timeout: Duration,
    ) -> Vec<SlotOutcome> {
        let timeout = clamp_job_timeout(per_job_timeout);
        let Submitted { handles, mut slots } = submitted;
        let group_count = handles.len().div_ceil(self.settings.max_concurrency);

        for (index, group) in handles.chunks(self.settings.max_concurrency).enumerate() {
            if index > 0 && !self.settings.group_pause.is_zero() {
                tokio::time::sleep(self.settings.group_pause).await;
            }

            tracing::debug!(
                group = index + 1,
                group_count,
                size = group.len(),
                "Polling group",
            );

            let deadline = Instant::now() + timeout;
            let results = join_all(group.iter().map(|(slot, handle)| async move {
                (*slot, handle, self.poller.poll(handle, deadline).await)
            }))
            .await;

            for (slot, handle, outcome) in results {
                slots[slot] = Some(SlotOutcome {
                    slot,
                    job_id: Some(handle.id.clone()),
                    outcome,
                });
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(slot, outcome)| {
                outcome.unwrap_or_else(|| SlotOutcome {
                    slot,
                    job_id: None,
                    outcome: JobOutcome::Failure {
                        reason: "no outcome recorded".to_string(),
                    },
                })
            })
            .collect()
    }
}
