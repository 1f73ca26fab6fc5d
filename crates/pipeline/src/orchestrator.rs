//! End-to-end batch invocation against one record.
//!
//! Reads the record, resolves the job request, runs the scheduler,
//! aggregates, and writes the outcome back exactly once. Only an aggregate
//! failure, a writeback failure, an unreadable record, or a missing
//! precondition reaches the caller as an error.

use std::sync::Arc;
use std::time::Duration;

use genbatch_core::aggregate::{aggregate, BatchResult};
use genbatch_core::batch::BatchPhase;
use genbatch_core::error::CoreError;
use genbatch_core::job::{JobRequest, OutputShape};
use genbatch_core::limits::{clamp_job_count, clamp_job_timeout, parse_desired_count};
use genbatch_core::types::{OutputUri, RecordRef};
use genbatch_inference::backend::JobBackend;
use genbatch_records::fields::{attachment_urls, text_value, FieldMap};
use genbatch_records::store::{Fields, RecordStore};
use serde::Serialize;
use tracing::Instrument;

use crate::error::PipelineError;
use crate::scheduler::{BatchScheduler, SchedulerSettings};
use crate::writeback::WritebackCoordinator;

/// Deployment defaults applied when neither the caller nor the record says
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDefaults {
    pub job_count: u32,
    pub job_timeout: Duration,
    pub resolution: String,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            job_count: 4,
            job_timeout: Duration::from_secs(600),
            resolution: "1080p".to_string(),
        }
    }
}

/// One caller request for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInvocation {
    pub record: RecordRef,
    /// Desired job count; falls back to the record's count field, then the
    /// configured default.
    pub job_count: Option<u32>,
    pub job_timeout: Option<Duration>,
    /// Output field override for this request.
    pub output_field: Option<String>,
}

impl BatchInvocation {
    pub fn new(record: RecordRef) -> Self {
        Self {
            record,
            job_count: None,
            job_timeout: None,
            output_field: None,
        }
    }
}

/// Caller-facing summary of a finished batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub requested: u32,
    pub completed: u32,
    pub failed: u32,
    pub status: String,
    pub phase: BatchPhase,
}

pub struct BatchOrchestrator {
    store: Arc<dyn RecordStore>,
    scheduler: BatchScheduler,
    writeback: WritebackCoordinator,
    fields: FieldMap,
    defaults: BatchDefaults,
}

impl BatchOrchestrator {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        store: Arc<dyn RecordStore>,
        fields: FieldMap,
        settings: SchedulerSettings,
        defaults: BatchDefaults,
    ) -> Self {
        Self {
            scheduler: BatchScheduler::new(backend, settings),
            writeback: WritebackCoordinator::new(Arc::clone(&store)),
            store,
            fields,
            defaults,
        }
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Run one batch invocation to completion.
    pub async fn execute(
        &self,
        invocation: &BatchInvocation,
    ) -> Result<BatchReport, PipelineError> {
        let run_id = uuid::Uuid::now_v7();
        let span = tracing::info_span!("batch", %run_id, record = %invocation.record);
        self.execute_inner(invocation).instrument(span).await
    }

    async fn execute_inner(
        &self,
        invocation: &BatchInvocation,
    ) -> Result<BatchReport, PipelineError> {
        let record = &invocation.record;
        let fields = match &invocation.output_field {
            Some(name) => self.fields.with_outputs(name.clone()),
            None => self.fields.clone(),
        };
        let mut phase = BatchPhase::Created;

        let current = self.store.get(record).await.map_err(PipelineError::RecordRead)?;
        let existing = attachment_urls(current.get(&fields.outputs));

        let request = match self.resolve_request(&current, &fields) {
            Ok(request) => request,
            Err(e) => {
                advance(&mut phase, BatchPhase::Failed);
                tracing::warn!(error = %e, "Batch precondition failed");
                if let Err(write_err) = self
                    .writeback
                    .commit_failure(record, &fields, &e.to_string())
                    .await
                {
                    tracing::error!(error = %write_err, "Failed to record precondition error");
                }
                return Err(e.into());
            }
        };

        let job_count = clamp_job_count(i64::from(
            invocation
                .job_count
                .or_else(|| parse_desired_count(current.get(&fields.count)?))
                .unwrap_or(self.defaults.job_count),
        ));
        let job_timeout =
            clamp_job_timeout(invocation.job_timeout.unwrap_or(self.defaults.job_timeout));

        tracing::info!(
            job_count,
            timeout_secs = job_timeout.as_secs(),
            input_count = request.inputs.len(),
            existing_outputs = existing.len(),
            "Starting batch",
        );

        advance(&mut phase, BatchPhase::Submitting);
        let submitted = self.scheduler.submit_all(&request, job_count).await;
        tracing::info!(
            accepted = submitted.handles.len(),
            rejected = submitted.rejected_count(),
            "Submission phase finished",
        );

        advance(&mut phase, BatchPhase::Polling);
        let outcomes = self.scheduler.poll_all(submitted, job_timeout).await;

        advance(&mut phase, BatchPhase::Aggregating);
        let result = aggregate(&outcomes);
        tracing::info!(
            requested = result.requested,
            succeeded = result.succeeded,
            failed = result.failed,
            "Batch aggregated",
        );

        advance(&mut phase, BatchPhase::WritingBack);
        self.write_back(record, &fields, &existing, &result, &mut phase).await
    }

    /// Commit the result and map the final state to the caller's result.
    async fn write_back(
        &self,
        record: &RecordRef,
        fields: &FieldMap,
        existing: &[OutputUri],
        result: &BatchResult,
        phase: &mut BatchPhase,
    ) -> Result<BatchReport, PipelineError> {
        let batch_error = result
            .is_overall_failure()
            .then(|| result.failure_detail.clone());

        let write = match self.writeback.commit(record, fields, existing, result).await {
            Ok(write) => write,
            Err(e) => {
                advance(phase, BatchPhase::Failed);
                tracing::error!(error = %e, "Writeback failed");
                let text = match &batch_error {
                    Some(detail) => format!("Writeback failed: {e}; batch error: {detail}"),
                    None => format!("Writeback failed: {e}"),
                };
                self.writeback.write_error_text(record, fields, &text).await;
                return Err(PipelineError::Writeback {
                    source: e,
                    requested: result.requested,
                    succeeded: result.succeeded,
                    failed: result.failed,
                    batch_error,
                });
            }
        };

        if let Some(detail) = batch_error {
            advance(phase, BatchPhase::Failed);
            return Err(PipelineError::AggregateFailure {
                requested: result.requested,
                failed: result.failed,
                detail,
            });
        }

        advance(phase, BatchPhase::Done);
        Ok(BatchReport {
            requested: result.requested,
            completed: result.succeeded,
            failed: result.failed,
            status: write.status_label,
            phase: *phase,
        })
    }

    /// Build the shared job request from the record's fields.
    fn resolve_request(
        &self,
        current: &Fields,
        fields: &FieldMap,
    ) -> Result<JobRequest, CoreError> {
        let inputs = attachment_urls(current.get(&fields.inputs));
        let prompt = text_value(current.get(&fields.prompt)).ok_or_else(|| {
            CoreError::Precondition(format!("Field '{}' is empty", fields.prompt))
        })?;
        let resolution = text_value(current.get(&fields.resolution))
            .unwrap_or_else(|| self.defaults.resolution.clone());

        JobRequest::new(inputs, prompt, OutputShape::with_resolution(resolution))
    }
}

fn advance(phase: &mut BatchPhase, next: BatchPhase) {
    debug_assert!(phase.can_transition_to(next), "{phase} -> {next}");
    tracing::debug!(from = %phase, to = %next, "Batch phase");
    *phase = next;
}
