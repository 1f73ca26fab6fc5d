//! Batch execution on the shared task tracker.
//!
//! Every batch, inline or detached, runs as its own tracked task. Dropping
//! the returned handle (a detached webhook, or a request that hit its
//! timeout) leaves the batch running to its writeback, and shutdown still
//! waits for it. The orchestrator records every outcome on the record
//! itself; here the result is only logged.

use std::sync::Arc;

use genbatch_pipeline::error::PipelineError;
use genbatch_pipeline::orchestrator::{BatchInvocation, BatchOrchestrator, BatchReport};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Run `invocation` on `tasks`, returning a handle to its result.
pub fn spawn_batch(
    tasks: &TaskTracker,
    orchestrator: Arc<BatchOrchestrator>,
    invocation: BatchInvocation,
) -> JoinHandle<Result<BatchReport, PipelineError>> {
    tasks.spawn(async move {
        let result = orchestrator.execute(&invocation).await;
        match &result {
            Ok(report) => {
                tracing::info!(
                    record = %invocation.record,
                    requested = report.requested,
                    completed = report.completed,
                    failed = report.failed,
                    status = %report.status,
                    "Batch finished",
                );
            }
            Err(e) => {
                tracing::error!(
                    record = %invocation.record,
                    error = %e,
                    "Batch failed",
                );
            }
        }
        result
    })
}
