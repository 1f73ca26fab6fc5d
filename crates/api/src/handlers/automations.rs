//! Handlers for the automation webhooks.
//!
//! A webhook names one record. By default the caller gets an immediate
//! acknowledgement, because automation tools give up on slow responses long
//! before a batch finishes. `wait=true` waits for the batch and reports its
//! counts. Either way the batch runs as a tracked task, so it always
//! reaches its writeback.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use genbatch_core::limits::parse_desired_count;
use genbatch_core::types::RecordRef;
use genbatch_pipeline::orchestrator::BatchInvocation;
use serde::Serialize;
use serde_json::Value;

use crate::background::batch_runner;
use crate::error::{AppError, AppResult};
use crate::query::{non_empty, WebhookParams};
use crate::state::AppState;

/// Immediate acknowledgement for a detached batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub ok: bool,
    pub record_id: String,
}

/// Counts of a batch that ran inline.
#[derive(Debug, Serialize)]
pub struct Completed {
    pub ok: bool,
    pub requested: u32,
    pub completed: u32,
    pub failed: u32,
    pub status: String,
}

/// GET|POST /v1/automations/{webhookSeedanceEditGen,generate}
///
/// Returns 400 if `baseId` or `recordId` is missing.
pub async fn run_batch(
    State(state): State<AppState>,
    Query(params): Query<WebhookParams>,
) -> AppResult<Json<Value>> {
    let invocation = build_invocation(&state, &params)?;

    tracing::info!(
        record = %invocation.record,
        output_field = invocation
            .output_field
            .as_deref()
            .unwrap_or(&state.orchestrator.fields().outputs),
        job_count = ?invocation.job_count,
        timeout_secs = ?invocation.job_timeout.map(|t| t.as_secs()),
        wait = params.wait(),
        "Webhook received",
    );

    let record_id = invocation.record.record_id.clone();
    let batch =
        batch_runner::spawn_batch(&state.tasks, Arc::clone(&state.orchestrator), invocation);

    if params.wait() {
        // If the request times out first, only this await is dropped; the
        // batch keeps running to its writeback.
        let report = batch
            .await
            .map_err(|e| AppError::InternalError(format!("Batch task failed: {e}")))??;
        return to_json(Completed {
            ok: true,
            requested: report.requested,
            completed: report.completed,
            failed: report.failed,
            status: report.status,
        });
    }

    to_json(Accepted {
        ok: true,
        record_id,
    })
}

/// Resolve query parameters into a batch invocation.
///
/// Unparsable `n` or `timeoutSec` values are ignored so the record or the
/// configured defaults apply; out-of-range values are clamped later.
fn build_invocation(state: &AppState, params: &WebhookParams) -> AppResult<BatchInvocation> {
    let base_id = non_empty(&params.base_id);
    let record_id = non_empty(&params.record_id);
    let (Some(base_id), Some(record_id)) = (base_id, record_id) else {
        return Err(AppError::BadRequest("Missing baseId or recordId".to_string()));
    };

    let table = non_empty(&params.table_id_or_name)
        .unwrap_or(&state.config.records.default_table)
        .to_string();

    let job_count =
        non_empty(&params.n).and_then(|n| parse_desired_count(&Value::String(n.into())));
    let job_timeout = non_empty(&params.timeout_sec)
        .and_then(|t| t.parse::<u64>().ok())
        .map(Duration::from_secs);

    Ok(BatchInvocation {
        job_count,
        job_timeout,
        output_field: non_empty(&params.field_name).map(String::from),
        ..BatchInvocation::new(RecordRef::new(base_id, table, record_id))
    })
}

fn to_json<T: Serialize>(value: T) -> AppResult<Json<Value>> {
    serde_json::to_value(value)
        .map(Json)
        .map_err(|e| AppError::InternalError(e.to_string()))
}
