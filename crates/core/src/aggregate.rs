//! Reduction of per-slot outcomes into one batch summary.

use serde::Serialize;

use crate::job::{JobOutcome, SlotOutcome};
use crate::limits::FAILURE_DETAIL_MAX_CHARS;
use crate::types::OutputUri;

/// Joins individual failure entries in [`BatchResult::failure_detail`].
pub const FAILURE_SEPARATOR: &str = " | ";

/// Status label written when every job succeeded.
pub const STATUS_SUCCESS: &str = "Success";
/// Status label written when no job succeeded.
pub const STATUS_ERROR: &str = "Error";

// ---------------------------------------------------------------------------
// BatchResult
// ---------------------------------------------------------------------------

/// Aggregate outcome of one batch invocation.
///
/// Invariants: `succeeded + failed == requested`, and `outputs` holds every
/// success output in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub requested: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub outputs: Vec<OutputUri>,
    /// Bounded `"<job>: <reason>"` summary of every failed slot; empty when
    /// nothing failed.
    pub failure_detail: String,
}

impl BatchResult {
    /// No job succeeded although at least one was attempted.
    pub fn is_overall_failure(&self) -> bool {
        self.succeeded == 0 && self.failed > 0
    }

    pub fn status(&self) -> BatchStatus {
        BatchStatus::classify(self.succeeded, self.requested)
    }
}

// ---------------------------------------------------------------------------
// BatchStatus
// ---------------------------------------------------------------------------

/// Overall classification written to the record's status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    PartialSuccess { succeeded: u32, requested: u32 },
    Error,
}

impl BatchStatus {
    pub fn classify(succeeded: u32, requested: u32) -> Self {
        if succeeded == 0 {
            BatchStatus::Error
        } else if succeeded >= requested {
            BatchStatus::Success
        } else {
            BatchStatus::PartialSuccess {
                succeeded,
                requested,
            }
        }
    }

    /// Human-readable label, e.g. `"Partial Success (2/3)"`.
    pub fn label(&self) -> String {
        match self {
            BatchStatus::Success => STATUS_SUCCESS.to_string(),
            BatchStatus::PartialSuccess {
                succeeded,
                requested,
            } => format!("Partial Success ({succeeded}/{requested})"),
            BatchStatus::Error => STATUS_ERROR.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Reduce slot outcomes into a [`BatchResult`].
///
/// Outputs are concatenated in the order of `outcomes`; callers pass them
/// in submission order.
pub fn aggregate(outcomes: &[SlotOutcome]) -> BatchResult {
    let mut outputs = Vec::new();
    let mut failures = Vec::new();
    let mut succeeded = 0u32;

    for slot in outcomes {
        match &slot.outcome {
            JobOutcome::Success { outputs: produced } => {
                succeeded += 1;
                outputs.extend(produced.iter().cloned());
            }
            JobOutcome::Failure { reason } | JobOutcome::Timeout { reason } => {
                failures.push(format!("{}: {reason}", slot.label()));
            }
        }
    }

    let requested = outcomes.len() as u32;
    let detail = failures.join(FAILURE_SEPARATOR);
    BatchResult {
        requested,
        succeeded,
        failed: requested - succeeded,
        outputs,
        failure_detail: truncate_chars(&detail, FAILURE_DETAIL_MAX_CHARS),
    }
}

/// Cut `text` to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
