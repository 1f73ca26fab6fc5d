//! Per-job domain types: what is submitted, what comes back, and how each
//! slot of a batch ends up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::OutputUri;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Output-shape parameters forwarded to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputShape {
    /// Resolution label understood by the backend (e.g. `1080p`, `2K`).
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

impl OutputShape {
    pub fn with_resolution(resolution: impl Into<String>) -> Self {
        Self {
            resolution: resolution.into(),
            aspect_ratio: None,
            duration_secs: None,
        }
    }
}

/// One unit of generation work. Every slot of a batch shares the same
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Ordered source references (image URLs).
    pub inputs: Vec<OutputUri>,
    pub prompt: String,
    pub shape: OutputShape,
}

impl JobRequest {
    /// Build a request, rejecting one with no input references.
    pub fn new(
        inputs: Vec<OutputUri>,
        prompt: impl Into<String>,
        shape: OutputShape,
    ) -> Result<Self, CoreError> {
        if inputs.is_empty() {
            return Err(CoreError::Precondition(
                "No input references resolved on record".to_string(),
            ));
        }
        Ok(Self {
            inputs,
            prompt: prompt.into(),
            shape,
        })
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Remote acceptance of one submitted job. Only used as a poll key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            submitted_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal classification of a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOutcome {
    Success { outputs: Vec<OutputUri> },
    Failure { reason: String },
    Timeout { reason: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    /// Diagnostic text for failed and timed-out jobs, `None` on success.
    pub fn reason(&self) -> Option<&str> {
        match self {
            JobOutcome::Success { .. } => None,
            JobOutcome::Failure { reason } | JobOutcome::Timeout { reason } => Some(reason),
        }
    }
}

/// The outcome of one batch slot, in submission order.
///
/// `job_id` is `None` when the slot never got a handle because its
/// submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOutcome {
    pub slot: usize,
    pub job_id: Option<String>,
    pub outcome: JobOutcome,
}

impl SlotOutcome {
    /// Label used in failure summaries: the remote job id when known,
    /// otherwise a 1-based slot marker.
    pub fn label(&self) -> String {
        match &self.job_id {
            Some(id) => id.clone(),
            None => format!("slot-{}", self.slot + 1),
        }
    }
}
