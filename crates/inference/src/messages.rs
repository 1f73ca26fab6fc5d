//! Wire messages exchanged with the generation service.
//!
//! Submission returns `{"jobId": "..."}`; status queries return
//! `{"status": "...", "outputs": [...], "error": "..."}`. Outputs are kept
//! as raw JSON until a terminal success needs them so that a malformed
//! list surfaces as a job failure rather than a failed query.

use serde::Deserialize;

/// Acceptance body returned by the submit endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAccepted {
    /// Server-assigned job identifier. Missing or empty means the
    /// acceptance is malformed.
    #[serde(default, alias = "jobId", alias = "id")]
    pub job_id: Option<String>,
}

/// Raw body returned by the status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub outputs: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// RemoteStatus
// ---------------------------------------------------------------------------

/// The three-state status contract the orchestrator depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Completed,
    Failed,
}

impl RemoteStatus {
    /// Map a service status string onto the three-state contract.
    ///
    /// Returns `None` for strings the service is not known to send; callers
    /// treat those as still pending.
    pub fn from_wire(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "submitted" | "running" | "processing" | "in_progress" => {
                Some(RemoteStatus::Pending)
            }
            "completed" | "succeeded" | "success" | "done" => Some(RemoteStatus::Completed),
            "failed" | "error" | "cancelled" | "canceled" | "expired" => Some(RemoteStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// StatusReport
// ---------------------------------------------------------------------------

/// A parsed status query result.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: RemoteStatus,
    pub outputs: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl StatusReport {
    pub fn pending() -> Self {
        Self {
            status: RemoteStatus::Pending,
            outputs: None,
            error: None,
        }
    }

    pub fn completed(outputs: serde_json::Value) -> Self {
        Self {
            status: RemoteStatus::Completed,
            outputs: Some(outputs),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: RemoteStatus::Failed,
            outputs: None,
            error: Some(error.into()),
        }
    }

    /// Extract the output URI list of a completed job.
    ///
    /// Accepts an array of strings or an array of `{"url": "..."}` objects.
    /// An absent, empty, or otherwise shaped list is an error carrying a
    /// human-readable reason.
    pub fn output_uris(&self) -> Result<Vec<String>, String> {
        let items = match &self.outputs {
            Some(serde_json::Value::Array(items)) => items,
            Some(other) => return Err(format!("unparsable output list: {other}")),
            None => return Err("completed without an output list".to_string()),
        };

        let mut uris = Vec::with_capacity(items.len());
        for item in items {
            let uri = match item {
                serde_json::Value::String(s) => Some(s.as_str()),
                serde_json::Value::Object(map) => map.get("url").and_then(|v| v.as_str()),
                _ => None,
            };
            match uri {
                Some(u) if !u.trim().is_empty() => uris.push(u.to_string()),
                _ => return Err(format!("unparsable output entry: {item}")),
            }
        }

        if uris.is_empty() {
            return Err("completed with an empty output list".to_string());
        }
        Ok(uris)
    }
}

impl From<StatusResponse> for StatusReport {
    fn from(raw: StatusResponse) -> Self {
        let status = RemoteStatus::from_wire(&raw.status).unwrap_or_else(|| {
            tracing::warn!(status = %raw.status, "Unknown job status, treating as pending");
            RemoteStatus::Pending
        });
        Self {
            status,
            outputs: raw.outputs,
            error: raw.error,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
