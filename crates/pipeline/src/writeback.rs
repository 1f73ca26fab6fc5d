//! Persisting a batch outcome to its record.
//!
//! Outputs are appended to whatever the record already holds; status and
//! error text are overwritten. Merging does not deduplicate: committing
//! the same result twice appends its outputs twice.

use std::sync::Arc;

use genbatch_core::aggregate::{BatchResult, STATUS_ERROR};
use genbatch_core::types::{OutputUri, RecordRef};
use genbatch_records::fields::{attachments_value, FieldMap};
use genbatch_records::store::{Fields, RecordError, RecordStore};
use serde_json::json;

/// What a successful commit wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub status_label: String,
    /// Length of the merged output list, or `None` when the output field
    /// was left untouched.
    pub outputs_written: Option<usize>,
}

/// `existing ++ new`, keeping every prior entry and every duplicate.
pub fn merge_outputs(existing: &[OutputUri], new: &[OutputUri]) -> Vec<OutputUri> {
    existing.iter().chain(new).cloned().collect()
}

/// Build the single patch for a batch result.
///
/// When nothing succeeded only the status and error fields are written.
pub fn build_patch(fields: &FieldMap, existing: &[OutputUri], result: &BatchResult) -> Fields {
    let mut patch = Fields::new();
    if result.succeeded > 0 {
        let merged = merge_outputs(existing, &result.outputs);
        patch.insert(fields.outputs.clone(), attachments_value(&merged));
    }
    patch.insert(fields.status.clone(), json!(result.status().label()));
    patch.insert(fields.error.clone(), json!(result.failure_detail));
    patch
}

pub struct WritebackCoordinator {
    store: Arc<dyn RecordStore>,
}

impl WritebackCoordinator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Write the batch result in one patch call.
    pub async fn commit(
        &self,
        record: &RecordRef,
        fields: &FieldMap,
        existing: &[OutputUri],
        result: &BatchResult,
    ) -> Result<WriteResult, RecordError> {
        let patch = build_patch(fields, existing, result);
        let outputs_written = patch
            .get(&fields.outputs)
            .and_then(|v| v.as_array())
            .map(Vec::len);

        self.store.patch(record, patch).await?;

        let status_label = result.status().label();
        tracing::info!(
            record = %record,
            status = %status_label,
            outputs_written,
            "Batch outcome written",
        );
        Ok(WriteResult {
            status_label,
            outputs_written,
        })
    }

    /// Mark the record as failed before anything was submitted.
    pub async fn commit_failure(
        &self,
        record: &RecordRef,
        fields: &FieldMap,
        error_text: &str,
    ) -> Result<(), RecordError> {
        let mut patch = Fields::new();
        patch.insert(fields.status.clone(), json!(STATUS_ERROR));
        patch.insert(fields.error.clone(), json!(error_text));
        self.store.patch(record, patch).await
    }

    /// One best-effort write of the error text alone. Failures are logged
    /// and swallowed.
    pub async fn write_error_text(&self, record: &RecordRef, fields: &FieldMap, error_text: &str) {
        let mut patch = Fields::new();
        patch.insert(fields.error.clone(), json!(error_text));
        if let Err(e) = self.store.patch(record, patch).await {
            tracing::error!(record = %record, error = %e, "Best-effort error write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(succeeded: u32, failed: u32, outputs: &[&str], detail: &str) -> BatchResult {
        BatchResult {
            requested: succeeded + failed,
            succeeded,
            failed,
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            failure_detail: detail.to_string(),
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn merge_appends_after_existing() {
        let merged = merge_outputs(&strings(&["old"]), &strings(&["n1", "n2"]));
        assert_eq!(merged, vec!["old", "n1", "n2"]);
    }

    #[test]
    fn merge_twice_duplicates_outputs() {
        let existing = strings(&["old"]);
        let new = strings(&["a", "b"]);
        let once = merge_outputs(&existing, &new);
        let twice = merge_outputs(&once, &new);
        assert_eq!(twice, vec!["old", "a", "b", "a", "b"]);
    }

    #[test]
    fn full_success_patch() {
        let fields = FieldMap::default();
        let patch = build_patch(&fields, &strings(&["old"]), &result(2, 0, &["a", "b"], ""));
        assert_eq!(patch["Status"], "Success");
        assert_eq!(patch["Error"], "");
        assert_eq!(
            patch["Outputs"],
            json!([{ "url": "old" }, { "url": "a" }, { "url": "b" }])
        );
    }

    #[test]
    fn partial_patch_carries_detail() {
        let fields = FieldMap::default();
        let patch = build_patch(&fields, &[], &result(2, 1, &["a", "b"], "job-2: timed out"));
        assert_eq!(patch["Status"], "Partial Success (2/3)");
        assert_eq!(patch["Error"], "job-2: timed out");
    }

    #[test]
    fn zero_success_patch_skips_outputs() {
        let fields = FieldMap::default();
        let patch = build_patch(&fields, &strings(&["old"]), &result(0, 2, &[], "x | y"));
        assert!(!patch.contains_key("Outputs"));
        assert_eq!(patch["Status"], "Error");
        assert_eq!(patch["Error"], "x | y");
        assert_eq!(patch.len(), 2);
    }

    #[test]
    fn patch_uses_configured_field_names() {
        let fields = FieldMap::default().with_outputs("Edits");
        let patch = build_patch(&fields, &[], &result(1, 0, &["a"], ""));
        assert!(patch.contains_key("Edits"));
        assert!(!patch.contains_key("Outputs"));
    }
}
