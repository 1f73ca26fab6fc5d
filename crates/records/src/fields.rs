//! Field-name configuration and value conversions for record fields.
//!
//! Attachment fields hold `[{"url": ...}, ...]`; single-select fields hold
//! `{"name": ...}`. The helpers here accept those shapes as well as plain
//! strings so that the orchestrator only ever sees URIs and text.

use serde_json::{json, Value};

/// Names of the record fields the orchestrator reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    /// Attachment (or URL list) field with the source images.
    pub inputs: String,
    pub prompt: String,
    /// Attachment field receiving generated outputs (append-only).
    pub outputs: String,
    pub status: String,
    pub error: String,
    /// Optional per-record resolution override.
    pub resolution: String,
    /// Optional per-record desired job count.
    pub count: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            inputs: "Input Images".into(),
            prompt: "Prompt".into(),
            outputs: "Outputs".into(),
            status: "Status".into(),
            error: "Error".into(),
            resolution: "Resolution".into(),
            count: "Count".into(),
        }
    }
}

impl FieldMap {
    /// Same mapping with a different output field, used when a caller names
    /// the destination field per request.
    pub fn with_outputs(&self, outputs: impl Into<String>) -> Self {
        Self {
            outputs: outputs.into(),
            ..self.clone()
        }
    }
}

/// Extract URLs from an attachment array, a string array, or a string of
/// comma / newline separated URLs. Blank entries are skipped.
pub fn attachment_urls(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim()),
                Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::trim),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Read a text value from a string, number, or single-select object.
/// Returns `None` for blank or missing values.
pub fn text_value(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => map.get("name").and_then(Value::as_str)?.trim().to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Encode URLs as an attachment array for writing.
pub fn attachments_value(urls: &[String]) -> Value {
    Value::Array(urls.iter().map(|u| json!({ "url": u })).collect())
}
