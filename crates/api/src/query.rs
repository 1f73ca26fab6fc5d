//! Query-string parameters accepted by the automation webhooks.
//!
//! Every value arrives as a string, since automation tools interpolate
//! record fields into the URL without typing them. Handlers parse the
//! numeric and boolean ones themselves.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookParams {
    pub base_id: Option<String>,
    pub record_id: Option<String>,
    /// Table name or id; defaults to the configured table.
    pub table_id_or_name: Option<String>,
    /// Output field override for this request.
    pub field_name: Option<String>,
    /// Desired job count.
    pub n: Option<String>,
    pub timeout_sec: Option<String>,
    /// `true` or `1` runs the batch before responding.
    pub wait: Option<String>,
}

impl WebhookParams {
    pub fn wait(&self) -> bool {
        matches!(
            self.wait.as_deref().map(str::trim),
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true")
        )
    }
}

/// Trimmed, non-empty value of an optional parameter.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
