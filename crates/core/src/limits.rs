//! Batch size and deadline bounds, plus the desired-count parser.
//!
//! Out-of-range caller values are clamped, never rejected.

use std::time::Duration;

use serde_json::Value;

/// Smallest batch a caller can request.
pub const MIN_JOB_COUNT: u32 = 1;
/// Largest batch a caller can request.
pub const MAX_JOB_COUNT: u32 = 8;

/// Lower bound on the per-job polling deadline.
pub const MIN_JOB_TIMEOUT_SECS: u64 = 60;
/// Upper bound on the per-job polling deadline.
pub const MAX_JOB_TIMEOUT_SECS: u64 = 3600;

/// Default number of jobs polled simultaneously.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Record-store text fields reject very long values; failure summaries are
/// cut to this many characters.
pub const FAILURE_DETAIL_MAX_CHARS: usize = 1000;

/// Clamp a requested job count into `[MIN_JOB_COUNT, MAX_JOB_COUNT]`.
pub fn clamp_job_count(n: i64) -> u32 {
    n.clamp(MIN_JOB_COUNT as i64, MAX_JOB_COUNT as i64) as u32
}

/// Clamp a requested per-job timeout into
/// `[MIN_JOB_TIMEOUT_SECS, MAX_JOB_TIMEOUT_SECS]`.
pub fn clamp_job_timeout(timeout: Duration) -> Duration {
    let secs = timeout
        .as_secs()
        .clamp(MIN_JOB_TIMEOUT_SECS, MAX_JOB_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Clamp a concurrency setting to at least one.
pub fn clamp_concurrency(n: usize) -> usize {
    n.max(1)
}

/// Read a desired job count from a loosely typed value.
///
/// Accepts a JSON number, a numeric string (`"4"`, `" 3 "`, `"2.0"`), or a
/// labeled-choice object whose `name` (or `label`) holds one of those. The
/// result is clamped. Returns `None` when nothing numeric can be found so
/// the caller can fall back to a default.
pub fn parse_desired_count(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        Value::Object(map) => {
            return map
                .get("name")
                .or_else(|| map.get("label"))
                .and_then(parse_desired_count);
        }
        _ => None,
    }?;

    if !raw.is_finite() {
        return None;
    }
    Some(clamp_job_count(raw.trunc() as i64))
}

/// Parse the leading number in a string such as `"4"` or `"4 images"`.
fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return Some(v);
    }
    let digits: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    digits.parse::<f64>().ok()
}
