use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use genbatch_core::error::CoreError;
use genbatch_pipeline::error::PipelineError;
use genbatch_records::store::RecordError;
use serde_json::{json, Map, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`PipelineError`] for batch failures and adds HTTP-specific
/// variants. Every response body carries `ok: false`, a human-readable
/// `error` and a stable `code`; batch failures also carry their counts.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, code, message) = match &self {
            AppError::Pipeline(err) => classify_pipeline_error(err, &mut extra),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = Map::new();
        body.insert("ok".into(), Value::Bool(false));
        body.insert("error".into(), Value::String(message));
        body.insert("code".into(), Value::String(code.into()));
        body.extend(extra);

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

/// Classify a batch error into an HTTP status, error code, and message.
///
/// - Unmet record preconditions map to 422.
/// - An unknown record maps to 404; other record read failures to 502.
/// - A batch where every job failed maps to 502 with its counts.
/// - A failed final write maps to 500 with its counts.
fn classify_pipeline_error(
    err: &PipelineError,
    extra: &mut Map<String, Value>,
) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Core(CoreError::Precondition(msg)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "PRECONDITION_FAILED",
            msg.clone(),
        ),

        PipelineError::RecordRead(RecordError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            "RECORD_NOT_FOUND",
            format!("Record {id} not found"),
        ),
        PipelineError::RecordRead(e) => {
            tracing::error!(error = %e, "Record read failed");
            (StatusCode::BAD_GATEWAY, "RECORD_STORE_ERROR", err.to_string())
        }

        PipelineError::AggregateFailure {
            requested,
            failed,
            detail,
        } => {
            extra.extend(counts(*requested, 0, *failed));
            (StatusCode::BAD_GATEWAY, "BATCH_FAILED", detail.clone())
        }

        PipelineError::Writeback {
            requested,
            succeeded,
            failed,
            ..
        } => {
            extra.extend(counts(*requested, *succeeded, *failed));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "WRITEBACK_FAILED",
                err.to_string(),
            )
        }
    }
}

fn counts(requested: u32, completed: u32, failed: u32) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("requested".into(), json!(requested));
    map.insert("completed".into(), json!(completed));
    map.insert("failed".into(), json!(failed));
    map
}
