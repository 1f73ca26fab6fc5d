use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

/// GET / -- plain liveness text for uptime checkers.
async fn root() -> &'static str {
    "running"
}

/// GET /healthz -- minimal JSON liveness probe.
async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// GET /health -- service status and version.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Mount health check routes (root level, NOT under `/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/health", get(health_check))
}
