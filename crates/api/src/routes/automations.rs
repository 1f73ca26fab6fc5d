//! Route definitions for the automation webhooks.

use axum::routing::get;
use axum::Router;

use crate::handlers::automations;
use crate::state::AppState;

/// Routes mounted at `/automations`.
///
/// Both paths accept GET and POST with the same query parameters, since
/// automation tools differ in which verb their "call URL" step sends.
///
/// ```text
/// GET|POST /webhookSeedanceEditGen   -> run_batch
/// GET|POST /generate                 -> run_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/webhookSeedanceEditGen",
            get(automations::run_batch).post(automations::run_batch),
        )
        .route(
            "/generate",
            get(automations::run_batch).post(automations::run_batch),
        )
}
