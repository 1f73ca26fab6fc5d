pub mod automations;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// ```text
/// /automations/webhookSeedanceEditGen   GET, POST  automation webhook
/// /automations/generate                 GET, POST  automation webhook
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/automations", automations::router())
}
