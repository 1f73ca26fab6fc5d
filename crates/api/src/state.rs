use std::sync::Arc;

use genbatch_pipeline::orchestrator::BatchOrchestrator;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc` or is a handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Runs batch invocations against the configured backend and store.
    pub orchestrator: Arc<BatchOrchestrator>,
    /// Tracks detached batches so shutdown can drain them.
    pub tasks: TaskTracker,
}
