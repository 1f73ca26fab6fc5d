use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use genbatch_api::config::ServerConfig;
use genbatch_api::router::build_app_router;
use genbatch_api::state::AppState;
use genbatch_inference::adapters::HttpJobBackend;
use genbatch_pipeline::orchestrator::BatchOrchestrator;
use genbatch_records::airtable::AirtableClient;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid configuration")?;

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "genbatch_api=debug,genbatch_pipeline=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        host = %config.host,
        port = config.port,
        model = %config.inference.model,
        model_kind = config.inference.kind.as_str(),
        table = %config.records.default_table,
        "Loaded server configuration",
    );

    // --- Backend and record store ---
    let backend = HttpJobBackend::from_config(&config.inference)
        .context("Failed to build generation backend client")?;
    let store =
        AirtableClient::new(&config.records).context("Failed to build record store client")?;

    let orchestrator = BatchOrchestrator::new(
        Arc::new(backend),
        Arc::new(store),
        config.fields.clone(),
        config.scheduler,
        config.defaults.clone(),
    );

    // --- App state ---
    let tasks = TaskTracker::new();
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: Arc::new(orchestrator),
        tasks: tasks.clone(),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Drain detached batches ---
    tasks.close();
    let pending = tasks.len();
    tracing::info!(pending, "Server stopped accepting connections, draining batches");

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, tasks.wait()).await.is_err() {
        tracing::warn!(
            pending = tasks.len(),
            timeout_secs = config.shutdown_timeout_secs,
            "Shutdown timeout reached with batches still running",
        );
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). If a handler cannot
/// be installed that branch never resolves and the other still applies.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
