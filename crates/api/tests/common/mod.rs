#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use genbatch_api::config::ServerConfig;
use genbatch_api::router::build_app_router;
use genbatch_api::state::AppState;
use genbatch_core::job::JobRequest;
use genbatch_core::types::RecordRef;
use genbatch_inference::api::InferenceError;
use genbatch_inference::backend::JobBackend;
use genbatch_inference::messages::StatusReport;
use genbatch_pipeline::orchestrator::BatchOrchestrator;
use genbatch_records::memory::MemoryRecordStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

pub const BASE: &str = "appTest";
pub const TABLE: &str = "Generations";

/// Backend whose jobs complete on the first status query. Can instead
/// reject every submission, or leave every job pending forever.
#[derive(Default)]
pub struct InstantBackend {
    reject_all: bool,
    never_finish: bool,
    submits: AtomicUsize,
}

impl InstantBackend {
    pub fn rejecting() -> Self {
        Self {
            reject_all: true,
            ..Self::default()
        }
    }

    pub fn never_finishing() -> Self {
        Self {
            never_finish: true,
            ..Self::default()
        }
    }

    pub fn submit_calls(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for InstantBackend {
    fn name(&self) -> &str {
        "instant"
    }

    async fn submit(&self, _request: &JobRequest) -> Result<String, InferenceError> {
        let call = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_all {
            return Err(InferenceError::ApiError {
                status: 422,
                body: "model rejected input".to_string(),
            });
        }
        Ok(format!("job-{call}"))
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusReport, InferenceError> {
        if self.never_finish {
            return Ok(StatusReport::pending());
        }
        Ok(StatusReport::completed(json!([format!(
            "https://cdn/{job_id}.png"
        )])))
    }
}

/// Build a test `ServerConfig` through the same loader production uses,
/// with fast polling and no pause between groups.
pub fn test_config() -> ServerConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("HOST", "127.0.0.1"),
        ("PORT", "0"),
        ("INFERENCE_API_URL", "http://inference.invalid"),
        ("INFERENCE_API_KEY", "test-key"),
        ("INFERENCE_MODEL", "edit-test"),
        ("RECORD_STORE_API_KEY", "test-key"),
        ("DEFAULT_JOB_COUNT", "2"),
        ("GROUP_PAUSE_MS", "0"),
        ("POLL_INITIAL_MS", "10"),
        ("POLL_INCREMENT_MS", "10"),
        ("POLL_MAX_MS", "50"),
    ]);
    ServerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
        .expect("test configuration is valid")
}

/// Handles the tests keep after the router is built.
pub struct TestContext {
    pub store: Arc<MemoryRecordStore>,
    pub backend: Arc<InstantBackend>,
    pub tasks: TaskTracker,
}

impl TestContext {
    /// Wait for every detached batch to finish.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }
}

/// Build the full application router over an in-memory record store.
pub fn build_test_app(backend: InstantBackend) -> (Router, TestContext) {
    let config = test_config();
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryRecordStore::new());
    let tasks = TaskTracker::new();

    let orchestrator = BatchOrchestrator::new(
        backend.clone(),
        store.clone(),
        config.fields.clone(),
        config.scheduler,
        config.defaults.clone(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: Arc::new(orchestrator),
        tasks: tasks.clone(),
    };

    let app = build_app_router(state, &config);
    (
        app,
        TestContext {
            store,
            backend,
            tasks,
        },
    )
}

pub fn record(id: &str) -> RecordRef {
    RecordRef::new(BASE, TABLE, id)
}

/// Fields of a record that is ready for a batch.
pub fn ready_fields() -> serde_json::Map<String, Value> {
    json!({
        "Input Images": [{ "url": "https://src/a.png" }],
        "Prompt": "a cat in a hat",
    })
    .as_object()
    .cloned()
    .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
