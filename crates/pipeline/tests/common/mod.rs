#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use genbatch_core::job::{JobRequest, OutputShape};
use genbatch_core::polling::PollPolicy;
use genbatch_inference::api::InferenceError;
use genbatch_inference::backend::JobBackend;
use genbatch_inference::messages::StatusReport;
use serde_json::json;

/// How a scripted job answers status queries.
#[derive(Debug, Clone)]
pub enum Script {
    /// Pending for `after` queries, then completed with these outputs.
    Complete { after: usize, outputs: serde_json::Value },
    /// Pending for `after` queries, then failed.
    Fail { after: usize, reason: String },
    /// Query errors `errors` times, then completes with one output.
    Flaky { errors: usize },
    /// Pending forever.
    Hang,
}

/// Deterministic [`JobBackend`]: submissions are numbered `job-1`,
/// `job-2`, ... in call order; each job follows its [`Script`] (default:
/// complete on first query with `https://cdn/<id>.png`).
#[derive(Default)]
pub struct ScriptedBackend {
    submits: AtomicUsize,
    failing_submits: HashSet<usize>,
    scripts: HashMap<String, Script>,
    queries: Mutex<HashMap<String, usize>>,
    query_latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the given 1-based submit calls.
    pub fn failing_submits(mut self, calls: &[usize]) -> Self {
        self.failing_submits = calls.iter().copied().collect();
        self
    }

    pub fn script(mut self, job_id: &str, script: Script) -> Self {
        self.scripts.insert(job_id.to_string(), script);
        self
    }

    /// Make every status query take this long.
    pub fn query_latency(mut self, latency: Duration) -> Self {
        self.query_latency = latency;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn queries_for(&self, job_id: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .get(job_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit(&self, _request: &JobRequest) -> Result<String, InferenceError> {
        let call = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_submits.contains(&call) {
            return Err(InferenceError::ApiError {
                status: 400,
                body: format!("rejected call {call}"),
            });
        }
        Ok(format!("job-{call}"))
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusReport, InferenceError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.query_latency.is_zero() {
            tokio::time::sleep(self.query_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let seen = {
            let mut queries = self.queries.lock().unwrap();
            let count = queries.entry(job_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let script = self.scripts.get(job_id).cloned().unwrap_or(Script::Complete {
            after: 0,
            outputs: json!([format!("https://cdn/{job_id}.png")]),
        });

        match script {
            Script::Complete { after, outputs } if seen > after => {
                Ok(StatusReport::completed(outputs))
            }
            Script::Fail { after, reason } if seen > after => Ok(StatusReport::failed(reason)),
            Script::Flaky { errors } if seen <= errors => Err(InferenceError::ApiError {
                status: 503,
                body: "upstream busy".to_string(),
            }),
            Script::Flaky { .. } => Ok(StatusReport::completed(json!([format!(
                "https://cdn/{job_id}.png"
            )]))),
            _ => Ok(StatusReport::pending()),
        }
    }
}

pub fn request() -> JobRequest {
    JobRequest::new(
        vec!["https://src/a.png".to_string()],
        "a cat in a hat",
        OutputShape::with_resolution("1080p"),
    )
    .unwrap()
}

/// Fast, fixed-interval polling for tests.
pub fn fast_policy() -> PollPolicy {
    PollPolicy::new(
        Duration::from_secs(1),
        Duration::from_secs(1),
        Duration::from_secs(5),
    )
}
