//! Fan-out submission and grouped polling.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{fast_policy, request, Script, ScriptedBackend};
use genbatch_core::aggregate::aggregate;
use genbatch_core::job::JobOutcome;
use genbatch_pipeline::scheduler::{BatchScheduler, SchedulerSettings};
use serde_json::json;
use tokio::time::Instant;

fn scheduler(
    backend: &Arc<ScriptedBackend>,
    max_concurrency: usize,
    pause_secs: u64,
) -> BatchScheduler {
    BatchScheduler::new(
        backend.clone(),
        SchedulerSettings {
            max_concurrency,
            group_pause: Duration::from_secs(pause_secs),
            poll_policy: fast_policy(),
        },
    )
}

const TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::test(start_paused = true)]
async fn all_jobs_succeed_in_one_group() {
    let backend = Arc::new(ScriptedBackend::new());
    let outcomes = scheduler(&backend, 4, 1).run(&request(), 4, TIMEOUT).await;

    assert_eq!(outcomes.len(), 4);
    for (i, o) in outcomes.iter().enumerate() {
        assert_eq!(o.slot, i);
        assert_eq!(o.job_id.as_deref(), Some(format!("job-{}", i + 1).as_str()));
        assert!(o.outcome.is_success());
    }

    let result = aggregate(&outcomes);
    assert_eq!(result.requested, 4);
    assert_eq!(result.succeeded, 4);
    assert_eq!(result.outputs.len(), 4);
    assert_eq!(result.outputs[0], "https://cdn/job-1.png");
    assert_eq!(result.status().label(), "Success");
}

#[tokio::test(start_paused = true)]
async fn job_count_is_clamped() {
    let backend = Arc::new(ScriptedBackend::new());
    let outcomes = scheduler(&backend, 4, 0).run(&request(), 50, TIMEOUT).await;
    assert_eq!(outcomes.len(), 8);
    assert_eq!(backend.submit_calls(), 8);

    let backend = Arc::new(ScriptedBackend::new());
    let outcomes = scheduler(&backend, 4, 0).run(&request(), 0, TIMEOUT).await;
    assert_eq!(outcomes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_submission_skips_polling_for_that_slot() {
    let backend = Arc::new(ScriptedBackend::new().failing_submits(&[2]));
    let outcomes = scheduler(&backend, 4, 0).run(&request(), 3, TIMEOUT).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].outcome.is_success());
    assert!(outcomes[2].outcome.is_success());

    assert_eq!(outcomes[1].job_id, None);
    assert_matches!(
        &outcomes[1].outcome,
        JobOutcome::Failure { reason } if reason.contains("rejected call 2")
    );
    assert_eq!(backend.queries_for("job-2"), 0);
}

#[tokio::test(start_paused = true)]
async fn simultaneous_polls_never_exceed_group_size() {
    let backend = Arc::new(ScriptedBackend::new().query_latency(Duration::from_secs(2)));
    let outcomes = scheduler(&backend, 3, 0).run(&request(), 8, TIMEOUT).await;

    assert_eq!(outcomes.len(), 8);
    assert!(outcomes.iter().all(|o| o.outcome.is_success()));
    assert_eq!(backend.max_in_flight(), 3);
}

#[tokio::test(start_paused = true)]
async fn outcomes_follow_submission_order_not_completion_order() {
    let backend = Arc::new(ScriptedBackend::new().script(
        "job-1",
        Script::Complete {
            after: 5,
            outputs: json!(["https://cdn/slow.png"]),
        },
    ));
    let outcomes = scheduler(&backend, 4, 0).run(&request(), 2, TIMEOUT).await;

    assert_eq!(outcomes[0].job_id.as_deref(), Some("job-1"));
    assert_eq!(
        outcomes[0].outcome,
        JobOutcome::Success {
            outputs: vec!["https://cdn/slow.png".to_string()]
        }
    );
    assert_eq!(outcomes[1].job_id.as_deref(), Some("job-2"));

    let result = aggregate(&outcomes);
    assert_eq!(result.outputs, vec!["https://cdn/slow.png", "https://cdn/job-2.png"]);
}

#[tokio::test(start_paused = true)]
async fn groups_are_separated_by_pause() {
    let backend = Arc::new(ScriptedBackend::new());
    let started = Instant::now();

    let outcomes = scheduler(&backend, 1, 10).run(&request(), 3, TIMEOUT).await;

    assert_eq!(outcomes.len(), 3);
    // Two pauses: before group 2 and before group 3.
    assert_eq!(started.elapsed(), Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn per_job_timeout_is_clamped_to_minimum() {
    let backend = Arc::new(ScriptedBackend::new().script("job-1", Script::Hang));
    let outcomes = scheduler(&backend, 4, 0)
        .run(&request(), 1, Duration::from_secs(1))
        .await;

    assert_matches!(
        &outcomes[0].outcome,
        JobOutcome::Timeout { reason } if reason.starts_with("timed out after 60s")
    );
}

#[tokio::test(start_paused = true)]
async fn one_timeout_does_not_affect_siblings() {
    let backend = Arc::new(ScriptedBackend::new().script("job-2", Script::Hang));
    let outcomes = scheduler(&backend, 4, 0).run(&request(), 3, TIMEOUT).await;

    assert!(outcomes[0].outcome.is_success());
    assert_matches!(outcomes[1].outcome, JobOutcome::Timeout { .. });
    assert!(outcomes[2].outcome.is_success());
}

#[tokio::test(start_paused = true)]
async fn zero_concurrency_is_treated_as_one() {
    let backend = Arc::new(ScriptedBackend::new().query_latency(Duration::from_secs(1)));
    let s = scheduler(&backend, 0, 0);
    assert_eq!(s.settings().max_concurrency, 1);

    let outcomes = s.run(&request(), 2, TIMEOUT).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(backend.max_in_flight(), 1);
}
