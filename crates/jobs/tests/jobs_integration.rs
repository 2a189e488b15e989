//! Integration tests for tunecast-jobs

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tunecast_jobs::{
    Job, JobError, JobFeed, JobFeedResponse, JobStatus, JobStatusAggregator, PollConfig, Result,
};
use tuner_spi::TuningMethod;

struct ScriptedFeed {
    script: Mutex<VecDeque<Result<JobFeedResponse>>>,
}

impl ScriptedFeed {
    fn new(script: Vec<Result<JobFeedResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl JobFeed for ScriptedFeed {
    async fn fetch_jobs(&self) -> Result<JobFeedResponse> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobFeedResponse::List(Vec::new())))
    }
}

/// Feed answering canned JSON bodies, exercising the real wire parsing.
struct JsonFeed {
    bodies: Mutex<VecDeque<String>>,
}

impl JsonFeed {
    fn new(bodies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            bodies: Mutex::new(bodies.into()),
        })
    }
}

#[async_trait]
impl JobFeed for JsonFeed {
    async fn fetch_jobs(&self) -> Result<JobFeedResponse> {
        let body = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&body).map_err(|e| JobError::MalformedPayload(e.to_string()))
    }
}

fn job(id: &str, batch: &str, status: JobStatus) -> Job {
    let mut j = Job::new(id, "sku-1", "ses", TuningMethod::Grid, batch);
    j.status = status;
    j
}

fn job_json(id: &str, status: &str) -> String {
    format!(
        r#"{{"id":"{id}","entity_sku":"sku-1","model_id":"ses","method":"grid","status":"{status}","progress":0,"batch_id":"b1","created_at_ms":1000}}"#
    )
}

#[tokio::test]
async fn test_batch_lifecycle_through_snapshots() {
    let feed = ScriptedFeed::new(vec![
        Ok(JobFeedResponse::List(vec![
            job("j1", "b1", JobStatus::Running),
            job("j2", "b1", JobStatus::Pending),
        ])),
        // The batch grows mid-flight and one job gets cancelled.
        Ok(JobFeedResponse::List(vec![
            job("j1", "b1", JobStatus::Completed),
            job("j2", "b1", JobStatus::Cancelled),
            job("j3", "b1", JobStatus::Running),
        ])),
        Ok(JobFeedResponse::List(vec![
            job("j1", "b1", JobStatus::Completed),
            job("j2", "b1", JobStatus::Cancelled),
            job("j3", "b1", JobStatus::Failed),
        ])),
        Ok(JobFeedResponse::List(Vec::new())),
    ]);
    let (mut aggregator, handle) = JobStatusAggregator::new(feed);

    aggregator.poll_once().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.counters.total, 2);
    assert_eq!(snapshot.counters.percent, 0);
    assert_eq!(snapshot.jobs.len(), 2);

    aggregator.poll_once().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.counters.total, 3);
    assert_eq!(snapshot.counters.completed, 1);
    assert_eq!(snapshot.counters.cancelled, 1);
    // 1 of (3 - 1)
    assert_eq!(snapshot.counters.percent, 50);

    // Failed counts as processed; the batch is done at 100%.
    aggregator.poll_once().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.counters.completed, 2);
    assert_eq!(snapshot.counters.percent, 100);
    assert!(snapshot.jobs.is_empty());

    // Next poll starts a clean slate.
    aggregator.poll_once().await;
    assert_eq!(handle.snapshot().counters.total, 0);
}

#[tokio::test]
async fn test_feed_shapes_parse_from_wire() {
    let feed = JsonFeed::new(vec![
        // Bare array.
        format!("[{},{}]", job_json("j1", "running"), job_json("j2", "running")),
        // Paged envelope with the same jobs finished.
        format!(
            r#"{{"total":2,"jobs":[{},{}]}}"#,
            job_json("j1", "completed"),
            job_json("j2", "completed")
        ),
    ]);
    let (mut aggregator, handle) = JobStatusAggregator::new(feed);

    aggregator.poll_once().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.counters.total, 2);
    assert_eq!(snapshot.counters.completed, 0);
    assert!(snapshot.error.is_none());

    aggregator.poll_once().await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.counters.completed, 2);
    assert_eq!(snapshot.counters.percent, 100);
}

#[tokio::test]
async fn test_malformed_payload_backs_off_but_keeps_progress_quiet() {
    let feed = JsonFeed::new(vec![
        format!("[{}]", job_json("j1", "running")),
        "not json".to_string(),
        "also not json".to_string(),
    ]);
    let (mut aggregator, handle) = JobStatusAggregator::new(feed);

    aggregator.poll_once().await;
    aggregator.poll_once().await;
    aggregator.poll_once().await;

    // Backoff kicked in, but the live progress view stays error-free.
    assert_eq!(aggregator.poll_interval(), Duration::from_secs(8));
    let snapshot = handle.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.jobs.len(), 1);
    assert!(!snapshot.paused);
}

#[tokio::test(start_paused = true)]
async fn test_run_halts_at_threshold_and_resumes_via_handle() {
    let mut script: Vec<Result<JobFeedResponse>> = (0..3)
        .map(|_| Err(JobError::FeedUnavailable("connection refused".to_string())))
        .collect();
    script.push(Ok(JobFeedResponse::List(vec![job(
        "j1",
        "b1",
        JobStatus::Completed,
    )])));
    let feed = ScriptedFeed::new(script);
    let config = PollConfig::default()
        .base_interval(Duration::from_millis(200))
        .max_interval(Duration::from_secs(1))
        .failure_threshold(3);
    let (aggregator, handle) = JobStatusAggregator::with_config(feed, config);
    let mut rx = handle.subscribe();
    let poller = tokio::spawn(aggregator.run());

    // Three straight failures halt the poller.
    loop {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.paused {
            assert_eq!(
                snapshot.error.as_deref(),
                Some("Job feed unavailable: connection refused")
            );
            break;
        }
    }

    // An explicit resume restarts polling and the next poll succeeds.
    handle.resume();
    loop {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        if !snapshot.paused && snapshot.counters.total == 1 {
            assert_eq!(snapshot.counters.percent, 100);
            assert!(snapshot.error.is_none());
            break;
        }
    }

    drop(rx);
    drop(handle);
    poller.await.unwrap();
}
