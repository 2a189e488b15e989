//! Polling aggregator over a job feed.

use crate::batch::{BatchCounters, BatchTracker};
use crate::job::{Job, JobFeed};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Polling cadence and failure handling knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between polls while the feed is healthy.
    pub base_interval: Duration,
    /// Cap on the backed-off interval.
    pub max_interval: Duration,
    /// Consecutive failures after which polling halts until resumed.
    pub max_consecutive_failures: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
            max_consecutive_failures: 5,
        }
    }
}

impl PollConfig {
    /// Set the healthy polling interval
    pub fn base_interval(mut self, interval: Duration) -> Self {
        self.base_interval = interval.max(Duration::from_millis(100));
        self
    }

    /// Set the backoff cap
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval.max(self.base_interval);
        self
    }

    /// Set the halt threshold
    pub fn failure_threshold(mut self, failures: usize) -> Self {
        self.max_consecutive_failures = failures.max(1);
        self
    }
}

/// State published after every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Jobs in unfinished batches
    pub jobs: Vec<Job>,
    pub counters: BatchCounters,
    /// True once polling has halted and is waiting for a resume
    pub paused: bool,
    /// Last feed error, surfaced only while no jobs are in flight
    pub error: Option<String>,
}

/// Control handle for a running aggregator.
#[derive(Debug)]
pub struct AggregatorHandle {
    snapshots: watch::Receiver<JobSnapshot>,
    resume_tx: watch::Sender<u64>,
}

impl AggregatorHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver for awaiting snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshots.clone()
    }

    /// Restart polling after a failure halt.
    pub fn resume(&self) {
        self.resume_tx.send_modify(|generation| *generation += 1);
    }
}

/// Polls a [`JobFeed`], folds snapshots through a [`BatchTracker`], and
/// publishes [`JobSnapshot`]s on a watch channel.
///
/// Failures double the polling interval up to the configured cap. Once
/// the consecutive-failure threshold is hit, polling halts until the
/// handle's `resume` is called; any success resets the interval and the
/// failure count.
pub struct JobStatusAggregator {
    feed: Arc<dyn JobFeed>,
    config: PollConfig,
    tracker: BatchTracker,
    consecutive_failures: usize,
    paused: bool,
    last_error: Option<String>,
    last_jobs: Vec<Job>,
    snapshot_tx: watch::Sender<JobSnapshot>,
    resume_rx: watch::Receiver<u64>,
}

impl JobStatusAggregator {
    pub fn new(feed: Arc<dyn JobFeed>) -> (Self, AggregatorHandle) {
        Self::with_config(feed, PollConfig::default())
    }

    pub fn with_config(feed: Arc<dyn JobFeed>, config: PollConfig) -> (Self, AggregatorHandle) {
        let (snapshot_tx, snapshots) = watch::channel(JobSnapshot::default());
        let (resume_tx, resume_rx) = watch::channel(0u64);
        (
            Self {
                feed,
                config,
                tracker: BatchTracker::new(),
                consecutive_failures: 0,
                paused: false,
                last_error: None,
                last_jobs: Vec::new(),
                snapshot_tx,
                resume_rx,
            },
            AggregatorHandle {
                snapshots,
                resume_tx,
            },
        )
    }

    /// Interval until the next poll, doubled per consecutive failure.
    pub fn poll_interval(&self) -> Duration {
        let factor = 1u32 << self.consecutive_failures.min(16);
        self.config
            .base_interval
            .saturating_mul(factor)
            .min(self.config.max_interval)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// One poll step: fetch, fold into batch state, publish.
    pub async fn poll_once(&mut self) {
        match self.feed.fetch_jobs().await {
            Ok(response) => {
                self.consecutive_failures = 0;
                self.last_error = None;
                let jobs = response.into_jobs();
                self.tracker.observe(&jobs);
                self.last_jobs = jobs;
            }
            Err(err) => {
                self.consecutive_failures += 1;
                warn!(
                    failures = self.consecutive_failures,
                    "job feed poll failed: {err}"
                );
                self.last_error = Some(err.to_string());
                if self.consecutive_failures >= self.config.max_consecutive_failures {
                    self.paused = true;
                    warn!(
                        threshold = self.config.max_consecutive_failures,
                        "polling halted until resumed"
                    );
                }
            }
        }
        self.publish();
    }

    /// Poll until every snapshot receiver is gone.
    pub async fn run(mut self) {
        loop {
            if self.paused {
                if self.resume_rx.changed().await.is_err() {
                    break;
                }
                self.apply_resume();
                info!("polling resumed");
                self.publish();
            }
            self.poll_once().await;
            if self.snapshot_tx.is_closed() {
                break;
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    fn apply_resume(&mut self) {
        self.paused = false;
        self.consecutive_failures = 0;
    }

    fn publish(&self) {
        let counters = self.tracker.counters();
        let jobs = self.tracker.active_jobs(&self.last_jobs);
        // A transient feed blip must not disturb a live progress view.
        let error = if self.tracker.has_unfinished() {
            None
        } else {
            self.last_error.clone()
        };
        let _ = self.snapshot_tx.send(JobSnapshot {
            jobs,
            counters,
            paused: self.paused,
            error,
        });
    }
}
