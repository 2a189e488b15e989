//! Job records and the feed contract.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tuner_spi::TuningMethod;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Lifecycle state of a tuning job.
///
/// Jobs move pending -> running -> one terminal state. Terminal jobs are
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// One tuning job: a single (entity, model) search submitted as part of a
/// batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub entity_sku: String,
    pub model_id: String,
    pub method: TuningMethod,
    pub status: JobStatus,
    /// Completion percentage, 0..=100
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub batch_id: String,
    pub created_at_ms: u64,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        entity_sku: impl Into<String>,
        model_id: impl Into<String>,
        method: TuningMethod,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_sku: entity_sku.into(),
            model_id: model_id.into(),
            method,
            status: JobStatus::Pending,
            progress: 0,
            error: None,
            result: None,
            batch_id: batch_id.into(),
            created_at_ms: now_ms(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Claim the job for execution. No-op once terminal.
    pub fn start(&mut self) {
        if !self.is_terminal() {
            self.status = JobStatus::Running;
        }
    }

    /// Update progress on a running job.
    pub fn set_progress(&mut self, percent: u8) {
        if self.status == JobStatus::Running {
            self.progress = percent.min(100);
        }
    }

    pub fn complete(&mut self, result: serde_json::Value) {
        if !self.is_terminal() {
            self.status = JobStatus::Completed;
            self.progress = 100;
            self.result = Some(result);
        }
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.is_terminal() {
            self.status = JobStatus::Failed;
            self.error = Some(error.into());
        }
    }

    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.status = JobStatus::Cancelled;
        }
    }
}

/// Feed answer shape. Some feeds return a bare array of jobs, others a
/// paged envelope; both deserialize here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobFeedResponse {
    List(Vec<Job>),
    Paged { total: usize, jobs: Vec<Job> },
}

impl JobFeedResponse {
    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            JobFeedResponse::List(jobs) => jobs,
            JobFeedResponse::Paged { jobs, .. } => jobs,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            JobFeedResponse::List(jobs) => jobs.len(),
            JobFeedResponse::Paged { total, .. } => *total,
        }
    }
}

/// Source of job snapshots for the status poller.
#[async_trait]
pub trait JobFeed: Send + Sync {
    async fn fetch_jobs(&self) -> Result<JobFeedResponse>;
}
