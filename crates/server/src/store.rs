//! In-memory job store with a claimable work queue.

use dashmap::DashMap;
use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use tunecast_jobs::{Job, JobStatus};
use tuner_facade::Frequency;

/// Search options shared by every job of a submission batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub frequency: Option<Frequency>,
    pub seasonal_period: Option<usize>,
}

/// Holds every job ever submitted plus a FIFO of pending job ids.
///
/// Claiming is atomic on the job record: a queued id whose job is no
/// longer pending (cancelled while waiting) is skipped, and at most one
/// worker can move a job to running.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<String, Job>,
    queue: Mutex<VecDeque<String>>,
    work_ready: Notify,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, job: Job) {
        let id = job.id.clone();
        self.jobs.insert(id.clone(), job);
        self.queue.lock().await.push_back(id);
        self.work_ready.notify_one();
    }

    /// Wait for a pending job and claim it.
    pub async fn next_claimed(&self) -> Job {
        loop {
            let id = self.queue.lock().await.pop_front();
            match id {
                Some(id) => {
                    if let Some(mut job) = self.jobs.get_mut(&id) {
                        if job.status == JobStatus::Pending {
                            job.start();
                            return job.clone();
                        }
                    }
                    // Cancelled while queued; move on.
                }
                None => self.work_ready.notified().await,
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        self.jobs.get(id).map(|job| job.clone())
    }

    pub fn set_progress(&self, id: &str, percent: u8) {
        if let Some(mut job) = self.jobs.get_mut(id) {
            job.set_progress(percent);
        }
    }

    pub fn complete(&self, id: &str, result: serde_json::Value) {
        if let Some(mut job) = self.jobs.get_mut(id) {
            job.complete(result);
        }
    }

    pub fn fail(&self, id: &str, error: impl Into<String>) {
        if let Some(mut job) = self.jobs.get_mut(id) {
            job.fail(error);
        }
    }

    /// Cancel a job if it has not finished. Returns the updated record.
    pub fn cancel(&self, id: &str) -> Option<Job> {
        let mut job = self.jobs.get_mut(id)?;
        job.cancel();
        Some(job.clone())
    }

    /// All jobs, oldest first.
    pub fn snapshot(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|job| job.clone()).collect();
        jobs.sort_by(|a, b| {
            a.created_at_ms
                .cmp(&b.created_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_facade::TuningMethod;

    fn job(id: &str) -> Job {
        Job::new(id, "sku-1", "ses", TuningMethod::Grid, "b1")
    }

    #[tokio::test]
    async fn test_claim_marks_running() {
        let store = JobStore::new();
        store.enqueue(job("j1")).await;

        let claimed = store.next_claimed().await;
        assert_eq!(claimed.id, "j1");
        assert_eq!(claimed.status, JobStatus::Running);
        assert_eq!(store.get("j1").unwrap().status, JobStatus::Running);
    }

    #[tokio::test]
    async fn test_claims_come_in_submission_order() {
        let store = JobStore::new();
        store.enqueue(job("j1")).await;
        store.enqueue(job("j2")).await;

        assert_eq!(store.next_claimed().await.id, "j1");
        assert_eq!(store.next_claimed().await.id, "j2");
    }

    #[tokio::test]
    async fn test_cancelled_jobs_are_skipped() {
        let store = JobStore::new();
        store.enqueue(job("j1")).await;
        store.enqueue(job("j2")).await;
        store.cancel("j1").unwrap();

        let claimed = store.next_claimed().await;
        assert_eq!(claimed.id, "j2");
        assert_eq!(store.get("j1").unwrap().status, JobStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_completion_is_a_no_op() {
        let store = JobStore::new();
        store.enqueue(job("j1")).await;
        let claimed = store.next_claimed().await;
        store.complete(&claimed.id, serde_json::json!({"ok": true}));

        let job = store.cancel("j1").unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_snapshot_is_oldest_first() {
        let store = JobStore::new();
        let mut early = job("j-late-id");
        early.created_at_ms = 100;
        let mut late = job("j-early-id");
        late.created_at_ms = 200;
        store.enqueue(late).await;
        store.enqueue(early).await;

        let ids: Vec<String> = store.snapshot().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["j-late-id".to_string(), "j-early-id".to_string()]);
        assert_eq!(store.len(), 2);
    }
}
