//! Batch accounting over observed job snapshots.

use crate::job::{Job, JobStatus};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Aggregate progress counters across all tracked batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounters {
    pub total: usize,
    /// Jobs that finished processing (completed or failed)
    pub completed: usize,
    pub cancelled: usize,
    /// completed / (total - cancelled), in percent
    pub percent: u8,
}

#[derive(Debug, Default)]
struct BatchState {
    /// Every job id ever observed in the batch, with its latest status
    jobs: HashMap<String, JobStatus>,
}

impl BatchState {
    fn total(&self) -> usize {
        self.jobs.len()
    }

    fn completed(&self) -> usize {
        self.jobs
            .values()
            .filter(|status| status.is_terminal() && **status != JobStatus::Cancelled)
            .count()
    }

    fn cancelled(&self) -> usize {
        self.jobs
            .values()
            .filter(|status| **status == JobStatus::Cancelled)
            .count()
    }

    fn is_finished(&self) -> bool {
        self.jobs.values().all(JobStatus::is_terminal)
    }
}

/// Tracks batches of jobs across polling snapshots.
///
/// A batch's job set is pinned at first observation; identifiers appearing
/// later grow the total, and nothing shrinks it mid-flight. Once every
/// known job in every tracked batch is terminal, the next observation
/// drops those batches and the counters start over at zero. A dropped
/// batch stays untracked while the feed keeps reporting its jobs.
#[derive(Debug, Default)]
pub struct BatchTracker {
    batches: HashMap<String, BatchState>,
    drained: HashSet<String>,
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one snapshot of the job feed into the batch state.
    pub fn observe(&mut self, jobs: &[Job]) {
        if !self.batches.is_empty() && self.batches.values().all(BatchState::is_finished) {
            self.drained.extend(self.batches.drain().map(|(id, _)| id));
        }

        let seen: HashSet<&str> = jobs.iter().map(|job| job.batch_id.as_str()).collect();
        self.drained.retain(|id| seen.contains(id.as_str()));

        for job in jobs {
            if self.drained.contains(&job.batch_id) {
                continue;
            }
            let state = self.batches.entry(job.batch_id.clone()).or_default();
            state.jobs.insert(job.id.clone(), job.status);
        }
    }

    pub fn counters(&self) -> BatchCounters {
        let total: usize = self.batches.values().map(BatchState::total).sum();
        let completed: usize = self.batches.values().map(BatchState::completed).sum();
        let cancelled: usize = self.batches.values().map(BatchState::cancelled).sum();
        let denominator = total.saturating_sub(cancelled);
        let percent = if denominator == 0 {
            0
        } else {
            (completed * 100 / denominator).min(100) as u8
        };
        BatchCounters {
            total,
            completed,
            cancelled,
            percent,
        }
    }

    /// True while any tracked batch still has a non-terminal job.
    pub fn has_unfinished(&self) -> bool {
        self.batches.values().any(|batch| !batch.is_finished())
    }

    /// The subset of `jobs` belonging to an unfinished batch. Finished
    /// batches disappear from the live view.
    pub fn active_jobs(&self, jobs: &[Job]) -> Vec<Job> {
        jobs.iter()
            .filter(|job| {
                self.batches
                    .get(&job.batch_id)
                    .is_some_and(|batch| !batch.is_finished())
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_spi::TuningMethod;

    fn job(id: &str, batch: &str, status: JobStatus) -> Job {
        let mut j = Job::new(id, "sku-1", "ses", TuningMethod::Grid, batch);
        j.status = status;
        j
    }

    fn batch_of(batch: &str, n: usize, status: JobStatus) -> Vec<Job> {
        (0..n)
            .map(|i| job(&format!("{batch}-j{i}"), batch, status))
            .collect()
    }

    // ========== Totals ==========

    #[test]
    fn test_total_fixed_at_first_observation() {
        let mut tracker = BatchTracker::new();
        tracker.observe(&batch_of("b1", 5, JobStatus::Pending));
        assert_eq!(tracker.counters().total, 5);

        // Same jobs again, now running. Nothing changes.
        tracker.observe(&batch_of("b1", 5, JobStatus::Running));
        assert_eq!(tracker.counters().total, 5);
    }

    #[test]
    fn test_batch_growth_adds_to_total() {
        let mut tracker = BatchTracker::new();
        tracker.observe(&batch_of("b1", 3, JobStatus::Running));
        assert_eq!(tracker.counters().total, 3);

        tracker.observe(&batch_of("b1", 5, JobStatus::Running));
        assert_eq!(tracker.counters().total, 5);
    }

    #[test]
    fn test_total_never_shrinks_mid_flight() {
        let mut tracker = BatchTracker::new();
        tracker.observe(&batch_of("b1", 5, JobStatus::Running));
        // Feed momentarily reports a partial view.
        tracker.observe(&batch_of("b1", 2, JobStatus::Running));
        assert_eq!(tracker.counters().total, 5);
    }

    // ========== Draining ==========

    #[test]
    fn test_batch_drains_then_resets() {
        let mut tracker = BatchTracker::new();
        tracker.observe(&batch_of("b1", 5, JobStatus::Pending));
        tracker.observe(&batch_of("b1", 5, JobStatus::Running));

        let finished = batch_of("b1", 5, JobStatus::Completed);
        tracker.observe(&finished);
        let counters = tracker.counters();
        assert_eq!(counters.completed, 5);
        assert_eq!(counters.total, 5);
        assert_eq!(counters.percent, 100);
        assert!(!tracker.has_unfinished());

        // The poll after full drain starts a clean slate, even if the feed
        // still reports the old jobs.
        tracker.observe(&finished);
        assert_eq!(tracker.counters(), BatchCounters::default());
        assert!(tracker.active_jobs(&finished).is_empty());
    }

    #[test]
    fn test_finished_batch_counts_until_all_finish() {
        let mut tracker = BatchTracker::new();
        let mut jobs = batch_of("b1", 2, JobStatus::Completed);
        jobs.extend(batch_of("b2", 3, JobStatus::Running));
        tracker.observe(&jobs);

        let counters = tracker.counters();
        assert_eq!(counters.total, 5);
        assert_eq!(counters.completed, 2);
        assert_eq!(counters.percent, 40);
        assert!(tracker.has_unfinished());

        // The finished batch drops out of the live view right away.
        let active = tracker.active_jobs(&jobs);
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|j| j.batch_id == "b2"));
    }

    // ========== Percentages ==========

    #[test]
    fn test_cancelled_jobs_leave_the_denominator() {
        let mut tracker = BatchTracker::new();
        let mut jobs = batch_of("b1", 2, JobStatus::Completed);
        jobs.push(job("b1-j2", "b1", JobStatus::Cancelled));
        jobs.push(job("b1-j3", "b1", JobStatus::Running));
        tracker.observe(&jobs);

        let counters = tracker.counters();
        assert_eq!(counters.total, 4);
        assert_eq!(counters.completed, 2);
        assert_eq!(counters.cancelled, 1);
        // 2 of (4 - 1)
        assert_eq!(counters.percent, 66);
    }

    #[test]
    fn test_all_cancelled_guards_division() {
        let mut tracker = BatchTracker::new();
        tracker.observe(&batch_of("b1", 3, JobStatus::Cancelled));
        assert_eq!(tracker.counters().percent, 0);
    }

    #[test]
    fn test_failed_jobs_count_as_processed() {
        let mut tracker = BatchTracker::new();
        let mut jobs = batch_of("b1", 3, JobStatus::Completed);
        jobs.push(job("b1-j3", "b1", JobStatus::Failed));
        tracker.observe(&jobs);

        let counters = tracker.counters();
        assert_eq!(counters.completed, 4);
        assert_eq!(counters.percent, 100);
        assert!(!tracker.has_unfinished());
    }
}
