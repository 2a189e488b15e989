//! Asynchronous tuning job tracking
//!
//! Long-running parameter searches execute remotely as jobs grouped into
//! batches. This crate carries the job vocabulary shared with the feed,
//! batch progress accounting that tolerates batches growing mid-flight,
//! and a polling aggregator with exponential backoff that publishes
//! snapshots on a watch channel.

pub mod aggregator;
pub mod batch;
pub mod error;
pub mod job;

pub use aggregator::{AggregatorHandle, JobSnapshot, JobStatusAggregator, PollConfig};
pub use batch::{BatchCounters, BatchTracker};
pub use error::JobError;
pub use job::{Job, JobFeed, JobFeedResponse, JobStatus};

/// Result type for job tracking operations.
pub type Result<T> = std::result::Result<T, JobError>;
