//! Job tracking error types.

use thiserror::Error;

/// Errors from the job feed and poller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// The job feed could not be reached.
    #[error("Job feed unavailable: {0}")]
    FeedUnavailable(String),

    /// The feed answered with a payload that does not match the contract.
    #[error("Malformed feed payload: {0}")]
    MalformedPayload(String),
}
