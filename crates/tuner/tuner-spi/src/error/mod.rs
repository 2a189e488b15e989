//! Error module containing tuning error types.

mod tune_error;

pub use tune_error::TuneError;
