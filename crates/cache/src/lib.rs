//! Optimization result cache
//!
//! Stores tuned parameters per (entity, model, tuning method) with
//! freshness tracking: a record is only served while the series it was
//! tuned on still hashes to the same value and its age is within the
//! expiry window. A selector ranks the valid records of an entity and
//! flags a single winner.

pub mod error;
pub mod hash;
pub mod selector;
pub mod store;

pub use error::CacheError;
pub use hash::{series_hash, HASH_VERSION};
pub use selector::{BestMethodSelector, BestSelection};
pub use store::{
    AppliedOptimization, CacheEntry, MethodCandidate, MethodRecord, OptimizationCache,
    DEFAULT_EXPIRY,
};

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
