//! Model module containing tuning data structures.
//!
//! This module defines the value types flowing through the pipeline:
//! - [`ParamValue`], [`ParamSet`], [`ParamGrid`] - parameter identity
//! - [`ValidationMetrics`], [`ValidationScore`] - accuracy measurements
//! - [`EvaluationResult`], [`SearchSummary`] - search outcomes
//! - [`SearchProgress`] - progress channel events

mod evaluation;
mod method;
mod metrics;
mod param;
mod progress;

pub use evaluation::{
    ComparisonOutcome, CompatibilityReport, EvaluationResult, ModelRejection, ModelSummary,
    SearchSummary, SummaryStats,
};
pub use method::TuningMethod;
pub use metrics::{ValidationMetrics, ValidationScore};
pub use param::{ParamGrid, ParamSet, ParamValue};
pub use progress::SearchProgress;
