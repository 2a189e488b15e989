//! Tuner Service Provider Interface
//!
//! Defines the contracts shared by every tuning component:
//! - Forecast model collaboration
//! - Value extraction from raw sales points
//! - Global settings lookup
//! - Parameter, metric, and result value types

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at the crate root.
pub use contract::{
    FieldPriorityAccessor, ForecastModel, InMemorySettings, NoSettings, SettingsProvider,
    ValueAccessor, FREQUENCY_KEY, SEASONAL_PERIODS_KEY,
};
pub use error::TuneError;
pub use model::{
    ComparisonOutcome, CompatibilityReport, EvaluationResult, ModelRejection, ModelSummary,
    ParamGrid, ParamSet, ParamValue, SearchProgress, SearchSummary, SummaryStats, TuningMethod,
    ValidationMetrics, ValidationScore,
};

/// Result type for tuning operations.
pub type Result<T> = std::result::Result<T, TuneError>;
