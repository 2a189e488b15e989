//! Tuner Core
//!
//! Implementations of the tuning pipeline:
//! - Series data-quality validation
//! - Model compatibility filtering
//! - Parameter grid expansion and seasonal-period resolution
//! - Fail-soft combination evaluation
//! - Walk-forward and k-fold cross-validation
//! - Sequential grid search orchestration

pub mod compat;
pub mod engine;
pub mod evaluate;
pub mod grid;
pub mod progress;
pub mod registry;
pub mod search;
pub mod validate;

pub use compat::filter_compatible;
pub use engine::ValidationEngine;
pub use evaluate::evaluate_combination;
pub use grid::{cartesian, combinations, resolve_seasonal_period};
pub use progress::ProgressSender;
pub use registry::{MinObservations, ModelFactory, ModelRegistry, ModelSpec, ParamSpace};
pub use search::GridOptimizer;
pub use validate::{extract_values, validate_and_preprocess, validate_points};
