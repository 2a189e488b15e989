//! Tunecast Models
//!
//! Reference forecasting models behind the tuning engine, exercising every
//! parameter-space kind:
//!
//! - `naive`: parameter-free baseline
//! - `moving_average`: window grid
//! - `ses`: alpha grid
//! - `holt`: alpha and beta grid
//! - `holt_winters`: seasonal, period-dependent data requirement
//! - `arima`: automatic order selection with `fitted_order` introspection
//!
//! [`standard_registry`] catalogs them all for the grid optimizer.

pub mod arima;
pub mod baseline;
pub mod smoothing;

mod registry;

pub use arima::{Arima, AutoArima};
pub use baseline::{MovingAverageForecaster, NaiveForecaster};
pub use registry::standard_registry;
pub use smoothing::{HoltLinear, HoltWinters, SimpleExponentialSmoothing};
