//! Contract module containing tuning traits.
//!
//! This module defines the seams the pipeline is assembled across:
//! - [`ForecastModel`] - trainable models under evaluation
//! - [`ValueAccessor`] - numeric extraction from raw data points
//! - [`SettingsProvider`] - organization-level settings lookup

mod forecast_model;
mod settings_provider;
mod value_accessor;

pub use forecast_model::ForecastModel;
pub use settings_provider::{
    InMemorySettings, NoSettings, SettingsProvider, FREQUENCY_KEY, SEASONAL_PERIODS_KEY,
};
pub use value_accessor::{FieldPriorityAccessor, ValueAccessor};
