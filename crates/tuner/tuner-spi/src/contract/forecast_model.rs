//! Forecast model contract.

use crate::error::TuneError;
use crate::model::{ParamSet, ValidationMetrics};

/// Result type for forecast model operations.
pub type Result<T> = std::result::Result<T, TuneError>;

/// A trainable forecasting model under evaluation.
///
/// `train` and `validate` are required of every model. Models that resolve
/// parameters during training (automatic order selection) expose the
/// resolved values through [`ForecastModel::fitted_order`]; for everything
/// else the provided default applies.
pub trait ForecastModel {
    /// Fit the model to the training slice.
    fn train(&mut self, series: &[f64]) -> Result<()>;

    /// Forecast over the held-out slice and score the predictions.
    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics>;

    /// Parameters resolved during training, for models that choose their
    /// own. `None` means the model has nothing to report.
    fn fitted_order(&self) -> Option<ParamSet> {
        None
    }
}
