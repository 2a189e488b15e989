//! Baseline forecasting models
//!
//! Simple references every other model has to beat:
//!
//! - **Naive**: Repeats the last observed value
//! - **Moving Average**: Repeats the mean of the last `window` observations

use serde::{Deserialize, Serialize};
use tuner_spi::{ForecastModel, Result, TuneError, ValidationMetrics};

/// Naive forecaster: the last observation carried forward.
///
/// Best for: a lower bound on every series, and surprisingly hard to beat
/// on random-walk-like demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveForecaster {
    /// Last observed value
    last: Option<f64>,
}

impl NaiveForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat forecast of the last observation
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let last = self.last.ok_or(TuneError::NotFitted)?;
        Ok(vec![last; steps])
    }
}

impl ForecastModel for NaiveForecaster {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        match series.last() {
            Some(&value) => {
                self.last = Some(value);
                Ok(())
            }
            None => Err(TuneError::InsufficientData {
                required: 1,
                actual: 0,
            }),
        }
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}

/// Moving-average forecaster: flat forecast of the mean of the last
/// `window` observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverageForecaster {
    /// Number of trailing observations to average
    window: usize,
    /// Mean of the last window after training
    level: Option<f64>,
}

impl MovingAverageForecaster {
    /// Create a new moving-average model
    ///
    /// # Arguments
    ///
    /// * `window` - Number of observations to average (must be >= 2)
    pub fn new(window: usize) -> Result<Self> {
        if window < 2 {
            return Err(TuneError::InvalidParameter {
                name: "window".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }

        Ok(Self {
            window,
            level: None,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Flat forecast of the trailing mean
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let level = self.level.ok_or(TuneError::NotFitted)?;
        Ok(vec![level; steps])
    }
}

impl ForecastModel for MovingAverageForecaster {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        if series.len() < self.window {
            return Err(TuneError::InsufficientData {
                required: self.window,
                actual: series.len(),
            });
        }

        let tail = &series[series.len() - self.window..];
        self.level = Some(tail.iter().sum::<f64>() / self.window as f64);
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}
