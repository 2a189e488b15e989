//! Exponential smoothing models
//!
//! Exponential smoothing assigns exponentially decreasing weights to past
//! observations. Three variants:
//!
//! - **Simple (SES)**: For series without trend or seasonality
//! - **Holt's linear**: For series with trend but no seasonality
//! - **Holt-Winters**: For series with both trend and additive seasonality
//!
//! ## Choosing Parameters
//!
//! - `alpha` (level): Higher values = more responsive to recent changes
//! - `beta` (trend): Controls trend smoothing
//! - `gamma` (seasonal): Controls seasonal smoothing

use serde::{Deserialize, Serialize};
use tuner_spi::{ForecastModel, Result, TuneError, ValidationMetrics};

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0 < value && value < 1.0) {
        return Err(TuneError::InvalidParameter {
            name: name.to_string(),
            reason: "must be between 0 and 1 (exclusive)".to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Simple Exponential Smoothing (SES)
// ============================================================================

/// Simple Exponential Smoothing for stationary series
///
/// Formula: `S_t = alpha * Y_t + (1 - alpha) * S_{t-1}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleExponentialSmoothing {
    /// Smoothing parameter (0 < alpha < 1)
    alpha: f64,
    /// Current level estimate
    level: f64,
    /// Whether the model has been fitted
    fitted: bool,
}

impl SimpleExponentialSmoothing {
    pub fn new(alpha: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        Ok(Self {
            alpha,
            level: 0.0,
            fitted: false,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// SES produces flat forecasts at the final level
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TuneError::NotFitted);
        }
        Ok(vec![self.level; steps])
    }
}

impl ForecastModel for SimpleExponentialSmoothing {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        if series.len() < 2 {
            return Err(TuneError::InsufficientData {
                required: 2,
                actual: series.len(),
            });
        }

        self.level = series[0];
        for &value in &series[1..] {
            self.level = self.alpha * value + (1.0 - self.alpha) * self.level;
        }

        self.fitted = true;
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}

// ============================================================================
// Holt's Linear Trend
// ============================================================================

/// Double exponential smoothing (Holt's linear trend method)
///
/// Extends SES with a smoothed linear trend component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoltLinear {
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter
    beta: f64,
    /// Current level
    level: f64,
    /// Current trend
    trend: f64,
    /// Whether the model has been fitted
    fitted: bool,
}

impl HoltLinear {
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("beta", beta)?;
        Ok(Self {
            alpha,
            beta,
            level: 0.0,
            trend: 0.0,
            fitted: false,
        })
    }

    /// Current (level, trend) estimates
    pub fn components(&self) -> (f64, f64) {
        (self.level, self.trend)
    }

    /// Linear forecast: level plus h steps of trend
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TuneError::NotFitted);
        }
        Ok((1..=steps)
            .map(|h| self.level + h as f64 * self.trend)
            .collect())
    }
}

impl ForecastModel for HoltLinear {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        if series.len() < 3 {
            return Err(TuneError::InsufficientData {
                required: 3,
                actual: series.len(),
            });
        }

        self.level = series[0];
        self.trend = series[1] - series[0];

        for &value in &series[1..] {
            let prev_level = self.level;
            self.level = self.alpha * value + (1.0 - self.alpha) * (self.level + self.trend);
            self.trend = self.beta * (self.level - prev_level) + (1.0 - self.beta) * self.trend;
        }

        self.fitted = true;
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}

// ============================================================================
// Holt-Winters (additive)
// ============================================================================

/// Triple exponential smoothing with additive seasonality.
///
/// Requires at least two full seasonal cycles to initialize the seasonal
/// components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoltWinters {
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter
    beta: f64,
    /// Seasonal smoothing parameter
    gamma: f64,
    /// Seasonal period length
    period: usize,
    /// Current level
    level: f64,
    /// Current trend
    trend: f64,
    /// Seasonal components, one per slot in the cycle
    seasonal: Vec<f64>,
    /// Index of the next seasonal slot after the training data
    next_slot: usize,
    /// Whether the model has been fitted
    fitted: bool,
}

impl HoltWinters {
    pub fn new(alpha: f64, beta: f64, gamma: f64, period: usize) -> Result<Self> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("beta", beta)?;
        check_unit_interval("gamma", gamma)?;
        if period < 2 {
            return Err(TuneError::InvalidParameter {
                name: "period".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }

        Ok(Self {
            alpha,
            beta,
            gamma,
            period,
            level: 0.0,
            trend: 0.0,
            seasonal: vec![0.0; period],
            next_slot: 0,
            fitted: false,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Current components: (level, trend, seasonal)
    pub fn components(&self) -> (f64, f64, &[f64]) {
        (self.level, self.trend, &self.seasonal)
    }

    fn initialize(&mut self, series: &[f64]) {
        // Level: mean of the first cycle. Trend: average change between
        // the first two cycles.
        self.level = series[..self.period].iter().sum::<f64>() / self.period as f64;
        let second: f64 =
            series[self.period..2 * self.period].iter().sum::<f64>() / self.period as f64;
        self.trend = (second - self.level) / self.period as f64;

        for i in 0..self.period {
            self.seasonal[i] = series[i] - self.level;
        }
    }

    /// Forecast continuing the seasonal cycle where training left off
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TuneError::NotFitted);
        }

        Ok((1..=steps)
            .map(|h| {
                let slot = (self.next_slot + h - 1) % self.period;
                self.level + h as f64 * self.trend + self.seasonal[slot]
            })
            .collect())
    }
}

impl ForecastModel for HoltWinters {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        let min_required = self.period * 2;
        if series.len() < min_required {
            return Err(TuneError::InsufficientData {
                required: min_required,
                actual: series.len(),
            });
        }

        self.initialize(series);

        for (i, &value) in series.iter().enumerate().skip(self.period) {
            let slot = i % self.period;
            let prev_level = self.level;
            let prev_seasonal = self.seasonal[slot];

            self.level = self.alpha * (value - prev_seasonal)
                + (1.0 - self.alpha) * (self.level + self.trend);
            self.trend = self.beta * (self.level - prev_level) + (1.0 - self.beta) * self.trend;
            self.seasonal[slot] =
                self.gamma * (value - self.level) + (1.0 - self.gamma) * prev_seasonal;
        }

        self.next_slot = series.len() % self.period;
        self.fitted = true;
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}
