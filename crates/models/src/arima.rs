//! ARIMA (AutoRegressive Integrated Moving Average)
//!
//! Combines three components:
//!
//! - **AR (p)**: regression on past values
//! - **I (d)**: differencing to reach stationarity
//! - **MA (q)**: regression on past forecast errors
//!
//! `Arima` fits a fixed (p, d, q) order; [`AutoArima`] searches a small
//! order grid on a hold-out split and reports the winning order through
//! `fitted_order`.

use serde::{Deserialize, Serialize};
use tuner_spi::{ForecastModel, ParamSet, Result, TuneError, ValidationMetrics};

/// Largest AR/MA order accepted.
const MAX_ORDER: usize = 10;
/// Largest differencing degree accepted.
const MAX_DIFFERENCING: usize = 2;

/// ARIMA model with fixed orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arima {
    /// AR order (p)
    p: usize,
    /// Differencing degree (d)
    d: usize,
    /// MA order (q)
    q: usize,
    /// AR coefficients
    ar_coeffs: Vec<f64>,
    /// MA coefficients
    ma_coeffs: Vec<f64>,
    /// Mean of the differenced series
    constant: f64,
    /// Training series, kept for undifferencing forecasts
    history: Vec<f64>,
    /// Differenced training series
    differenced: Vec<f64>,
    /// In-sample residuals on the differenced scale
    residuals: Vec<f64>,
    /// Whether the model has been fitted
    fitted: bool,
}

impl Arima {
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > MAX_ORDER {
            return Err(TuneError::InvalidParameter {
                name: "p".to_string(),
                reason: format!("AR order must be <= {MAX_ORDER}"),
            });
        }
        if d > MAX_DIFFERENCING {
            return Err(TuneError::InvalidParameter {
                name: "d".to_string(),
                reason: format!("differencing degree must be <= {MAX_DIFFERENCING}"),
            });
        }
        if q > MAX_ORDER {
            return Err(TuneError::InvalidParameter {
                name: "q".to_string(),
                reason: format!("MA order must be <= {MAX_ORDER}"),
            });
        }

        Ok(Self {
            p,
            d,
            q,
            ar_coeffs: vec![0.0; p],
            ma_coeffs: vec![0.0; q],
            constant: 0.0,
            history: Vec::new(),
            differenced: Vec::new(),
            residuals: Vec::new(),
            fitted: false,
        })
    }

    /// The (p, d, q) order
    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Forecast on the original scale
    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(TuneError::NotFitted);
        }
        if steps == 0 {
            return Ok(Vec::new());
        }

        let n = self.differenced.len();
        let mut extended = self.differenced.clone();
        let mut extended_residuals = self.residuals.clone();

        for _ in 0..steps {
            let mut next = self.constant;
            for j in 0..self.p {
                let idx = extended.len() - j - 1;
                next += self.ar_coeffs[j] * (extended[idx] - self.constant);
            }
            for j in 0..self.q.min(extended_residuals.len()) {
                let idx = extended_residuals.len() - j - 1;
                next += self.ma_coeffs[j] * extended_residuals[idx];
            }
            extended.push(next);
            // Future shocks are unknown, so they enter as zero.
            extended_residuals.push(0.0);
        }

        Ok(self.undifference(&extended[n..]))
    }

    fn difference(series: &[f64], degree: usize) -> Vec<f64> {
        let mut result = series.to_vec();
        for _ in 0..degree {
            result = result.windows(2).map(|w| w[1] - w[0]).collect();
        }
        result
    }

    /// Integrate differenced-scale forecasts back to the original scale.
    fn undifference(&self, forecasts: &[f64]) -> Vec<f64> {
        if self.d == 0 {
            return forecasts.to_vec();
        }

        let mut result = forecasts.to_vec();
        for _ in 0..self.d {
            let mut running = self.history[self.history.len() - 1];
            for value in result.iter_mut() {
                running += *value;
                *value = running;
            }
        }
        result
    }

    /// Solve the Yule-Walker equations with Levinson-Durbin recursion.
    fn estimate_ar(&self, series: &[f64]) -> Vec<f64> {
        if self.p == 0 {
            return Vec::new();
        }

        let n = series.len();
        let mean = series.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = series.iter().map(|x| x - mean).collect();

        let mut autocov = vec![0.0; self.p + 1];
        for (k, slot) in autocov.iter_mut().enumerate() {
            *slot = (k..n).map(|i| centered[i] * centered[i - k]).sum::<f64>() / n as f64;
        }

        let mut coeffs = vec![0.0; self.p];
        if autocov[0].abs() > 1e-10 {
            coeffs[0] = autocov[1] / autocov[0];
            for k in 1..self.p {
                let mut numerator = autocov[k + 1];
                let mut denominator = autocov[0];
                for j in 0..k {
                    numerator -= coeffs[j] * autocov[k - j];
                    denominator -= coeffs[j] * autocov[j + 1];
                }
                if denominator.abs() > 1e-10 {
                    let reflection = numerator / denominator;
                    let previous = coeffs.clone();
                    coeffs[k] = reflection;
                    for j in 0..k {
                        coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
                    }
                }
            }
        }

        coeffs
    }

    /// Estimate MA coefficients from residual autocorrelations, bounded for
    /// stability.
    fn estimate_ma(&self, residuals: &[f64]) -> Vec<f64> {
        if self.q == 0 || residuals.is_empty() {
            return vec![0.0; self.q];
        }

        let n = residuals.len();
        let mean = residuals.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = residuals.iter().map(|x| x - mean).collect();
        let variance = centered.iter().map(|x| x * x).sum::<f64>() / n as f64;

        let mut coeffs = vec![0.0; self.q];
        if variance.abs() > 1e-10 {
            for (k, slot) in coeffs.iter_mut().enumerate() {
                let lagged: f64 = ((k + 1)..n).map(|i| centered[i] * centered[i - k - 1]).sum();
                *slot = (lagged / n as f64 / variance).clamp(-0.99, 0.99);
            }
        }

        coeffs
    }
}

impl ForecastModel for Arima {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        let min_required = self.p + self.d + self.q + 10;
        if series.len() < min_required {
            return Err(TuneError::InsufficientData {
                required: min_required,
                actual: series.len(),
            });
        }

        self.history = series.to_vec();
        self.differenced = Self::difference(series, self.d);
        self.ar_coeffs = self.estimate_ar(&self.differenced);

        let n = self.differenced.len();
        self.constant = self.differenced.iter().sum::<f64>() / n as f64;
        self.residuals = vec![0.0; n];
        for i in self.p..n {
            let mut predicted = self.constant;
            for j in 0..self.p {
                predicted += self.ar_coeffs[j] * (self.differenced[i - j - 1] - self.constant);
            }
            self.residuals[i] = self.differenced[i] - predicted;
        }

        self.ma_coeffs = self.estimate_ma(&self.residuals);
        self.fitted = true;
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }
}

/// Order bounds AutoArima searches over.
const AUTO_MAX_P: usize = 3;
const AUTO_MAX_D: usize = 2;
const AUTO_MAX_Q: usize = 3;
/// Share of the training data held out for order selection.
const ORDER_HOLDOUT_RATIO: f64 = 0.2;

/// ARIMA with automatic order selection.
///
/// `train` grid-searches (p, d, q) over a small order space, scoring each
/// candidate by RMSE on a hold-out tail of the training data, then refits
/// the winner on the full series. The chosen order is reported through
/// `fitted_order`, so search results show the concrete configuration that
/// actually ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoArima {
    model: Option<Arima>,
}

impl AutoArima {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected (p, d, q), once trained
    pub fn order(&self) -> Option<(usize, usize, usize)> {
        self.model.as_ref().map(Arima::order)
    }

    pub fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        self.model
            .as_ref()
            .ok_or(TuneError::NotFitted)?
            .forecast(steps)
    }
}

impl ForecastModel for AutoArima {
    fn train(&mut self, series: &[f64]) -> Result<()> {
        let holdout = ((series.len() as f64 * ORDER_HOLDOUT_RATIO).ceil() as usize).max(1);
        if series.len() < holdout + 10 {
            return Err(TuneError::InsufficientData {
                required: holdout + 10,
                actual: series.len(),
            });
        }
        let (train, test) = series.split_at(series.len() - holdout);

        let mut best_order = (1, 1, 0);
        let mut best_rmse = f64::MAX;
        for p in 0..=AUTO_MAX_P {
            for d in 0..=AUTO_MAX_D {
                for q in 0..=AUTO_MAX_Q {
                    // Pure differencing has nothing to estimate.
                    if p == 0 && q == 0 {
                        continue;
                    }
                    if let Ok(mut candidate) = Arima::new(p, d, q) {
                        if candidate.train(train).is_ok() {
                            if let Ok(predicted) = candidate.forecast(test.len()) {
                                let rmse = ValidationMetrics::from_pairs(test, &predicted).rmse;
                                if rmse.is_finite() && rmse < best_rmse {
                                    best_rmse = rmse;
                                    best_order = (p, d, q);
                                }
                            }
                        }
                    }
                }
            }
        }

        let (p, d, q) = best_order;
        let mut model = Arima::new(p, d, q)?;
        model.train(series)?;
        self.model = Some(model);
        Ok(())
    }

    fn validate(&self, actual: &[f64]) -> Result<ValidationMetrics> {
        let predicted = self.forecast(actual.len())?;
        Ok(ValidationMetrics::from_pairs(actual, &predicted))
    }

    fn fitted_order(&self) -> Option<ParamSet> {
        self.order().map(|(p, d, q)| {
            ParamSet::new().with("p", p).with("d", d).with("q", q)
        })
    }
}
