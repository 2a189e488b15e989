//! Shared accuracy metric computation.

use serde::{Deserialize, Serialize};

/// Pairs with |actual| below this contribute nothing to MAPE.
const MAPE_EPSILON: f64 = 1e-10;

/// Accuracy metrics for predictions against held-out actuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// `max(0, 100 - MAPE)`, in percent.
    pub accuracy: f64,
    /// Mean absolute percentage error over pairs with nonzero actuals.
    pub mape: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
}

impl ValidationMetrics {
    /// Compute metrics over paired actual/predicted values.
    ///
    /// Pairs beyond the shorter slice are ignored. With no pairs at all, or
    /// no pair with a nonzero actual, the result is the degenerate score
    /// (accuracy 0, MAPE 100) rather than NaN.
    pub fn from_pairs(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return Self::degenerate();
        }

        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut pct_sum = 0.0;
        let mut pct_count = 0usize;
        for i in 0..n {
            let err = actual[i] - predicted[i];
            abs_sum += err.abs();
            sq_sum += err * err;
            if actual[i].abs() > MAPE_EPSILON {
                pct_sum += (err / actual[i]).abs();
                pct_count += 1;
            }
        }

        let mae = abs_sum / n as f64;
        let rmse = (sq_sum / n as f64).sqrt();
        let mape = if pct_count > 0 {
            pct_sum / pct_count as f64 * 100.0
        } else {
            100.0
        };
        let accuracy = if mape.is_finite() {
            (100.0 - mape).max(0.0)
        } else {
            0.0
        };

        Self {
            accuracy,
            mape,
            rmse,
            mae,
        }
    }

    /// The fixed result for inputs no metric is defined on.
    pub fn degenerate() -> Self {
        Self {
            accuracy: 0.0,
            mape: 100.0,
            rmse: f64::INFINITY,
            mae: f64::INFINITY,
        }
    }
}

/// Cross-validation outcome: accumulated metrics plus a bounded confidence
/// estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationScore {
    pub accuracy: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Blend of accuracy and window-to-window consistency. Walk-forward
    /// clamps to [50, 95], k-fold to [0, 95].
    pub confidence: f64,
}

impl ValidationScore {
    /// The fixed score for series too short to validate.
    pub fn degenerate() -> Self {
        Self {
            accuracy: 0.0,
            mape: 100.0,
            rmse: f64::INFINITY,
            mae: f64::INFINITY,
            confidence: 0.0,
        }
    }

    /// Attach a confidence to accumulated metrics.
    pub fn from_metrics(metrics: ValidationMetrics, confidence: f64) -> Self {
        Self {
            accuracy: metrics.accuracy,
            mape: metrics.mape,
            rmse: metrics.rmse,
            mae: metrics.mae,
            confidence,
        }
    }
}
