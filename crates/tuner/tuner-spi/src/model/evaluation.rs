//! Search outcome types.

use super::metrics::{ValidationMetrics, ValidationScore};
use super::param::ParamSet;
use serde::{Deserialize, Serialize};

/// Outcome of one (model, parameters) evaluation.
///
/// Failure is recorded in-band: `success = false`, accuracy 0 and error
/// metrics at infinity, so a failed combination ranks below every
/// successful one without aborting the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub model_id: String,
    pub parameters: ParamSet,
    pub success: bool,
    pub accuracy: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl EvaluationResult {
    pub fn succeeded(
        model_id: impl Into<String>,
        parameters: ParamSet,
        metrics: ValidationMetrics,
        duration_ms: u64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            parameters,
            success: true,
            accuracy: metrics.accuracy,
            mape: metrics.mape,
            rmse: metrics.rmse,
            mae: metrics.mae,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(
        model_id: impl Into<String>,
        parameters: ParamSet,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            parameters,
            success: false,
            accuracy: 0.0,
            mape: f64::INFINITY,
            rmse: f64::INFINITY,
            mae: f64::INFINITY,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Why a model was excluded from a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRejection {
    pub model_id: String,
    pub reason: String,
}

/// Which models survived the compatibility filter, and why the rest did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub valid: Vec<String>,
    pub invalid: Vec<ModelRejection>,
}

/// Per-model rollup within a search summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model_id: String,
    pub evaluated: usize,
    pub succeeded: usize,
    pub best_accuracy: f64,
    pub best_parameters: Option<ParamSet>,
}

/// Statistics over the successful evaluations of a search.
///
/// All fields are zero when nothing succeeded; never NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub evaluated: usize,
    pub succeeded: usize,
    pub success_rate: f64,
    pub mean_accuracy: f64,
    pub best_accuracy: f64,
    pub worst_accuracy: f64,
    pub accuracy_std_dev: f64,
}

impl SummaryStats {
    /// Compute over a slice of results; only successful entries feed the
    /// accuracy statistics.
    pub fn compute(results: &[EvaluationResult]) -> Self {
        let evaluated = results.len();
        let accuracies: Vec<f64> = results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.accuracy)
            .collect();
        let succeeded = accuracies.len();
        if succeeded == 0 {
            return Self {
                evaluated,
                ..Self::default()
            };
        }

        let mean = accuracies.iter().sum::<f64>() / succeeded as f64;
        let best = accuracies.iter().cloned().fold(f64::MIN, f64::max);
        let worst = accuracies.iter().cloned().fold(f64::MAX, f64::min);
        let variance =
            accuracies.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / succeeded as f64;

        Self {
            evaluated,
            succeeded,
            success_rate: succeeded as f64 / evaluated as f64,
            mean_accuracy: mean,
            best_accuracy: best,
            worst_accuracy: worst,
            accuracy_std_dev: variance.sqrt(),
        }
    }
}

/// Full outcome of a grid search across models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    /// Every evaluation, sorted by accuracy descending. The sort is stable:
    /// equal accuracies keep encounter order.
    pub results: Vec<EvaluationResult>,
    /// The highest-accuracy successful evaluation, if any succeeded.
    pub best: Option<EvaluationResult>,
    pub per_model: Vec<ModelSummary>,
    pub stats: SummaryStats,
    pub compatibility: CompatibilityReport,
    pub training_len: usize,
    pub validation_len: usize,
    pub seasonal_period: usize,
    pub duration_ms: u64,
}

/// Outcome of scoring a candidate parameter set against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub model_id: String,
    pub candidate: ValidationScore,
    pub baseline: ValidationScore,
    /// Candidate accuracy minus baseline accuracy, in percentage points.
    pub improvement: f64,
    /// True iff the candidate strictly beats the baseline.
    pub accepted: bool,
}
