//! Time-respecting cross-validation.
//!
//! Both strategies honor time order: a window only ever trains on data
//! strictly before the block it forecasts. Per-window metrics are combined
//! weighted by block size, which is equivalent to accumulating the
//! actual/predicted pairs across windows.

use crate::registry::ModelRegistry;
use tuner_api::{KFoldConfig, TunerConfig, WalkForwardConfig};
use tuner_spi::{ComparisonOutcome, ParamSet, ValidationMetrics, ValidationScore};

/// Cross-validation engine.
///
/// Scoring never fails: series too short to validate, or models that fail
/// in every window, produce the fixed degenerate score instead.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    pub walk_forward: WalkForwardConfig,
    pub k_fold: KFoldConfig,
}

impl ValidationEngine {
    pub fn new(config: &TunerConfig) -> Self {
        Self {
            walk_forward: config.walk_forward,
            k_fold: config.k_fold,
        }
    }

    /// Expanding-window validation over the tail of the series.
    ///
    /// Each step trains on everything before a fixed-size test block and
    /// forecasts the block; the number of steps is bounded by the config.
    /// Confidence blends accuracy with window consistency, clamped to
    /// [50, 95].
    pub fn walk_forward_score(
        &self,
        registry: &ModelRegistry,
        model_id: &str,
        params: &ParamSet,
        series: &[f64],
        seasonal_period: usize,
    ) -> ValidationScore {
        let n = series.len();
        let cfg = self.walk_forward;
        if n < cfg.min_train_size + cfg.test_size {
            return ValidationScore::degenerate();
        }

        let possible = (n - cfg.min_train_size) / cfg.test_size;
        let steps = possible.min(cfg.max_steps).max(1);

        let mut windows = Vec::with_capacity(steps);
        let mut accuracies = Vec::with_capacity(steps);
        for i in 0..steps {
            let test_end = n - (steps - 1 - i) * cfg.test_size;
            let train_end = test_end - cfg.test_size;
            if let Some((metrics, len)) =
                window_metrics(registry, model_id, params, series, train_end, test_end, seasonal_period)
            {
                accuracies.push(metrics.accuracy);
                windows.push((metrics, len));
            }
        }

        if windows.is_empty() {
            return ValidationScore::degenerate();
        }
        let combined = combine_windows(&windows);
        let confidence = blend_confidence(&accuracies, combined.accuracy, 0.7, 50.0, 95.0);
        ValidationScore::from_metrics(combined, confidence)
    }

    /// Time-respecting k-fold validation.
    ///
    /// The series is cut into contiguous folds in order; each fold's
    /// training data is strictly the points before it, and folds whose
    /// training prefix is shorter than the configured minimum are skipped.
    /// Confidence is clamped to [0, 95].
    pub fn k_fold_score(
        &self,
        registry: &ModelRegistry,
        model_id: &str,
        params: &ParamSet,
        series: &[f64],
        seasonal_period: usize,
    ) -> ValidationScore {
        let n = series.len();
        let cfg = self.k_fold;
        let fold_size = n / cfg.folds;
        if fold_size == 0 {
            return ValidationScore::degenerate();
        }

        let mut windows = Vec::with_capacity(cfg.folds);
        let mut accuracies = Vec::with_capacity(cfg.folds);
        for i in 0..cfg.folds {
            let test_start = i * fold_size;
            let test_end = if i == cfg.folds - 1 { n } else { (i + 1) * fold_size };
            // The training prefix is everything before the fold.
            if test_start < cfg.min_train_size {
                continue;
            }
            if let Some((metrics, len)) =
                window_metrics(registry, model_id, params, series, test_start, test_end, seasonal_period)
            {
                accuracies.push(metrics.accuracy);
                windows.push((metrics, len));
            }
        }

        if windows.is_empty() {
            return ValidationScore::degenerate();
        }
        let combined = combine_windows(&windows);
        let confidence = blend_confidence(&accuracies, combined.accuracy, 0.8, 0.0, 95.0);
        ValidationScore::from_metrics(combined, confidence)
    }

    /// Score a candidate parameter set against a baseline with walk-forward
    /// validation. The candidate is accepted only when it strictly beats
    /// the baseline's accuracy.
    pub fn compare(
        &self,
        registry: &ModelRegistry,
        model_id: &str,
        series: &[f64],
        candidate: &ParamSet,
        baseline: &ParamSet,
        seasonal_period: usize,
    ) -> ComparisonOutcome {
        let candidate_score =
            self.walk_forward_score(registry, model_id, candidate, series, seasonal_period);
        let baseline_score =
            self.walk_forward_score(registry, model_id, baseline, series, seasonal_period);
        let improvement = candidate_score.accuracy - baseline_score.accuracy;
        ComparisonOutcome {
            model_id: model_id.to_string(),
            candidate: candidate_score,
            baseline: baseline_score,
            improvement,
            accepted: improvement > 0.0,
        }
    }
}

/// Train on `series[..train_end]`, forecast and score `series[train_end..test_end]`.
/// A window whose model fails contributes nothing.
fn window_metrics(
    registry: &ModelRegistry,
    model_id: &str,
    params: &ParamSet,
    series: &[f64],
    train_end: usize,
    test_end: usize,
    seasonal_period: usize,
) -> Option<(ValidationMetrics, usize)> {
    let spec = registry.get(model_id).ok()?;
    let mut model = spec.build_model(params, seasonal_period).ok()?;
    model.train(&series[..train_end]).ok()?;
    let actual = &series[train_end..test_end];
    let metrics = model.validate(actual).ok()?;
    Some((metrics, actual.len()))
}

/// Combine per-window metrics weighted by block size. MAE and MAPE average
/// linearly; RMSE combines through the mean square.
fn combine_windows(windows: &[(ValidationMetrics, usize)]) -> ValidationMetrics {
    let total: usize = windows.iter().map(|(_, len)| len).sum();
    if total == 0 {
        return ValidationMetrics::degenerate();
    }

    let mut mae = 0.0;
    let mut mape = 0.0;
    let mut mean_square = 0.0;
    for (metrics, len) in windows {
        let weight = *len as f64 / total as f64;
        mae += metrics.mae * weight;
        mape += metrics.mape * weight;
        mean_square += metrics.rmse * metrics.rmse * weight;
    }

    ValidationMetrics {
        accuracy: (100.0 - mape).max(0.0),
        mape,
        rmse: mean_square.sqrt(),
        mae,
    }
}

/// Blend overall accuracy with consistency (agreement between the most
/// recent windows and the whole run), clamped to the given band.
fn blend_confidence(accuracies: &[f64], overall: f64, accuracy_weight: f64, lo: f64, hi: f64) -> f64 {
    let recent_n = accuracies.len().div_ceil(2).max(1);
    let recent: f64 =
        accuracies[accuracies.len() - recent_n..].iter().sum::<f64>() / recent_n as f64;
    let consistency = (100.0 - (recent - overall).abs()).max(0.0);
    (accuracy_weight * overall + (1.0 - accuracy_weight) * consistency).clamp(lo, hi)
}
