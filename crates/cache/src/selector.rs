//! Best-method selection across cached results.

use crate::error::CacheError;
use crate::store::{MethodCandidate, OptimizationCache};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use tuner_api::CompositeWeights;
use tuner_spi::TuningMethod;

/// Outcome of a best-method selection over an entity's cached records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSelection {
    pub model_id: String,
    pub method: TuningMethod,
    pub score: f64,
    pub accuracy: f64,
}

/// Picks the strongest (model, method) pair for an entity from the cache
/// and flags it as the winner.
///
/// Without weights the score is plain validation accuracy. With weights
/// each error metric contributes a 0..100 term: MAPE is inverted and
/// capped, RMSE and MAE are scaled against the worst candidate so the
/// weakest scores 0 and an error of zero scores 100.
#[derive(Debug, Clone, Default)]
pub struct BestMethodSelector {
    weights: Option<CompositeWeights>,
}

impl BestMethodSelector {
    pub fn new() -> Self {
        Self { weights: None }
    }

    pub fn with_weights(weights: CompositeWeights) -> Self {
        Self {
            weights: Some(weights),
        }
    }

    /// Score every valid candidate for the entity, mark the winner in the
    /// cache, and return it.
    pub fn select(
        &self,
        cache: &OptimizationCache,
        entity: &str,
        data_hash: &str,
    ) -> Result<BestSelection> {
        let candidates = cache.candidates(entity, data_hash);
        if candidates.is_empty() {
            return Err(CacheError::NoValidRecord(entity.to_string()));
        }

        let max_rmse = candidates
            .iter()
            .map(|c| c.rmse)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let max_mae = candidates
            .iter()
            .map(|c| c.mae)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);

        let mut best: Option<(f64, &MethodCandidate)> = None;
        for candidate in &candidates {
            let score = self.score(candidate, max_rmse, max_mae);
            let better = match best {
                Some((leader, _)) => score > leader,
                None => true,
            };
            if better {
                best = Some((score, candidate));
            }
        }

        let (score, winner) = best.ok_or_else(|| CacheError::NoValidRecord(entity.to_string()))?;
        cache.mark_winner(entity, &winner.model_id, winner.method)?;
        info!(
            entity,
            model = %winner.model_id,
            method = %winner.method,
            score,
            "selected best method"
        );
        Ok(BestSelection {
            model_id: winner.model_id.clone(),
            method: winner.method,
            score,
            accuracy: winner.accuracy,
        })
    }

    fn score(&self, candidate: &MethodCandidate, max_rmse: f64, max_mae: f64) -> f64 {
        match &self.weights {
            None => finite_or_zero(candidate.accuracy),
            Some(weights) => {
                let accuracy = finite_or_zero(candidate.accuracy);
                let mape = 100.0 - finite_or(candidate.mape, 100.0).min(100.0);
                let rmse = scaled_error_term(candidate.rmse, max_rmse);
                let mae = scaled_error_term(candidate.mae, max_mae);
                weights.accuracy * accuracy
                    + weights.mape * mape
                    + weights.rmse * rmse
                    + weights.mae * mae
            }
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    finite_or(value, 0.0)
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// 100 when the error is zero, 0 at the worst candidate. A zero maximum
/// means every candidate is perfect on this metric.
fn scaled_error_term(value: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if max <= 0.0 {
        return 100.0;
    }
    100.0 * (1.0 - (value / max).min(1.0))
}
