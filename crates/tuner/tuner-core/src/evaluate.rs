//! Fail-soft single-combination evaluation.

use crate::registry::ModelRegistry;
use std::time::Instant;
use tracing::warn;
use tuner_spi::{EvaluationResult, ParamSet, Result, ValidationMetrics};

/// Evaluate one (model, parameters) candidate on a fixed split.
///
/// Never fails the caller: a combination that cannot be built, trained, or
/// validated is returned with `success = false`, zero accuracy, and its
/// error message attached, so the search moves on to the next candidate.
pub fn evaluate_combination(
    registry: &ModelRegistry,
    model_id: &str,
    params: &ParamSet,
    training: &[f64],
    validation: &[f64],
    seasonal_period: usize,
) -> EvaluationResult {
    let started = Instant::now();
    match try_evaluate(registry, model_id, params, training, validation, seasonal_period) {
        Ok((metrics, fitted)) => {
            let mut reported = params.clone();
            if let Some(order) = fitted {
                reported.merge(&order);
            }
            EvaluationResult::succeeded(model_id, reported, metrics, elapsed_ms(started))
        }
        Err(err) => {
            warn!(
                model_id,
                params = %params,
                training_len = training.len(),
                validation_len = validation.len(),
                error = %err,
                "combination evaluation failed"
            );
            EvaluationResult::failed(model_id, params.clone(), err.to_string(), elapsed_ms(started))
        }
    }
}

fn try_evaluate(
    registry: &ModelRegistry,
    model_id: &str,
    params: &ParamSet,
    training: &[f64],
    validation: &[f64],
    seasonal_period: usize,
) -> Result<(ValidationMetrics, Option<ParamSet>)> {
    let spec = registry.get(model_id)?;
    let mut model = spec.build_model(params, seasonal_period)?;
    model.train(training)?;
    let metrics = model.validate(validation)?;
    Ok((metrics, model.fitted_order()))
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
