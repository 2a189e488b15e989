//! Model compatibility filtering.

use crate::registry::ModelRegistry;
use tuner_spi::{CompatibilityReport, ModelRejection, Result, TuneError};

/// Decide which requested models have enough training data.
///
/// The training length is the series length minus the validation hold-out
/// (`floor(len * (1 - validation_ratio))`); a model qualifies when that
/// meets its minimum-observation requirement at the given seasonal period.
/// Unknown ids are rejections, not errors. When nothing qualifies the
/// whole filter fails with the joined rejection reasons.
pub fn filter_compatible(
    registry: &ModelRegistry,
    series_len: usize,
    model_ids: &[String],
    seasonal_period: usize,
    validation_ratio: f64,
) -> Result<CompatibilityReport> {
    if model_ids.is_empty() {
        return Err(TuneError::NoCompatibleModels("no models requested".to_string()));
    }

    let training_len = (series_len as f64 * (1.0 - validation_ratio)).floor() as usize;
    let mut report = CompatibilityReport::default();

    for id in model_ids {
        match registry.get(id) {
            Ok(spec) => {
                let required = spec.min_observations.required(seasonal_period);
                if training_len >= required {
                    report.valid.push(id.clone());
                } else {
                    report.invalid.push(ModelRejection {
                        model_id: id.clone(),
                        reason: format!(
                            "requires at least {required} observations for training, got {training_len}"
                        ),
                    });
                }
            }
            Err(_) => report.invalid.push(ModelRejection {
                model_id: id.clone(),
                reason: "not registered".to_string(),
            }),
        }
    }

    if report.valid.is_empty() {
        let detail = report
            .invalid
            .iter()
            .map(|r| format!("{}: {}", r.model_id, r.reason))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TuneError::NoCompatibleModels(detail));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MinObservations, ModelSpec, ParamSpace};
    use tuner_spi::{ForecastModel, ParamSet, ValidationMetrics};

    struct NullModel;

    impl ForecastModel for NullModel {
        fn train(&mut self, _series: &[f64]) -> tuner_spi::Result<()> {
            Ok(())
        }

        fn validate(&self, actual: &[f64]) -> tuner_spi::Result<ValidationMetrics> {
            Ok(ValidationMetrics::from_pairs(actual, actual))
        }
    }

    fn spec(id: &str, min: MinObservations) -> ModelSpec {
        ModelSpec::new(id, id, ParamSpace::ParameterFree, min, |_: &ParamSet, _| {
            Ok(Box::new(NullModel) as Box<dyn ForecastModel>)
        })
    }

    fn registry() -> ModelRegistry {
        ModelRegistry::new()
            .with(spec("small", MinObservations::Fixed(5)))
            .with(spec("greedy", MinObservations::Fixed(50)))
            .with(spec(
                "seasonal",
                MinObservations::PerPeriod { factor: 2, base: 3 },
            ))
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_training_length_uses_holdout() {
        // 20 points at ratio 0.2 leave 16 for training: "small" fits,
        // "greedy" does not.
        let report =
            filter_compatible(&registry(), 20, &ids(&["small", "greedy"]), 12, 0.2).unwrap();
        assert_eq!(report.valid, vec!["small".to_string()]);
        assert_eq!(report.invalid.len(), 1);
        assert_eq!(report.invalid[0].model_id, "greedy");
        assert_eq!(
            report.invalid[0].reason,
            "requires at least 50 observations for training, got 16"
        );
    }

    #[test]
    fn test_seasonal_minimum_depends_on_period() {
        // 2 * 12 + 3 = 27 required at period 12; 40 points leave 32.
        let report = filter_compatible(&registry(), 40, &ids(&["seasonal"]), 12, 0.2).unwrap();
        assert_eq!(report.valid, vec!["seasonal".to_string()]);

        // At period 52 the same model needs 107 and is rejected.
        let err = filter_compatible(&registry(), 40, &ids(&["seasonal"]), 52, 0.2).unwrap_err();
        assert!(matches!(err, TuneError::NoCompatibleModels(_)));
    }

    #[test]
    fn test_unknown_model_is_rejection_not_error() {
        let report =
            filter_compatible(&registry(), 20, &ids(&["small", "ghost"]), 12, 0.2).unwrap();
        assert_eq!(report.valid, vec!["small".to_string()]);
        assert_eq!(report.invalid[0].model_id, "ghost");
        assert_eq!(report.invalid[0].reason, "not registered");
    }

    #[test]
    fn test_all_rejected_is_error_with_reasons() {
        let err = filter_compatible(&registry(), 20, &ids(&["greedy", "ghost"]), 12, 0.2)
            .unwrap_err();
        match err {
            TuneError::NoCompatibleModels(detail) => {
                assert!(detail.contains("greedy: requires at least 50"));
                assert!(detail.contains("ghost: not registered"));
            }
            other => panic!("expected NoCompatibleModels, got {other:?}"),
        }
    }

    #[test]
    fn test_no_models_requested_is_error() {
        let err = filter_compatible(&registry(), 20, &[], 12, 0.2).unwrap_err();
        assert!(matches!(err, TuneError::NoCompatibleModels(_)));
    }
}
