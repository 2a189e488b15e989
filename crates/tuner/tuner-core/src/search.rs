//! Sequential grid search across compatible models.

use crate::compat::filter_compatible;
use crate::evaluate::evaluate_combination;
use crate::grid::{combinations, resolve_seasonal_period};
use crate::progress::ProgressSender;
use crate::registry::ModelRegistry;
use crate::validate::validate_and_preprocess;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::info;
use tuner_api::{SearchRequest, TunerConfig};
use tuner_spi::{
    EvaluationResult, ModelSummary, NoSettings, Result, SearchProgress, SearchSummary,
    SettingsProvider, SummaryStats, TuneError,
};

static NO_SETTINGS: NoSettings = NoSettings;

/// Exhaustive parameter search over a model registry.
///
/// Combinations run sequentially, model by model in registry order, and a
/// model failure never aborts the search: it is recorded in-band and ranks
/// last. The search as a whole errors only when the series is unusable, no
/// model is compatible, or every attempted combination failed.
pub struct GridOptimizer<'a> {
    registry: &'a ModelRegistry,
    settings: &'a dyn SettingsProvider,
    config: TunerConfig,
}

impl<'a> GridOptimizer<'a> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            settings: &NO_SETTINGS,
            config: TunerConfig::default(),
        }
    }

    /// Use an organization settings source for seasonal-period fallbacks.
    pub fn with_settings(mut self, settings: &'a dyn SettingsProvider) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config(mut self, config: TunerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(&self, series: &[f64], request: &SearchRequest) -> Result<SearchSummary> {
        self.run_with_progress(series, request, None)
    }

    /// Run the search, reporting per-combination progress when a sender is
    /// given.
    pub fn run_with_progress(
        &self,
        series: &[f64],
        request: &SearchRequest,
        progress: Option<&ProgressSender>,
    ) -> Result<SearchSummary> {
        let started = Instant::now();

        let series = validate_and_preprocess(series)?;
        let seasonal_period =
            resolve_seasonal_period(request.seasonal_period, self.settings, request.frequency);

        let model_ids = match &request.model_ids {
            Some(ids) => ids.clone(),
            None => self.registry.ids().map(String::from).collect(),
        };
        let compatibility = filter_compatible(
            self.registry,
            series.len(),
            &model_ids,
            seasonal_period,
            self.config.validation_ratio,
        )?;

        let training_len =
            (series.len() as f64 * (1.0 - self.config.validation_ratio)).floor() as usize;
        let (training, validation) = series.split_at(training_len);
        if training.is_empty() || validation.is_empty() {
            return Err(TuneError::EmptySplit {
                training: training.len(),
                validation: validation.len(),
            });
        }

        // Expand every grid up front so progress can report against a fixed
        // total.
        let mut plan = Vec::with_capacity(compatibility.valid.len());
        for model_id in &compatibility.valid {
            let spec = self.registry.get(model_id)?;
            let combos = combinations(spec, seasonal_period, request.override_grid.as_ref());
            plan.push((model_id.clone(), combos));
        }
        let total: usize = plan.iter().map(|(_, combos)| combos.len()).sum();

        info!(
            models = compatibility.valid.len(),
            combinations = total,
            training_len = training.len(),
            validation_len = validation.len(),
            seasonal_period,
            "starting grid search"
        );

        let mut results: Vec<EvaluationResult> = Vec::with_capacity(total);
        let mut per_model = Vec::with_capacity(plan.len());
        let mut completed = 0usize;
        for (model_id, combos) in &plan {
            let first = results.len();
            for params in combos {
                let result = evaluate_combination(
                    self.registry,
                    model_id,
                    params,
                    training,
                    validation,
                    seasonal_period,
                );
                results.push(result);
                completed += 1;
                if let Some(sender) = progress {
                    sender.send(SearchProgress::new(model_id, completed, total));
                }
            }
            per_model.push(summarize_model(model_id, &results[first..]));
        }

        if total > 0 && results.iter().all(|r| !r.success) {
            return Err(TuneError::AllCombinationsFailed { attempted: total });
        }

        // Stable sort: ties keep evaluation order.
        results.sort_by(|a, b| b.accuracy.partial_cmp(&a.accuracy).unwrap_or(Ordering::Equal));

        let stats = SummaryStats::compute(&results);
        let best = results.iter().find(|r| r.success).cloned();
        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            evaluated = stats.evaluated,
            succeeded = stats.succeeded,
            best_accuracy = stats.best_accuracy,
            duration_ms,
            "grid search complete"
        );

        Ok(SearchSummary {
            results,
            best,
            per_model,
            stats,
            compatibility,
            training_len: training.len(),
            validation_len: validation.len(),
            seasonal_period,
            duration_ms,
        })
    }
}

fn summarize_model(model_id: &str, results: &[EvaluationResult]) -> ModelSummary {
    let best = results
        .iter()
        .filter(|r| r.success)
        .max_by(|a, b| a.accuracy.partial_cmp(&b.accuracy).unwrap_or(Ordering::Equal));
    ModelSummary {
        model_id: model_id.to_string(),
        evaluated: results.len(),
        succeeded: results.iter().filter(|r| r.success).count(),
        best_accuracy: best.map(|r| r.accuracy).unwrap_or(0.0),
        best_parameters: best.map(|r| r.parameters.clone()),
    }
}
