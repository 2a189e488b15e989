//! Tuner Consumer API
//!
//! Configuration types and request DTOs for tuning consumers.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export SPI types
pub use tuner_spi::{
    ParamGrid, ParamSet, ParamValue, Result, SearchSummary, TuneError, TuningMethod,
};

/// Fallback seasonal period when every resolution stage fails.
pub const DEFAULT_SEASONAL_PERIOD: usize = 12;

/// Observation frequency of a sales series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Seasonal period implied by the frequency.
    pub fn seasonal_period(&self) -> usize {
        match self {
            Frequency::Weekly => 7,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 1,
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" | "annual" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency '{other}'")),
        }
    }
}

/// Walk-forward validation knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Smallest training window the first step may use.
    pub min_train_size: usize,
    /// Fixed test block forecast at each step.
    pub test_size: usize,
    /// Upper bound on the number of steps.
    pub max_steps: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            min_train_size: 10,
            test_size: 3,
            max_steps: 5,
        }
    }
}

impl WalkForwardConfig {
    /// Set the minimum training window
    pub fn min_train_size(mut self, size: usize) -> Self {
        self.min_train_size = size.max(2);
        self
    }

    /// Set the per-step test block size
    pub fn test_size(mut self, size: usize) -> Self {
        self.test_size = size.max(1);
        self
    }

    /// Set the step bound
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps.max(1);
        self
    }
}

/// Time-respecting k-fold validation knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KFoldConfig {
    /// Number of contiguous folds.
    pub folds: usize,
    /// Folds whose preceding data is shorter than this are skipped.
    pub min_train_size: usize,
}

impl Default for KFoldConfig {
    fn default() -> Self {
        Self {
            folds: 4,
            min_train_size: 5,
        }
    }
}

impl KFoldConfig {
    /// Set the fold count
    pub fn folds(mut self, folds: usize) -> Self {
        self.folds = folds.max(2);
        self
    }

    /// Set the minimum training prefix per fold
    pub fn min_train_size(mut self, size: usize) -> Self {
        self.min_train_size = size.max(1);
        self
    }
}

/// Configuration for the tuning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunerConfig {
    /// Portion of the series held out for validation.
    pub validation_ratio: f64,
    /// Walk-forward validation settings.
    pub walk_forward: WalkForwardConfig,
    /// K-fold validation settings.
    pub k_fold: KFoldConfig,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            validation_ratio: 0.2,
            walk_forward: WalkForwardConfig::default(),
            k_fold: KFoldConfig::default(),
        }
    }
}

impl TunerConfig {
    /// Set the validation hold-out ratio
    pub fn validation_ratio(mut self, ratio: f64) -> Self {
        self.validation_ratio = ratio.clamp(0.1, 0.5);
        self
    }
}

/// Weights for the composite best-result score. Error-metric terms are
/// normalized against the candidate set before weighting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub accuracy: f64,
    pub mape: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.4,
            mape: 0.3,
            rmse: 0.2,
            mae: 0.1,
        }
    }
}

/// One grid-search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Models to tune; `None` means every registered model.
    pub model_ids: Option<Vec<String>>,
    /// Observation frequency, for seasonal-period fallback.
    pub frequency: Option<Frequency>,
    /// Explicit seasonal period; wins over every fallback stage.
    pub seasonal_period: Option<usize>,
    /// Replacement grid applied to every searched model.
    pub override_grid: Option<ParamGrid>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the search to the given models
    pub fn models<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.model_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Set the observation frequency
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Set an explicit seasonal period
    pub fn seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = Some(period);
        self
    }

    /// Replace every model's declared grid
    pub fn override_grid(mut self, grid: ParamGrid) -> Self {
        self.override_grid = Some(grid);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::Weekly.seasonal_period(), 7);
        assert_eq!(Frequency::Monthly.seasonal_period(), 12);
        assert_eq!(Frequency::Quarterly.seasonal_period(), 4);
        assert_eq!(Frequency::Yearly.seasonal_period(), 1);
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("Weekly".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert_eq!("annual".parse::<Frequency>(), Ok(Frequency::Yearly));
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_validation_ratio_clamped() {
        let config = TunerConfig::default().validation_ratio(0.9);
        assert!((config.validation_ratio - 0.5).abs() < f64::EPSILON);
        let config = TunerConfig::default().validation_ratio(0.0);
        assert!((config.validation_ratio - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_walk_forward_floors() {
        let config = WalkForwardConfig::default()
            .min_train_size(0)
            .test_size(0)
            .max_steps(0);
        assert_eq!(config.min_train_size, 2);
        assert_eq!(config.test_size, 1);
        assert_eq!(config.max_steps, 1);
    }

    #[test]
    fn test_search_request_builder() {
        let request = SearchRequest::new()
            .models(["ses", "holt"])
            .frequency(Frequency::Weekly)
            .seasonal_period(7);
        assert_eq!(request.model_ids.as_deref().map(|m| m.len()), Some(2));
        assert_eq!(request.frequency, Some(Frequency::Weekly));
        assert_eq!(request.seasonal_period, Some(7));
        assert!(request.override_grid.is_none());
    }

    #[test]
    fn test_search_request_serde_defaults() {
        let request: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.model_ids.is_none());
        assert!(request.frequency.is_none());
    }
}
