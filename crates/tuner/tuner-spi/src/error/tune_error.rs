//! Tuning error types.

use thiserror::Error;

/// Errors that can occur during parameter tuning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuneError {
    /// Insufficient data points for the operation.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Model used before training.
    #[error("Model not fitted: call train first")]
    NotFitted,

    /// The input series failed data-quality validation. The message joins
    /// every applicable reason.
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// No model registered under the requested id.
    #[error("Unknown model: '{0}'")]
    UnknownModel(String),

    /// Every requested model was rejected by the compatibility filter.
    #[error("No compatible models: {0}")]
    NoCompatibleModels(String),

    /// The train/validation split left one side empty.
    #[error("Empty split: {training} training and {validation} validation points")]
    EmptySplit { training: usize, validation: usize },

    /// A model factory or training contract failure.
    #[error("Model failed: {0}")]
    ModelFailed(String),

    /// Every parameter combination in the search failed.
    #[error("All {attempted} parameter combinations failed")]
    AllCombinationsFailed { attempted: usize },

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_error() {
        let error = TuneError::InsufficientData {
            required: 24,
            actual: 10,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data: need at least 24 points, got 10"
        );
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = TuneError::InvalidParameter {
            name: "alpha".to_string(),
            reason: "must be between 0 and 1".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid parameter 'alpha': must be between 0 and 1"
        );
    }

    #[test]
    fn test_invalid_series_joins_reasons() {
        let error = TuneError::InvalidSeries(
            "all values are zero; insufficient variation: only 1 distinct values (minimum 3)"
                .to_string(),
        );
        let message = error.to_string();
        assert!(message.contains("all values are zero"));
        assert!(message.contains("insufficient variation"));
    }

    #[test]
    fn test_empty_split_error() {
        let error = TuneError::EmptySplit {
            training: 4,
            validation: 0,
        };
        assert_eq!(
            error.to_string(),
            "Empty split: 4 training and 0 validation points"
        );
    }

    #[test]
    fn test_all_combinations_failed_error() {
        let error = TuneError::AllCombinationsFailed { attempted: 81 };
        assert_eq!(error.to_string(), "All 81 parameter combinations failed");
    }

    #[test]
    fn test_error_implements_std_error() {
        fn assert_std_error<E: std::error::Error>() {}
        assert_std_error::<TuneError>();
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(TuneError::NotFitted, TuneError::NotFitted);
        assert_ne!(
            TuneError::UnknownModel("ses".to_string()),
            TuneError::UnknownModel("holt".to_string())
        );
    }
}
