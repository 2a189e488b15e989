//! Series data-quality validation.
//!
//! Validation reports every applicable issue in one error so a caller
//! fixing bad data sees the whole picture at once instead of one failure
//! per attempt.

use std::collections::HashSet;
use tracing::warn;
use tuner_spi::{Result, TuneError, ValueAccessor};

/// Minimum number of points a series must have.
pub const MIN_POINTS: usize = 5;

/// Minimum number of distinct values a series must have.
pub const MIN_DISTINCT: usize = 3;

/// Pull one numeric value per point through the accessor.
///
/// Unreadable points are logged and coerced to zero; series length is
/// preserved.
pub fn extract_values<P>(points: &[P], accessor: &dyn ValueAccessor<P>) -> Vec<f64> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| match accessor.value(point) {
            Some(value) => value,
            None => {
                warn!(index, "unreadable sales value, coercing to 0");
                0.0
            }
        })
        .collect()
}

/// Validate a numeric series.
///
/// Fails with a single aggregated [`TuneError::InvalidSeries`] when any
/// check fails; on success returns the series with any non-finite value
/// replaced by zero.
pub fn validate_and_preprocess(values: &[f64]) -> Result<Vec<f64>> {
    let mut issues: Vec<String> = Vec::new();

    if values.iter().any(|v| !v.is_finite()) {
        issues.push("series contains NaN or infinite values".to_string());
    }

    if !values.is_empty() {
        if values.iter().all(|v| *v == 0.0) {
            issues.push("all values are zero".to_string());
        } else if values.iter().all(|v| *v == values[0]) {
            issues.push("all values are identical (no variation)".to_string());
        }
    }

    if values.len() < MIN_POINTS {
        issues.push(format!(
            "insufficient data points: {} (minimum {MIN_POINTS})",
            values.len()
        ));
    }

    let distinct = distinct_count(values);
    if distinct < MIN_DISTINCT {
        issues.push(format!(
            "insufficient variation: only {distinct} distinct values (minimum {MIN_DISTINCT})"
        ));
    }

    if !issues.is_empty() {
        return Err(TuneError::InvalidSeries(issues.join("; ")));
    }

    Ok(values
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect())
}

/// Extraction and validation in one call.
pub fn validate_points<P>(points: &[P], accessor: &dyn ValueAccessor<P>) -> Result<Vec<f64>> {
    validate_and_preprocess(&extract_values(points, accessor))
}

fn distinct_count(values: &[f64]) -> usize {
    values
        .iter()
        .map(|v| {
            // Fold -0.0 and 0.0 together.
            let v = if *v == 0.0 { 0.0 } else { *v };
            v.to_bits()
        })
        .collect::<HashSet<u64>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(values: &[f64]) -> String {
        match validate_and_preprocess(values) {
            Err(TuneError::InvalidSeries(message)) => message,
            other => panic!("expected InvalidSeries, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_series_passes_through() {
        let values = vec![12.0, 14.0, 11.0, 18.0, 13.0, 16.0];
        assert_eq!(validate_and_preprocess(&values).unwrap(), values);
    }

    #[test]
    fn test_all_zero_series_rejected() {
        let message = reasons(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(message.contains("all values are zero"));
    }

    #[test]
    fn test_two_points_rejected() {
        let message = reasons(&[1.0, 2.0]);
        assert!(message.contains("insufficient data points: 2"));
    }

    #[test]
    fn test_identical_values_rejected() {
        let message = reasons(&[5.0, 5.0, 5.0, 5.0, 5.0, 5.0]);
        assert!(message.contains("all values are identical (no variation)"));
        assert!(!message.contains("all values are zero"));
    }

    #[test]
    fn test_nan_rejected() {
        let message = reasons(&[1.0, f64::NAN, 3.0, 4.0, 5.0]);
        assert!(message.contains("NaN or infinite"));
    }

    #[test]
    fn test_multiple_reasons_aggregated() {
        // Short, all-zero, no variation: every reason shows up at once.
        let message = reasons(&[0.0, 0.0]);
        assert!(message.contains("all values are zero"));
        assert!(message.contains("insufficient data points: 2"));
        assert!(message.contains("only 1 distinct values"));
    }

    #[test]
    fn test_two_distinct_values_rejected() {
        let message = reasons(&[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        assert!(message.contains("only 2 distinct values"));
    }

    #[test]
    fn test_empty_series_rejected() {
        let message = reasons(&[]);
        assert!(message.contains("insufficient data points: 0"));
    }

    #[test]
    fn test_extraction_coerces_unreadable_points() {
        let points = vec![Some(3.0), None, Some(5.0)];
        let accessor = |point: &Option<f64>| *point;
        assert_eq!(extract_values(&points, &accessor), vec![3.0, 0.0, 5.0]);
    }

    #[test]
    fn test_validate_points_combined() {
        let points = vec![Some(3.0), Some(7.0), None, Some(4.0), Some(9.0), Some(6.0)];
        let accessor = |point: &Option<f64>| *point;
        let series = validate_points(&points, &accessor).unwrap();
        assert_eq!(series, vec![3.0, 7.0, 0.0, 4.0, 9.0, 6.0]);
    }
}
