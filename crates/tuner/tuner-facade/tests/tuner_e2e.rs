//! End-to-end tests for the tuner stack
//!
//! Runs full grid searches over the standard model catalog using only the
//! facade's public API.

use tuner_facade::prelude::*;
use tuner_facade::{progress, InMemorySettings, ValidationEngine, SEASONAL_PERIODS_KEY};
use tunecast_models::standard_registry;

/// Monthly-looking series: trend plus a period-12 seasonal swing.
fn sample_series(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + i as f64 * 2.0 + 20.0 * ((i as f64 * std::f64::consts::PI / 6.0).sin()))
        .collect()
}

#[test]
fn e2e_full_catalog_search() {
    let registry = standard_registry();
    let summary = GridOptimizer::new(&registry)
        .run(&sample_series(60), &SearchRequest::new())
        .unwrap();

    // naive 1 + moving_average 5 + ses 9 + holt 25 + holt_winters 12 + arima 1
    assert_eq!(summary.stats.evaluated, 53);
    assert_eq!(summary.stats.succeeded, 53);
    assert_eq!(summary.per_model.len(), 6);
    assert_eq!(summary.compatibility.valid.len(), 6);
    assert_eq!(summary.training_len, 48);
    assert_eq!(summary.validation_len, 12);
    assert_eq!(summary.seasonal_period, 12);

    let best = summary.best.as_ref().unwrap();
    assert!(best.success);
    assert!(best.accuracy > 0.0);

    // Ranking is accuracy-descending.
    for pair in summary.results.windows(2) {
        assert!(pair[0].accuracy >= pair[1].accuracy);
    }
}

#[test]
fn e2e_arima_reports_fitted_order() {
    let registry = standard_registry();
    let request = SearchRequest::new().models(["arima"]);
    let summary = GridOptimizer::new(&registry)
        .run(&sample_series(60), &request)
        .unwrap();

    let best = summary.best.unwrap();
    assert_eq!(best.model_id, "arima");
    // The automatic flag survives, and the resolved order is merged in.
    assert_eq!(best.parameters.get_bool("auto"), Some(true));
    assert!(best.parameters.get_usize("p").is_some());
    assert!(best.parameters.get_usize("d").is_some());
    assert!(best.parameters.get_usize("q").is_some());
}

#[test]
fn e2e_explicit_seasonal_period_wins() {
    let registry = standard_registry();
    let request = SearchRequest::new()
        .models(["holt_winters"])
        .seasonal_period(4);
    let summary = GridOptimizer::new(&registry)
        .run(&sample_series(60), &request)
        .unwrap();

    assert_eq!(summary.seasonal_period, 4);
    assert!(summary
        .results
        .iter()
        .all(|r| r.parameters.get_usize("period") == Some(4)));
}

#[test]
fn e2e_settings_drive_seasonal_fallback() {
    let registry = standard_registry();
    let settings = InMemorySettings::new().with(SEASONAL_PERIODS_KEY, "6");
    let summary = GridOptimizer::new(&registry)
        .with_settings(&settings)
        .run(&sample_series(60), &SearchRequest::new())
        .unwrap();
    assert_eq!(summary.seasonal_period, 6);
}

#[test]
fn e2e_short_series_rejects_demanding_models() {
    let registry = standard_registry();
    let summary = GridOptimizer::new(&registry)
        .run(&sample_series(18), &SearchRequest::new())
        .unwrap();

    // Training is 14 points: enough for the baselines and smoothers,
    // too short for holt_winters (needs 27 at period 12) and arima (15).
    let rejected: Vec<&str> = summary
        .compatibility
        .invalid
        .iter()
        .map(|r| r.model_id.as_str())
        .collect();
    assert!(rejected.contains(&"holt_winters"));
    assert!(rejected.contains(&"arima"));
    for rejection in &summary.compatibility.invalid {
        assert!(rejection.reason.contains("requires at least"));
    }
    assert!(summary.best.is_some());
}

#[test]
fn e2e_compare_parameter_sets() {
    let registry = standard_registry();
    let series = sample_series(60);
    let engine = ValidationEngine::default();
    let outcome = engine.compare(
        &registry,
        "ses",
        &series,
        &ParamSet::new().with("alpha", 0.8),
        &ParamSet::new().with("alpha", 0.2),
        12,
    );

    assert_eq!(outcome.accepted, outcome.improvement > 0.0);
    assert!(outcome.candidate.confidence >= 50.0 && outcome.candidate.confidence <= 95.0);
    assert!(outcome.baseline.confidence >= 50.0 && outcome.baseline.confidence <= 95.0);
}

#[test]
fn e2e_progress_reports_every_combination() {
    let registry = standard_registry();
    let (sender, receiver) = progress::channel();
    let request = SearchRequest::new().models(["ses"]);
    GridOptimizer::new(&registry)
        .run_with_progress(&sample_series(30), &request, Some(&sender))
        .unwrap();
    drop(sender);

    let events: Vec<_> = receiver.iter().collect();
    assert_eq!(events.len(), 9);
    assert_eq!(events.last().unwrap().percent, 100);
    for pair in events.windows(2) {
        assert!(pair[1].completed == pair[0].completed + 1);
    }
}

#[test]
fn e2e_invalid_series_reports_all_reasons() {
    let registry = standard_registry();
    let err = GridOptimizer::new(&registry)
        .run(&vec![0.0; 6], &SearchRequest::new())
        .unwrap_err();

    match err {
        TuneError::InvalidSeries(message) => {
            assert!(message.contains("all values are zero"));
            assert!(message.contains("insufficient variation"));
        }
        other => panic!("expected InvalidSeries, got {other:?}"),
    }
}

#[test]
fn e2e_override_grid_applies_to_requested_model() {
    let registry = standard_registry();
    let request = SearchRequest::new()
        .models(["moving_average"])
        .override_grid(ParamGrid::new().ints("window", &[2, 9]));
    let summary = GridOptimizer::new(&registry)
        .run(&sample_series(40), &request)
        .unwrap();

    assert_eq!(summary.stats.evaluated, 2);
    let windows: Vec<usize> = summary
        .results
        .iter()
        .filter_map(|r| r.parameters.get_usize("window"))
        .collect();
    assert!(windows.contains(&2) && windows.contains(&9));
}
