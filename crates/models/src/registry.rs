//! Standard model catalog.

use crate::arima::{Arima, AutoArima};
use crate::baseline::{MovingAverageForecaster, NaiveForecaster};
use crate::smoothing::{HoltLinear, HoltWinters, SimpleExponentialSmoothing};
use tuner_core::{MinObservations, ModelRegistry, ModelSpec, ParamSpace};
use tuner_spi::{ForecastModel, ParamGrid, ParamSet, Result, TuneError};

fn require_f64(params: &ParamSet, name: &str) -> Result<f64> {
    params.get_f64(name).ok_or_else(|| TuneError::InvalidParameter {
        name: name.to_string(),
        reason: "missing or not numeric".to_string(),
    })
}

fn require_usize(params: &ParamSet, name: &str) -> Result<usize> {
    params.get_usize(name).ok_or_else(|| TuneError::InvalidParameter {
        name: name.to_string(),
        reason: "missing or not a whole number".to_string(),
    })
}

/// Registry of the reference models, in ranking-friendly order: baselines
/// first, then smoothing variants, then ARIMA.
///
/// | id               | parameters                       | minimum observations |
/// |------------------|----------------------------------|----------------------|
/// | `naive`          | none                             | 3                    |
/// | `moving_average` | `window`                         | 5                    |
/// | `ses`            | `alpha`                          | 5                    |
/// | `holt`           | `alpha`, `beta`                  | 8                    |
/// | `holt_winters`   | `alpha`, `beta`, `gamma`, period | 2 * period + 3       |
/// | `arima`          | automatic (p, d, q)              | 15                   |
pub fn standard_registry() -> ModelRegistry {
    ModelRegistry::new()
        .with(ModelSpec::new(
            "naive",
            "Naive",
            ParamSpace::ParameterFree,
            MinObservations::Fixed(3),
            |_, _| Ok(Box::new(NaiveForecaster::new()) as Box<dyn ForecastModel>),
        ))
        .with(ModelSpec::new(
            "moving_average",
            "Moving Average",
            ParamSpace::Grid(ParamGrid::new().ints("window", &[3, 4, 6, 8, 12])),
            MinObservations::Fixed(5),
            |params, _| {
                let window = require_usize(params, "window")?;
                Ok(Box::new(MovingAverageForecaster::new(window)?) as Box<dyn ForecastModel>)
            },
        ))
        .with(ModelSpec::new(
            "ses",
            "Simple Exponential Smoothing",
            ParamSpace::Grid(
                ParamGrid::new()
                    .floats("alpha", &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]),
            ),
            MinObservations::Fixed(5),
            |params, _| {
                let alpha = require_f64(params, "alpha")?;
                Ok(Box::new(SimpleExponentialSmoothing::new(alpha)?) as Box<dyn ForecastModel>)
            },
        ))
        .with(ModelSpec::new(
            "holt",
            "Holt Linear Trend",
            ParamSpace::Grid(
                ParamGrid::new()
                    .floats("alpha", &[0.1, 0.3, 0.5, 0.7, 0.9])
                    .floats("beta", &[0.1, 0.3, 0.5, 0.7, 0.9]),
            ),
            MinObservations::Fixed(8),
            |params, _| {
                let alpha = require_f64(params, "alpha")?;
                let beta = require_f64(params, "beta")?;
                Ok(Box::new(HoltLinear::new(alpha, beta)?) as Box<dyn ForecastModel>)
            },
        ))
        .with(
            ModelSpec::new(
                "holt_winters",
                "Holt-Winters",
                ParamSpace::Grid(
                    ParamGrid::new()
                        .floats("alpha", &[0.2, 0.4, 0.6])
                        .floats("beta", &[0.1, 0.3])
                        .floats("gamma", &[0.1, 0.3]),
                ),
                MinObservations::PerPeriod { factor: 2, base: 3 },
                |params, seasonal_period| {
                    let alpha = require_f64(params, "alpha")?;
                    let beta = require_f64(params, "beta")?;
                    let gamma = require_f64(params, "gamma")?;
                    let period = params.get_usize("period").unwrap_or(seasonal_period);
                    Ok(Box::new(HoltWinters::new(alpha, beta, gamma, period)?)
                        as Box<dyn ForecastModel>)
                },
            )
            .seasonal("period"),
        )
        .with(ModelSpec::new(
            "arima",
            "ARIMA",
            ParamSpace::AutoOrder,
            MinObservations::Fixed(15),
            |params, _| {
                // The auto configuration searches its own order; explicit
                // (p, d, q) axes pin it, for overrides and comparisons.
                if params.get_bool("auto").unwrap_or(false) {
                    Ok(Box::new(AutoArima::new()) as Box<dyn ForecastModel>)
                } else {
                    let p = params.get_usize("p").unwrap_or(1);
                    let d = params.get_usize("d").unwrap_or(1);
                    let q = params.get_usize("q").unwrap_or(0);
                    Ok(Box::new(Arima::new(p, d, q)?) as Box<dyn ForecastModel>)
                }
            },
        ))
}
