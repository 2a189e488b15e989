//! Parameter grid expansion and seasonal-period resolution.

use crate::registry::{ModelSpec, ParamSpace};
use tracing::debug;
use tuner_api::{Frequency, DEFAULT_SEASONAL_PERIOD};
use tuner_spi::{
    ParamGrid, ParamSet, ParamValue, SettingsProvider, FREQUENCY_KEY, SEASONAL_PERIODS_KEY,
};

/// Expand a model's parameter space into concrete configurations.
///
/// Combination order is the standard nested iteration over declared axes
/// (last axis varies fastest) and is identical across runs. An explicit
/// `override_grid` replaces the declared axes. Grid-excluded models
/// expand to nothing, as do seasonal models when the resolved period is 1.
pub fn combinations(
    spec: &ModelSpec,
    seasonal_period: usize,
    override_grid: Option<&ParamGrid>,
) -> Vec<ParamSet> {
    if spec.grid_excluded {
        return Vec::new();
    }

    // A single-slot season leaves a seasonal model nothing to fit.
    if spec.seasonal_param.is_some() && seasonal_period <= 1 {
        return Vec::new();
    }

    if let Some(grid) = override_grid {
        return expand(grid, spec, seasonal_period);
    }

    match &spec.space {
        ParamSpace::Grid(grid) => expand(grid, spec, seasonal_period),
        ParamSpace::Explicit(sets) => sets.clone(),
        ParamSpace::AutoOrder => vec![ParamSet::new()
            .with("auto", true)
            .with("seasonal_period", seasonal_period)],
        ParamSpace::ParameterFree => vec![ParamSet::new()],
    }
}

fn expand(grid: &ParamGrid, spec: &ModelSpec, seasonal_period: usize) -> Vec<ParamSet> {
    let mut axes = grid.axes.clone();
    if let Some(param) = &spec.seasonal_param {
        axes.push((param.clone(), vec![ParamValue::from(seasonal_period)]));
    }
    cartesian(&axes)
}

/// Cartesian product over the axes, iterative odometer style.
///
/// No axes yields the single empty configuration; an axis with no values
/// yields nothing.
pub fn cartesian(axes: &[(String, Vec<ParamValue>)]) -> Vec<ParamSet> {
    if axes.is_empty() {
        return vec![ParamSet::new()];
    }
    if axes.iter().any(|(_, values)| values.is_empty()) {
        return Vec::new();
    }

    let total: usize = axes.iter().map(|(_, values)| values.len()).product();
    let mut combos = Vec::with_capacity(total);
    let mut indices = vec![0usize; axes.len()];

    loop {
        let mut set = ParamSet::new();
        for ((name, values), &index) in axes.iter().zip(indices.iter()) {
            set.set(name.clone(), values[index].clone());
        }
        combos.push(set);

        // Advance the odometer; the last axis ticks fastest.
        let mut position = axes.len();
        loop {
            if position == 0 {
                return combos;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < axes[position].1.len() {
                break;
            }
            indices[position] = 0;
        }
    }
}

/// Resolve the seasonal period for a search.
///
/// Stages, in order: the explicit argument, the organization-wide
/// `global_seasonalPeriods` setting, the request frequency, the
/// organization-wide `global_frequency` setting, and finally the default.
/// Every stage that fails to produce a period logs why, so silent
/// fallbacks are observable in the diagnostics.
pub fn resolve_seasonal_period(
    explicit: Option<usize>,
    settings: &dyn SettingsProvider,
    frequency: Option<Frequency>,
) -> usize {
    match explicit {
        Some(period) if period >= 1 => return period,
        Some(period) => debug!(period, "ignoring explicit seasonal period below 1"),
        None => debug!("no explicit seasonal period given"),
    }

    match settings.get(SEASONAL_PERIODS_KEY) {
        Some(raw) => match parse_period(&raw) {
            Some(period) => return period,
            None => debug!(raw, "seasonal period setting did not parse"),
        },
        None => debug!(key = SEASONAL_PERIODS_KEY, "seasonal period setting absent"),
    }

    if let Some(frequency) = frequency {
        return frequency.seasonal_period();
    }
    debug!("no frequency on the request");

    match settings.get(FREQUENCY_KEY) {
        Some(raw) => match raw.trim().trim_matches('"').parse::<Frequency>() {
            Ok(frequency) => return frequency.seasonal_period(),
            Err(_) => debug!(raw, "frequency setting did not parse"),
        },
        None => debug!(key = FREQUENCY_KEY, "frequency setting absent"),
    }

    debug!(period = DEFAULT_SEASONAL_PERIOD, "falling back to default seasonal period");
    DEFAULT_SEASONAL_PERIOD
}

/// Parse a stored seasonal period: a JSON number, a JSON string holding a
/// number, or a bare numeric string. Zero and negatives are rejected.
fn parse_period(raw: &str) -> Option<usize> {
    let trimmed = raw.trim();
    let parsed = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Number(n)) => n.as_u64().map(|v| v as usize),
        Ok(serde_json::Value::String(s)) => s.trim().parse::<usize>().ok(),
        _ => trimmed.parse::<usize>().ok(),
    };
    parsed.filter(|period| *period >= 1)
}
