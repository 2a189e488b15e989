//! Model registry.

use std::collections::HashMap;
use std::fmt;
use tuner_spi::{ForecastModel, ParamGrid, ParamSet, Result, TuneError};

/// Factory producing a model instance from a configuration and the
/// resolved seasonal period.
pub type ModelFactory =
    Box<dyn Fn(&ParamSet, usize) -> Result<Box<dyn ForecastModel>> + Send + Sync>;

/// Parameter space a model exposes to the grid generator.
#[derive(Debug, Clone)]
pub enum ParamSpace {
    /// Named axes expanded by cartesian product.
    Grid(ParamGrid),
    /// Hand-picked configurations evaluated verbatim, in declared order.
    Explicit(Vec<ParamSet>),
    /// One automatic configuration; the model resolves its own order
    /// during training.
    AutoOrder,
    /// No parameters; one empty configuration.
    ParameterFree,
}

/// Minimum observations a model needs for training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinObservations {
    Fixed(usize),
    /// `factor * seasonal_period + base`.
    PerPeriod { factor: usize, base: usize },
}

impl MinObservations {
    pub fn required(&self, seasonal_period: usize) -> usize {
        match self {
            MinObservations::Fixed(n) => *n,
            MinObservations::PerPeriod { factor, base } => factor * seasonal_period + base,
        }
    }
}

/// One registered model.
pub struct ModelSpec {
    pub id: String,
    pub label: String,
    pub space: ParamSpace,
    pub min_observations: MinObservations,
    /// Axis name the resolved seasonal period is injected under, for
    /// models whose grid depends on it.
    pub seasonal_param: Option<String>,
    /// Excluded from grid search entirely.
    pub grid_excluded: bool,
    factory: ModelFactory,
}

impl ModelSpec {
    pub fn new<F>(
        id: impl Into<String>,
        label: impl Into<String>,
        space: ParamSpace,
        min_observations: MinObservations,
        factory: F,
    ) -> Self
    where
        F: Fn(&ParamSet, usize) -> Result<Box<dyn ForecastModel>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            space,
            min_observations,
            seasonal_param: None,
            grid_excluded: false,
            factory: Box::new(factory),
        }
    }

    /// Mark the model seasonal; the resolved period is injected as a grid
    /// axis under `param`.
    pub fn seasonal(mut self, param: impl Into<String>) -> Self {
        self.seasonal_param = Some(param.into());
        self
    }

    /// Opt the model out of grid search.
    pub fn exclude_from_grid(mut self) -> Self {
        self.grid_excluded = true;
        self
    }

    /// Instantiate the model for one configuration.
    pub fn build_model(&self, params: &ParamSet, seasonal_period: usize) -> Result<Box<dyn ForecastModel>> {
        (self.factory)(params, seasonal_period)
    }
}

impl fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSpec")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("space", &self.space)
            .field("min_observations", &self.min_observations)
            .field("seasonal_param", &self.seasonal_param)
            .field("grid_excluded", &self.grid_excluded)
            .finish_non_exhaustive()
    }
}

/// Registry of tunable models, iterated in registration order.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    order: Vec<String>,
    specs: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. Re-registering an id replaces the spec but keeps
    /// its original position.
    pub fn register(&mut self, spec: ModelSpec) {
        if !self.specs.contains_key(&spec.id) {
            self.order.push(spec.id.clone());
        }
        self.specs.insert(spec.id.clone(), spec);
    }

    /// Builder-style register.
    pub fn with(mut self, spec: ModelSpec) -> Self {
        self.register(spec);
        self
    }

    pub fn get(&self, id: &str) -> Result<&ModelSpec> {
        self.specs
            .get(id)
            .ok_or_else(|| TuneError::UnknownModel(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.specs.contains_key(id)
    }

    /// Model ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn min_observations(&self, id: &str, seasonal_period: usize) -> Result<usize> {
        Ok(self.get(id)?.min_observations.required(seasonal_period))
    }
}
