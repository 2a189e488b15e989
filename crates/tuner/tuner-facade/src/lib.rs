//! Tuner Facade
//!
//! High-level API for forecast parameter tuning. Re-exports all public types
//! from the tuner stack for convenient usage.
//!
//! # Example
//!
//! ```ignore
//! use tuner_facade::prelude::*;
//!
//! let registry = tunecast_models::standard_registry();
//! let series = vec![120.0, 135.0, 128.0, /* ... more observations ... */];
//! let summary = GridOptimizer::new(&registry).run(&series, &SearchRequest::new())?;
//! println!("Best model: {:?}", summary.best.map(|b| b.model_id));
//! ```

// Re-export everything from SPI
pub use tuner_spi::*;

// Re-export everything from API
pub use tuner_api::*;

// Re-export everything from Core
pub use tuner_core::*;

/// Prelude module for convenient imports
pub mod prelude {
    // Traits
    pub use tuner_spi::{ForecastModel, SettingsProvider, ValueAccessor};

    // Core types
    pub use tuner_api::{Frequency, SearchRequest, TunerConfig, WalkForwardConfig};

    // Error types
    pub use tuner_spi::{ParamGrid, ParamSet, Result, SearchSummary, TuneError};

    // Implementations
    pub use tuner_core::{
        GridOptimizer, MinObservations, ModelRegistry, ModelSpec, ParamSpace, ValidationEngine,
    };
}
