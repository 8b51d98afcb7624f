//! quakehaz - Probabilistic seismic hazard orchestration
//!
//! Drives externally supplied numerical collaborators (curve calculators,
//! ground-motion models, event-set samplers) over lists of sites and caches
//! the intermediate results under deterministic keys.
//!
//! # Architecture
//!
//! Every computation is a run made of units of work:
//! - Each unit (a site's curve, a rupture's field, a cache write) emits an event
//! - A run's batch report can be rebuilt from its events
//! - A `FailurePolicy` decides whether one failed unit aborts the run
//!
//! # Modules
//!
//! - `adapters`: Collaborator traits and in-memory implementations
//! - `core`: Aggregation, orchestration, caching, validation, statistics
//! - `domain`: Data structures (Site, Rupture, HazardCurve, Event, BatchReport)
//! - `config`: Job configuration
//!
//! # Usage
//!
//! ```rust,ignore
//! let aggregator = HazardCurveAggregator::new(calculator)
//!     .with_policy(FailurePolicy::Partial);
//! let run = aggregator.compute(&sites, &forecast, &gmms, &levels, 200.0)?;
//!
//! let mut rng = rng_from_seed(42);
//! let fields = StochasticOrchestrator::new(sampler)
//!     .compute(&sites, &forecast, &gmms, &mut rng)?;
//! let keys = CacheAdapter::new().persist(&fields.fields, 5, &store).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{
    CacheStore, GmmMap, GroundMotionFieldSimulator, GroundMotionModel, HazardCurveCalculator,
    MemoryCache, RuptureForecast, StochasticEventSetSampler, UncorrelatedFieldSimulator,
};
pub use config::JobConfig;
pub use core::{
    rng_from_seed, CacheAdapter, CurveKeys, CurveRun, FieldRun, HazardCurveAggregator,
    HazardError, HazardResult, MemoryReporter, Reporter, StochasticOrchestrator, TracingReporter,
};
pub use domain::{
    BatchReport, Event, EventType, FailurePolicy, GroundMotionField, GroundMotionFields,
    HazardCurve, RunState, Rupture, Site, TectonicRegion,
};
