//! Core hazard computation logic.
//!
//! This module contains:
//! - HazardCurveAggregator: classical PSHA curves per site
//! - StochasticOrchestrator: event-set sampling and ground-motion fields
//! - CacheAdapter: cache keys, writes and purges
//! - Validator, statistics and the reporting collaborator

pub mod cache;
pub mod curves;
pub mod error;
pub mod reporter;
pub mod statistics;
pub mod stochastic;
pub mod validator;

// Re-export commonly used types
pub use cache::{
    CacheAdapter, CacheWriteFailure, CurvePersistReport, CurveKeys, CurveWriteFailure, DigestKeys,
    KeyScheme, PersistReport, PurgeReport, RuptureIndexKeys,
};
pub use curves::{curves_as_json, CurveRun, HazardCurveAggregator, DEFAULT_BLOCK_SIZE};
pub use error::{HazardError, HazardResult};
pub use reporter::{MemoryReporter, Reporter, TracingReporter};
pub use statistics::{hazard_map_level, mean_curve, mean_curves, quantile_curve, quantile_curves};
pub use stochastic::{rng_from_seed, FieldRun, StochasticOrchestrator};
pub use validator::{
    validate, validate_integration_distance, validate_intensity_levels, validate_probabilities,
};
