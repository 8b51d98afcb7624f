//! Errors raised by hazard computations.

use thiserror::Error;

use crate::domain::{Site, TectonicRegion};

/// Result alias for hazard computations
pub type HazardResult<T> = Result<T, HazardError>;

/// Hazard computation errors
#[derive(Debug, Error)]
pub enum HazardError {
    /// The request is malformed; nothing was computed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A rupture's tectonic region has no ground-motion model
    #[error("No ground-motion model for tectonic region {region} (rupture {rupture})")]
    MissingModel {
        rupture: String,
        region: TectonicRegion,
    },

    /// A delegated numerical call failed for one unit of work
    #[error("External computation failed for {unit}: {source:#}")]
    ExternalComputation {
        unit: String,
        #[source]
        source: anyhow::Error,
    },

    /// The cache store rejected a write
    #[error("Cache write failed for key {key} (rupture index {rupture_index}, site {site}): {source:#}")]
    CacheWrite {
        key: String,
        rupture_index: i64,
        site: Site,
        #[source]
        source: anyhow::Error,
    },

    /// The cache store rejected a write of a job-scoped entry
    #[error("Cache write failed for key {key}: {source:#}")]
    CacheEntry {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The cache store rejected a delete; `purged` lists the keys already
    /// deleted by earlier groups
    #[error("Cache delete failed for {count} keys after purging {}: {source:#}", .purged.len())]
    CacheDelete {
        count: usize,
        purged: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

impl HazardError {
    /// Shorthand for [`HazardError::InvalidArgument`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether this is a validation failure
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
