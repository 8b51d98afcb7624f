//! Job configuration for hazard runs.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (QUAKEHAZ_SEED, QUAKEHAZ_BLOCK_SIZE,
//!    QUAKEHAZ_FAILURE_POLICY)
//! 2. Job file (YAML)
//! 3. Defaults
//!
//! Paths are not part of the configuration; the job file only carries
//! computation parameters.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::validator::{
    validate_integration_distance, validate_intensity_levels, validate_probabilities,
};
use crate::core::DEFAULT_BLOCK_SIZE;
use crate::domain::FailurePolicy;

pub const ENV_SEED: &str = "QUAKEHAZ_SEED";
pub const ENV_BLOCK_SIZE: &str = "QUAKEHAZ_BLOCK_SIZE";
pub const ENV_FAILURE_POLICY: &str = "QUAKEHAZ_FAILURE_POLICY";

fn default_job_id() -> String {
    "default".to_string()
}

fn default_integration_distance() -> f64 {
    200.0
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

/// Job file schema (matches YAML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Scopes job-level cache keys
    #[serde(default = "default_job_id")]
    pub job_id: String,

    /// Intensity measure levels of every hazard curve
    #[serde(default)]
    pub intensity_levels: Vec<f64>,

    /// Maximum source-to-site distance considered (km)
    #[serde(default = "default_integration_distance")]
    pub integration_distance_km: f64,

    /// Seed of the random source; `None` draws one from the OS
    #[serde(default)]
    pub random_seed: Option<u64>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Rupture index used to key ground-motion values
    #[serde(default)]
    pub rupture_index: i64,

    /// Quantile levels for quantile curves and maps
    #[serde(default)]
    pub quantile_levels: Vec<f64>,

    /// PoEs at which hazard maps are computed
    #[serde(default)]
    pub poes: Vec<f64>,

    /// Sites per block
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_id: default_job_id(),
            intensity_levels: Vec::new(),
            integration_distance_km: default_integration_distance(),
            random_seed: None,
            failure_policy: FailurePolicy::default(),
            rupture_index: 0,
            quantile_levels: Vec::new(),
            poes: Vec::new(),
            block_size: default_block_size(),
        }
    }
}

impl JobConfig {
    /// Parse a job from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse job config")
    }

    /// Load and parse a job file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse job file: {}", path.display()))
    }

    /// Load a job file, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_with(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED) {
            self.random_seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("{} is not a valid seed: {}", ENV_SEED, seed))?,
            );
        }

        if let Some(size) = lookup(ENV_BLOCK_SIZE) {
            self.block_size = size
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid block size: {}", ENV_BLOCK_SIZE, size))?;
        }

        if let Some(policy) = lookup(ENV_FAILURE_POLICY) {
            self.failure_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", ENV_FAILURE_POLICY))?;
        }

        Ok(())
    }

    /// Check the parameters a run depends on
    pub fn validate(&self) -> Result<()> {
        if self.job_id.trim().is_empty() {
            anyhow::bail!("Job id cannot be empty");
        }
        if self.block_size == 0 {
            anyhow::bail!("Block size must be at least 1");
        }
        validate_intensity_levels(&self.intensity_levels)?;
        validate_integration_distance(self.integration_distance_km)?;
        validate_probabilities("Quantile levels", &self.quantile_levels)?;
        validate_probabilities("Hazard map PoEs", &self.poes)?;
        Ok(())
    }
}
