//! Adapter interfaces for external collaborators.
//!
//! The numerical work of a hazard run (forecast sampling, curve integration,
//! ground-motion prediction) and the cache store live outside this crate.
//! Each is consumed through a trait defined here.

pub mod memory;
pub mod simulator;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rand::RngCore;

use crate::domain::{GroundMotionField, HazardCurve, Rupture, Site, TectonicRegion};

pub use memory::{CacheValue, MemoryCache};
pub use simulator::UncorrelatedFieldSimulator;

/// An earthquake rupture forecast
pub trait RuptureForecast: Send + Sync {
    /// Human-readable forecast name
    fn name(&self) -> &str;

    /// Every rupture the forecast can produce, with occurrence probabilities
    fn ruptures(&self) -> &[Rupture];
}

/// A ground-motion prediction model (attenuation relationship)
pub trait GroundMotionModel: Send + Sync {
    /// Human-readable model name
    fn name(&self) -> &str;

    /// Probability of exceeding each level at `site` given `rupture`
    fn exceedance_probabilities(
        &self,
        rupture: &Rupture,
        site: &Site,
        levels: &[f64],
    ) -> Result<Vec<f64>>;

    /// One simulated ground-motion value at `site` given `rupture`
    fn simulate(&self, rupture: &Rupture, site: &Site, rng: &mut dyn RngCore) -> Result<f64>;
}

/// Computes a site's hazard curve over a whole forecast
pub trait HazardCurveCalculator: Send + Sync {
    /// Populate a curve for `site`.
    ///
    /// `seed` carries the level grid with PoE 1.0 everywhere. The calculator
    /// owns the seed and returns the populated curve on the same grid.
    fn hazard_curve(
        &self,
        seed: HazardCurve,
        site: &Site,
        gmms: &GmmMap,
        forecast: &dyn RuptureForecast,
        max_distance_km: f64,
    ) -> Result<HazardCurve>;
}

/// Draws stochastic event sets from a Poissonian forecast
pub trait StochasticEventSetSampler: Send + Sync {
    /// Sample one event set; the same seeded source yields the same set
    fn sample(&self, forecast: &dyn RuptureForecast, rng: &mut dyn RngCore) -> Result<Vec<Rupture>>;
}

/// Simulates a ground-motion field for one rupture
pub trait GroundMotionFieldSimulator: Send + Sync {
    /// One value per site, uncorrelated across sites
    fn simulate_field(
        &self,
        model: &dyn GroundMotionModel,
        rupture: &Rupture,
        sites: &[Site],
        rng: &mut dyn RngCore,
    ) -> Result<GroundMotionField>;
}

/// Key-value cache store for intermediate results
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Write a scalar value under `key`, replacing any previous value
    async fn set(&self, key: &str, value: f64) -> Result<()>;

    /// Write a JSON value under `key`, replacing any previous value
    async fn set_json(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    /// Delete keys; returns how many existed
    async fn delete(&self, keys: &[String]) -> Result<usize>;
}

/// Ground-motion models keyed by tectonic region
#[derive(Clone, Default)]
pub struct GmmMap {
    models: HashMap<TectonicRegion, Arc<dyn GroundMotionModel>>,
}

impl GmmMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the model for a region, replacing any previous one
    pub fn insert(&mut self, region: TectonicRegion, model: Arc<dyn GroundMotionModel>) {
        self.models.insert(region, model);
    }

    /// Builder form of [`GmmMap::insert`]
    pub fn with(mut self, region: TectonicRegion, model: Arc<dyn GroundMotionModel>) -> Self {
        self.insert(region, model);
        self
    }

    /// Model for a region
    pub fn get(&self, region: TectonicRegion) -> Option<&Arc<dyn GroundMotionModel>> {
        self.models.get(&region)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Regions with a registered model, sorted
    pub fn regions(&self) -> Vec<TectonicRegion> {
        let mut regions: Vec<TectonicRegion> = self.models.keys().copied().collect();
        regions.sort();
        regions
    }
}

impl std::fmt::Debug for GmmMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for region in self.regions() {
            if let Some(model) = self.models.get(&region) {
                map.entry(&region, &model.name());
            }
        }
        map.finish()
    }
}
