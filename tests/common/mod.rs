//! Test collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use quakehaz::adapters::{
    CacheStore, GmmMap, GroundMotionModel, HazardCurveCalculator, MemoryCache, RuptureForecast,
    StochasticEventSetSampler,
};
use quakehaz::{HazardCurve, Rupture, Site, TectonicRegion};
use rand::{Rng, RngCore};

/// Route test logs through `RUST_LOG` when set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn la() -> Site {
    Site::new(34.05, -118.25)
}

pub fn crust_rupture(id: &str, magnitude: f64, probability: f64) -> Rupture {
    Rupture::new(id, magnitude, Site::new(34.0, -118.0), TectonicRegion::ActiveShallowCrust)
        .with_probability(probability)
}

/// A forecast over a fixed list of ruptures
pub struct StaticForecast {
    pub name: String,
    pub ruptures: Vec<Rupture>,
}

impl StaticForecast {
    pub fn new(ruptures: Vec<Rupture>) -> Self {
        Self {
            name: "static".to_string(),
            ruptures,
        }
    }
}

impl RuptureForecast for StaticForecast {
    fn name(&self) -> &str {
        &self.name
    }

    fn ruptures(&self) -> &[Rupture] {
        &self.ruptures
    }
}

/// Exceedance decays with level; simulated values scale with magnitude
pub struct DecayModel;

impl GroundMotionModel for DecayModel {
    fn name(&self) -> &str {
        "decay"
    }

    fn exceedance_probabilities(
        &self,
        rupture: &Rupture,
        _site: &Site,
        levels: &[f64],
    ) -> Result<Vec<f64>> {
        Ok(levels
            .iter()
            .map(|level| (-level * 10.0 / rupture.magnitude).exp())
            .collect())
    }

    fn simulate(&self, rupture: &Rupture, _site: &Site, rng: &mut dyn RngCore) -> Result<f64> {
        Ok(rupture.magnitude / 10.0 * rng.gen_range(0.5..1.5))
    }
}

/// Fails every simulation of one rupture
pub struct FailingModel {
    pub rupture_id: String,
}

impl GroundMotionModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn exceedance_probabilities(
        &self,
        rupture: &Rupture,
        site: &Site,
        levels: &[f64],
    ) -> Result<Vec<f64>> {
        DecayModel.exceedance_probabilities(rupture, site, levels)
    }

    fn simulate(&self, rupture: &Rupture, site: &Site, rng: &mut dyn RngCore) -> Result<f64> {
        if rupture.id == self.rupture_id {
            bail!("remote model unavailable");
        }
        DecayModel.simulate(rupture, site, rng)
    }
}

pub fn crust_gmms(model: Arc<dyn GroundMotionModel>) -> GmmMap {
    GmmMap::new().with(TectonicRegion::ActiveShallowCrust, model)
}

/// Combines rupture exceedances as independent Poisson events.
///
/// Counts calls, remembers each seed it receives and can fail for chosen
/// sites.
#[derive(Default)]
pub struct PoissonCalculator {
    pub calls: AtomicUsize,
    pub failing_sites: HashSet<Site>,
    pub seeds: Mutex<Vec<HazardCurve>>,
}

impl PoissonCalculator {
    pub fn failing_at(sites: &[Site]) -> Self {
        Self {
            failing_sites: sites.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HazardCurveCalculator for PoissonCalculator {
    fn hazard_curve(
        &self,
        seed: HazardCurve,
        site: &Site,
        gmms: &GmmMap,
        forecast: &dyn RuptureForecast,
        _max_distance_km: f64,
    ) -> Result<HazardCurve> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seeds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(seed.clone());

        if self.failing_sites.contains(site) {
            bail!("calculator timed out for {}", site);
        }

        let mut curve = seed;
        let levels = curve.levels().to_vec();
        let mut non_exceedance = vec![1.0; levels.len()];

        for rupture in forecast.ruptures() {
            let Some(model) = gmms.get(rupture.tectonic_region) else {
                continue;
            };
            let poes = model.exceedance_probabilities(rupture, site, &levels)?;
            for (acc, poe) in non_exceedance.iter_mut().zip(poes) {
                *acc *= 1.0 - rupture.probability * poe;
            }
        }

        for (i, q) in non_exceedance.into_iter().enumerate() {
            curve.set_poe(i, 1.0 - q);
        }
        Ok(curve)
    }
}

/// Keeps each rupture with its probability
pub struct BernoulliSampler;

impl StochasticEventSetSampler for BernoulliSampler {
    fn sample(&self, forecast: &dyn RuptureForecast, rng: &mut dyn RngCore) -> Result<Vec<Rupture>> {
        Ok(forecast
            .ruptures()
            .iter()
            .filter(|r| rng.gen::<f64>() < r.probability)
            .cloned()
            .collect())
    }
}

/// Returns every rupture exactly once
pub struct EverySampler;

impl StochasticEventSetSampler for EverySampler {
    fn sample(&self, forecast: &dyn RuptureForecast, _rng: &mut dyn RngCore) -> Result<Vec<Rupture>> {
        Ok(forecast.ruptures().to_vec())
    }
}

/// Memory store that rejects writes to chosen keys and deletes past a budget
pub struct FlakyStore {
    pub inner: MemoryCache,
    pub rejected: HashSet<String>,
    /// Delete calls allowed before the store starts failing them
    pub delete_budget: Option<usize>,
    pub delete_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn rejecting(keys: &[&str]) -> Self {
        Self {
            inner: MemoryCache::new(),
            rejected: keys.iter().map(|k| k.to_string()).collect(),
            delete_budget: None,
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn set(&self, key: &str, value: f64) -> Result<()> {
        if self.rejected.contains(key) {
            bail!("store rejected {}", key);
        }
        self.inner.set(key, value).await
    }

    async fn set_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        if self.rejected.contains(key) {
            bail!("store rejected {}", key);
        }
        self.inner.set_json(key, value).await
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let call = self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.delete_budget.is_some_and(|budget| call >= budget) {
            bail!("store is read-only");
        }
        self.inner.delete(keys).await
    }
}
