//! Classical PSHA hazard curve aggregation.
//!
//! Drives the external curve calculator once per site and collects the
//! results into a per-site mapping. Each site is handed its own copy of the
//! seed curve and gets back an independent curve; no curve object is shared
//! between sites.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use crate::adapters::{GmmMap, HazardCurveCalculator, RuptureForecast};
use crate::domain::{BatchReport, EventType, FailurePolicy, HazardCurve, RunKind, Site};

use super::error::{HazardError, HazardResult};
use super::reporter::{Reporter, RunRecorder, TracingReporter};
use super::validator::{validate, validate_integration_distance, validate_intensity_levels};

/// Default number of sites per block
pub const DEFAULT_BLOCK_SIZE: usize = 100;

/// Curves of one run together with its batch report
#[derive(Debug, Clone)]
pub struct CurveRun {
    /// One curve per distinct site that succeeded
    pub curves: HashMap<Site, HazardCurve>,

    /// Which sites succeeded and which failed
    pub report: BatchReport,
}

impl CurveRun {
    /// Curve for a site
    pub fn curve(&self, site: &Site) -> Option<&HazardCurve> {
        self.curves.get(site)
    }
}

/// Computes hazard curves for a list of sites
pub struct HazardCurveAggregator {
    calculator: Arc<dyn HazardCurveCalculator>,
    reporter: Arc<dyn Reporter>,
    policy: FailurePolicy,
    block_size: usize,
}

impl HazardCurveAggregator {
    /// Create an aggregator reporting through `tracing`
    pub fn new(calculator: Arc<dyn HazardCurveCalculator>) -> Self {
        Self {
            calculator,
            reporter: Arc::new(TracingReporter),
            policy: FailurePolicy::default(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Report through a custom reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Choose how per-site failures affect the batch
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sites per block (at least 1)
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Compute one hazard curve per site.
    ///
    /// Sites are processed in input order; a site listed twice keeps the
    /// later result. Levels may be given in any order; every curve lists them
    /// ascending.
    #[instrument(skip_all, fields(sites = sites.len(), levels = intensity_levels.len()))]
    pub fn compute(
        &self,
        sites: &[Site],
        forecast: &dyn RuptureForecast,
        gmms: &GmmMap,
        intensity_levels: &[f64],
        integration_distance_km: f64,
    ) -> HazardResult<CurveRun> {
        let mut recorder = RunRecorder::start(
            self.reporter.clone(),
            RunKind::HazardCurves,
            format!(
                "Computing hazard curves for {} sites from forecast '{}'",
                sites.len(),
                forecast.name()
            ),
        );

        if let Err(e) = validate(sites, forecast, gmms)
            .and_then(|_| validate_intensity_levels(intensity_levels))
            .and_then(|_| validate_integration_distance(integration_distance_km))
        {
            recorder.rejected(e.to_string());
            return Err(e);
        }

        // Curves are always defined on ascending levels
        let mut levels = intensity_levels.to_vec();
        levels.sort_by(f64::total_cmp);
        let seed = HazardCurve::seed(&levels);
        let mut curves = HashMap::with_capacity(sites.len());
        let block_count = sites.len().div_ceil(self.block_size);

        for (block_idx, block) in sites.chunks(self.block_size).enumerate() {
            recorder.note(
                None,
                EventType::BlockStarted,
                format!("Block {}/{} ({} sites)", block_idx + 1, block_count, block.len()),
            );

            for site in block {
                let unit = format!("site {}", site);
                let started = Instant::now();

                match self.curve_for_site(&seed, site, gmms, forecast, integration_distance_km) {
                    Ok(curve) => {
                        curves.insert(*site, curve);
                        recorder.success(
                            unit,
                            EventType::CurveComputed,
                            format!("Hazard curve computed for {}", site),
                            started.elapsed().as_millis() as u64,
                        );
                    }
                    Err(source) => {
                        let error = format!("{:#}", source);
                        recorder.failure(
                            unit.clone(),
                            EventType::CurveFailed,
                            format!("Hazard curve failed for {}", site),
                            error.clone(),
                        );

                        if self.policy == FailurePolicy::AllOrNothing {
                            recorder.abort(error);
                            return Err(HazardError::ExternalComputation { unit, source });
                        }
                    }
                }
            }
        }

        let report = recorder.finish(format!("Computed {} hazard curves", curves.len()));
        Ok(CurveRun { curves, report })
    }

    fn curve_for_site(
        &self,
        seed: &HazardCurve,
        site: &Site,
        gmms: &GmmMap,
        forecast: &dyn RuptureForecast,
        integration_distance_km: f64,
    ) -> anyhow::Result<HazardCurve> {
        let curve = self.calculator.hazard_curve(
            seed.clone(),
            site,
            gmms,
            forecast,
            integration_distance_km,
        )?;

        if !curve.same_levels(seed) {
            anyhow::bail!(
                "Calculator returned a curve with {} levels that do not match the {} requested",
                curve.len(),
                seed.len()
            );
        }

        Ok(curve)
    }
}

/// PoE arrays of `curves` as JSON, in `sites` order.
///
/// Sites without a curve are rendered as `null`.
pub fn curves_as_json(curves: &HashMap<Site, HazardCurve>, sites: &[Site]) -> serde_json::Value {
    sites
        .iter()
        .map(|site| {
            curves
                .get(site)
                .map(HazardCurve::poes_json)
                .unwrap_or(serde_json::Value::Null)
        })
        .collect()
}
