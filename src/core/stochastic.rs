//! Stochastic ground-motion field orchestration.
//!
//! Draws one stochastic event set from the forecast, then simulates a
//! ground-motion field for every sampled rupture. The sampler and the
//! simulator share the caller's random source, so a seeded source makes the
//! whole run reproducible.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::instrument;

use crate::adapters::{
    GmmMap, GroundMotionFieldSimulator, RuptureForecast, StochasticEventSetSampler,
    UncorrelatedFieldSimulator,
};
use crate::domain::{BatchReport, EventType, FailurePolicy, GroundMotionFields, RunKind, Site};

use super::error::{HazardError, HazardResult};
use super::reporter::{Reporter, RunRecorder, TracingReporter};
use super::validator::validate;

/// Seeded random source for reproducible runs
pub fn rng_from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fields of one run together with its batch report
#[derive(Debug, Clone)]
pub struct FieldRun {
    /// One field per sampled rupture, in sampling order
    pub fields: GroundMotionFields,

    /// Which ruptures succeeded and which failed
    pub report: BatchReport,
}

/// Computes ground-motion fields from a stochastic event set
pub struct StochasticOrchestrator {
    sampler: Arc<dyn StochasticEventSetSampler>,
    simulator: Arc<dyn GroundMotionFieldSimulator>,
    reporter: Arc<dyn Reporter>,
    policy: FailurePolicy,
}

impl StochasticOrchestrator {
    /// Create an orchestrator using the uncorrelated field simulator
    pub fn new(sampler: Arc<dyn StochasticEventSetSampler>) -> Self {
        Self {
            sampler,
            simulator: Arc::new(UncorrelatedFieldSimulator::new()),
            reporter: Arc::new(TracingReporter),
            policy: FailurePolicy::default(),
        }
    }

    /// Use a different field simulator
    pub fn with_simulator(mut self, simulator: Arc<dyn GroundMotionFieldSimulator>) -> Self {
        self.simulator = simulator;
        self
    }

    /// Report through a custom reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Choose how per-rupture failures affect the batch
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Sample an event set and simulate one field per rupture.
    ///
    /// A rupture whose tectonic region has no model aborts the run with
    /// [`HazardError::MissingModel`] regardless of the failure policy; it is
    /// a configuration defect, not a transient failure.
    #[instrument(skip_all, fields(sites = sites.len(), forecast = forecast.name()))]
    pub fn compute(
        &self,
        sites: &[Site],
        forecast: &dyn RuptureForecast,
        gmms: &GmmMap,
        rng: &mut dyn RngCore,
    ) -> HazardResult<FieldRun> {
        let mut recorder = RunRecorder::start(
            self.reporter.clone(),
            RunKind::GroundMotionFields,
            format!(
                "Computing ground-motion fields for {} sites from forecast '{}'",
                sites.len(),
                forecast.name()
            ),
        );

        if let Err(e) = validate(sites, forecast, gmms) {
            recorder.rejected(e.to_string());
            return Err(e);
        }

        let ruptures = match self.sampler.sample(forecast, rng) {
            Ok(ruptures) => ruptures,
            Err(source) => {
                recorder.abort(format!("{:#}", source));
                return Err(HazardError::ExternalComputation {
                    unit: format!("event set of forecast '{}'", forecast.name()),
                    source,
                });
            }
        };
        recorder.note(
            None,
            EventType::EventSetSampled,
            format!("Sampled {} ruptures", ruptures.len()),
        );

        let mut fields = GroundMotionFields::new();

        for rupture in ruptures {
            let unit = format!("rupture {}", rupture.id);

            let Some(model) = gmms.get(rupture.tectonic_region) else {
                let err = HazardError::MissingModel {
                    rupture: rupture.id.clone(),
                    region: rupture.tectonic_region,
                };
                recorder.failure(
                    unit,
                    EventType::FieldFailed,
                    format!("No model for rupture {}", rupture.id),
                    err.to_string(),
                );
                recorder.abort(err.to_string());
                return Err(err);
            };

            let started = Instant::now();
            match self
                .simulator
                .simulate_field(model.as_ref(), &rupture, sites, rng)
            {
                Ok(field) => {
                    recorder.success(
                        unit,
                        EventType::FieldSimulated,
                        format!(
                            "Simulated {} values for rupture {} with '{}'",
                            field.len(),
                            rupture.id,
                            model.name()
                        ),
                        started.elapsed().as_millis() as u64,
                    );
                    fields.push(rupture, field);
                }
                Err(source) => {
                    let error = format!("{:#}", source);
                    recorder.failure(
                        unit.clone(),
                        EventType::FieldFailed,
                        format!("Field simulation failed for rupture {}", rupture.id),
                        error.clone(),
                    );

                    if self.policy == FailurePolicy::AllOrNothing {
                        recorder.abort(error);
                        return Err(HazardError::ExternalComputation { unit, source });
                    }
                }
            }
        }

        let report = recorder.finish(format!("Simulated {} ground-motion fields", fields.len()));
        Ok(FieldRun { fields, report })
    }
}
