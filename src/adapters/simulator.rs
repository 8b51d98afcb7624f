//! Uncorrelated ground-motion field simulation.
//!
//! Asks the model for one value per site, in site order, drawing from the
//! shared random source. No spatial correlation is applied between sites.

use anyhow::{Context, Result};
use rand::RngCore;

use super::{GroundMotionFieldSimulator, GroundMotionModel};
use crate::domain::{GroundMotionField, Rupture, Site};

/// Field simulator with independent draws per site
#[derive(Debug, Clone, Copy, Default)]
pub struct UncorrelatedFieldSimulator;

impl UncorrelatedFieldSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl GroundMotionFieldSimulator for UncorrelatedFieldSimulator {
    fn simulate_field(
        &self,
        model: &dyn GroundMotionModel,
        rupture: &Rupture,
        sites: &[Site],
        rng: &mut dyn RngCore,
    ) -> Result<GroundMotionField> {
        let mut field = GroundMotionField::new();

        for site in sites {
            let value = model.simulate(rupture, site, rng).with_context(|| {
                format!(
                    "Model '{}' failed to simulate rupture {} at site {}",
                    model.name(),
                    rupture.id,
                    site
                )
            })?;
            field.insert(*site, value);
        }

        Ok(field)
    }
}
