//! Input validation shared by the curve and ground-motion paths.
//!
//! Every check fails fast with [`HazardError::InvalidArgument`] before any
//! computation is attempted. Components report the rejection through their
//! reporter; the validator itself has no side effects.

use crate::adapters::{GmmMap, RuptureForecast};
use crate::domain::Site;

use super::error::{HazardError, HazardResult};

fn reject(msg: &str) -> HazardError {
    HazardError::invalid(msg)
}

/// Validate the parts of a request common to every computation.
///
/// A borrowed forecast cannot be absent, so a forecast exposing no ruptures
/// is rejected in its place.
pub fn validate(sites: &[Site], forecast: &dyn RuptureForecast, gmms: &GmmMap) -> HazardResult<()> {
    if sites.is_empty() {
        return Err(reject("List of sites must contain at least one site"));
    }
    if forecast.ruptures().is_empty() {
        return Err(reject(&format!(
            "Earthquake rupture forecast '{}' contains no ruptures and is treated as absent",
            forecast.name()
        )));
    }
    if gmms.is_empty() {
        return Err(reject("Gmpe map must contain at least one gmpe"));
    }
    Ok(())
}

/// Intensity levels must be non-empty, finite, positive and distinct.
///
/// Order is free; the curve aggregator sorts the levels itself.
pub fn validate_intensity_levels(levels: &[f64]) -> HazardResult<()> {
    if levels.is_empty() {
        return Err(reject(
            "Array of intensity measure levels must contain at least one value",
        ));
    }
    if let Some(bad) = levels.iter().find(|l| !l.is_finite() || **l <= 0.0) {
        return Err(reject(&format!(
            "Intensity measure levels must be finite and positive, got {}",
            bad
        )));
    }
    let mut sorted = levels.to_vec();
    sorted.sort_by(f64::total_cmp);
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(reject(&format!(
            "Intensity measure levels must be distinct, got {} twice",
            pair[0]
        )));
    }
    Ok(())
}

/// The integration distance must be finite and positive
pub fn validate_integration_distance(distance_km: f64) -> HazardResult<()> {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return Err(reject(&format!(
            "Integration distance must be finite and positive, got {}",
            distance_km
        )));
    }
    Ok(())
}

/// Probabilities (quantile levels, hazard-map PoEs) must lie in [0, 1]
pub fn validate_probabilities(name: &str, values: &[f64]) -> HazardResult<()> {
    if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(reject(&format!("{} must lie in [0, 1], got {}", name, bad)));
    }
    Ok(())
}
