//! Earthquake ruptures and their tectonic classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::site::Site;

/// Classification of seismic source style.
///
/// Selects which ground-motion model applies to a rupture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TectonicRegion {
    ActiveShallowCrust,
    StableShallowCrust,
    SubductionInterface,
    SubductionIntraslab,
    Volcanic,
}

impl TectonicRegion {
    /// Stable snake_case name (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActiveShallowCrust => "active_shallow_crust",
            Self::StableShallowCrust => "stable_shallow_crust",
            Self::SubductionInterface => "subduction_interface",
            Self::SubductionIntraslab => "subduction_intraslab",
            Self::Volcanic => "volcanic",
        }
    }
}

impl fmt::Display for TectonicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discrete earthquake source event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rupture {
    /// Identifier assigned by the forecast (unique within a forecast)
    pub id: String,

    /// Moment magnitude
    pub magnitude: f64,

    /// Hypocentre location
    pub hypocenter: Site,

    /// Hypocentral depth in km
    pub depth_km: f64,

    /// Probability of occurrence over the forecast's time span
    pub probability: f64,

    /// Tectonic region used to select the ground-motion model
    pub tectonic_region: TectonicRegion,
}

impl Rupture {
    /// Create a rupture
    pub fn new(
        id: impl Into<String>,
        magnitude: f64,
        hypocenter: Site,
        tectonic_region: TectonicRegion,
    ) -> Self {
        Self {
            id: id.into(),
            magnitude,
            hypocenter,
            depth_km: 10.0,
            probability: 0.0,
            tectonic_region,
        }
    }

    /// Set the probability of occurrence
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Set the hypocentral depth
    pub fn with_depth(mut self, depth_km: f64) -> Self {
        self.depth_km = depth_km;
        self
    }
}

impl fmt::Display for Rupture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (M{} {})", self.id, self.magnitude, self.tectonic_region)
    }
}
