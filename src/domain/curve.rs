//! Hazard curves: probability of exceedance as a function of intensity level.

use serde::{Deserialize, Serialize};

/// Exceedance-probability curve for one site.
///
/// `levels` and `poes` are always the same length; `poes[i]` is the
/// probability of exceeding `levels[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCurve {
    levels: Vec<f64>,
    poes: Vec<f64>,
}

impl HazardCurve {
    /// Seed curve with probability 1.0 at every level.
    ///
    /// This is the input shape the curve calculator expects.
    pub fn seed(levels: &[f64]) -> Self {
        Self {
            levels: levels.to_vec(),
            poes: vec![1.0; levels.len()],
        }
    }

    /// Build a curve from paired sequences.
    ///
    /// Returns `None` when the lengths differ.
    pub fn from_points(levels: Vec<f64>, poes: Vec<f64>) -> Option<Self> {
        if levels.len() != poes.len() {
            return None;
        }
        Some(Self { levels, poes })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn poes(&self) -> &[f64] {
        &self.poes
    }

    /// Number of (level, poe) points
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Set the probability at an existing level index
    pub fn set_poe(&mut self, index: usize, poe: f64) {
        if let Some(slot) = self.poes.get_mut(index) {
            *slot = poe;
        }
    }

    /// Iterate over (level, poe) pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.iter().copied().zip(self.poes.iter().copied())
    }

    /// Whether two curves are defined on the same level grid
    pub fn same_levels(&self, other: &HazardCurve) -> bool {
        self.levels == other.levels
    }

    /// The PoE array as JSON
    pub fn poes_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.poes.clone())
    }
}
