//! Ground-motion fields: simulated values per site, per rupture.

use serde::{Deserialize, Serialize};

use super::rupture::Rupture;
use super::site::Site;

/// Simulated ground-motion values for one rupture, keyed by site.
///
/// Keeps sites in insertion order; inserting a site that is already present
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundMotionField {
    values: Vec<(Site, f64)>,
}

impl GroundMotionField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for a site
    pub fn insert(&mut self, site: Site, value: f64) {
        match self.values.iter_mut().find(|(s, _)| *s == site) {
            Some(entry) => entry.1 = value,
            None => self.values.push((site, value)),
        }
    }

    /// Value at a site
    pub fn get(&self, site: &Site) -> Option<f64> {
        self.values
            .iter()
            .find(|(s, _)| s == site)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (site, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Site, f64)> + '_ {
        self.values.iter().map(|(site, value)| (site, *value))
    }
}

impl FromIterator<(Site, f64)> for GroundMotionField {
    fn from_iter<I: IntoIterator<Item = (Site, f64)>>(iter: I) -> Self {
        let mut field = Self::new();
        for (site, value) in iter {
            field.insert(site, value);
        }
        field
    }
}

/// One rupture together with its simulated field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureField {
    pub rupture: Rupture,
    pub field: GroundMotionField,
}

/// Ground-motion fields of a stochastic event set, in sampling order.
///
/// A rupture sampled more than once appears once per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundMotionFields {
    entries: Vec<RuptureField>,
}

impl GroundMotionFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rupture: Rupture, field: GroundMotionField) {
        self.entries.push(RuptureField { rupture, field });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuptureField> {
        self.entries.iter()
    }

    /// First field recorded for a rupture id
    pub fn field_for(&self, rupture_id: &str) -> Option<&GroundMotionField> {
        self.entries
            .iter()
            .find(|entry| entry.rupture.id == rupture_id)
            .map(|entry| &entry.field)
    }

    /// Total number of (rupture, site) values
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.field.len()).sum()
    }
}

impl<'a> IntoIterator for &'a GroundMotionFields {
    type Item = &'a RuptureField;
    type IntoIter = std::slice::Iter<'a, RuptureField>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
