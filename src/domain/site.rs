//! Sites at which hazard is evaluated.
//!
//! A site is identified purely by its location, so equality and hashing are
//! defined over the coordinate bit patterns rather than float comparison.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A geographic point (decimal degrees)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Site {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Site {
    /// Create a site from latitude and longitude
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Canonical text of the latitude (see [`canonical_decimal`])
    pub fn latitude_text(&self) -> String {
        canonical_decimal(self.latitude)
    }

    /// Canonical text of the longitude (see [`canonical_decimal`])
    pub fn longitude_text(&self) -> String {
        canonical_decimal(self.longitude)
    }

    /// Stable digest of the location (first 16 hex chars of SHA-256)
    ///
    /// Used as the site suffix of job-scoped cache keys.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.latitude_text().as_bytes());
        hasher.update(b",");
        hasher.update(self.longitude_text().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }

    fn key_bits(&self) -> (u64, u64) {
        (normalized_bits(self.latitude), normalized_bits(self.longitude))
    }
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Site {}

impl Hash for Site {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude_text(), self.longitude_text())
    }
}

// -0.0 and 0.0 are the same place
fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// Render a coordinate (or any decimal key component) as canonical text.
///
/// Uses the shortest decimal that round-trips to the same `f64` and always
/// keeps a fractional part, so `34.0` renders as `"34.0"` and `-118.25` as
/// `"-118.25"`. Never uses exponent notation.
pub fn canonical_decimal(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let text = format!("{}", value);
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
