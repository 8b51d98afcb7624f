//! Domain types for hazard computations.
//!
//! This module contains the core data structures:
//! - Site, Rupture, TectonicRegion: inputs to a computation
//! - HazardCurve, GroundMotionField: per-site and per-rupture results
//! - Event, BatchReport: what happened during a run

pub mod curve;
pub mod events;
pub mod field;
pub mod report;
pub mod rupture;
pub mod site;

// Re-export commonly used types
pub use curve::HazardCurve;
pub use events::{Event, EventType, UnitStatus};
pub use field::{GroundMotionField, GroundMotionFields, RuptureField};
pub use report::{BatchReport, FailurePolicy, RunKind, RunState, UnitFailure};
pub use rupture::{Rupture, TectonicRegion};
pub use site::{canonical_decimal, Site};
