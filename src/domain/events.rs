//! Event types emitted while a hazard run executes.
//!
//! Every unit of work (a site's curve, a rupture's field, a cache write)
//! produces an event, so the outcome of a run can be reconstructed from its
//! event stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single event in a run's event stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event
    pub id: Uuid,

    /// When this event occurred (ISO 8601)
    pub timestamp: DateTime<Utc>,

    /// The run this event belongs to
    pub run_id: Uuid,

    /// Unit of work label, e.g. "site (34.05, -118.25)" or "rupture r1"
    pub unit: Option<String>,

    /// Type of event
    pub event_type: EventType,

    /// Human-readable summary
    pub summary: String,

    /// Status of the unit or run
    pub status: UnitStatus,

    /// Time taken in milliseconds (for completed units)
    pub duration_ms: Option<u64>,

    /// Error message if failed
    pub error: Option<String>,
}

impl Event {
    /// Create a new event with the current timestamp
    pub fn new(
        run_id: Uuid,
        unit: Option<String>,
        event_type: EventType,
        summary: String,
        status: UnitStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            run_id,
            unit,
            event_type,
            summary,
            status,
            duration_ms: None,
            error: None,
        }
    }

    /// Create an event with duration information
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Create an event with error information
    pub fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

/// Types of events that can occur during a hazard run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A run has started
    RunStarted,

    /// A run finished (possibly with partial failures)
    RunCompleted,

    /// A run was aborted
    RunFailed,

    /// Input validation rejected the request
    ValidationFailed,

    /// A block of sites is about to be processed
    BlockStarted,

    /// A site's hazard curve was computed
    CurveComputed,

    /// A site's hazard curve could not be computed
    CurveFailed,

    /// A stochastic event set was drawn
    EventSetSampled,

    /// A rupture's ground-motion field was simulated
    FieldSimulated,

    /// A rupture's ground-motion field could not be simulated
    FieldFailed,

    /// A cache entry was written
    CacheWritten,

    /// A cache write was rejected by the store
    CacheWriteFailed,

    /// Intermediate cache entries were deleted
    CachePurged,
}

impl EventType {
    /// Whether this event marks a failed unit of work
    pub fn is_unit_failure(&self) -> bool {
        matches!(
            self,
            Self::CurveFailed | Self::FieldFailed | Self::CacheWriteFailed
        )
    }

    /// Whether this event marks a successful unit of work
    pub fn is_unit_success(&self) -> bool {
        matches!(
            self,
            Self::CurveComputed | Self::FieldSimulated | Self::CacheWritten
        )
    }
}

/// Status of a unit or run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    /// Not yet started
    Pending,

    /// Currently executing
    Running,

    /// Completed successfully
    Completed,

    /// Failed (with error)
    Failed,
}

impl Default for UnitStatus {
    fn default() -> Self {
        Self::Pending
    }
}
