//! Batch reports: which units of a run succeeded and which failed.
//!
//! A report is built incrementally while a run executes and can also be
//! reconstructed from the run's event stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{Event, EventType};

/// How per-unit failures affect the rest of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the whole batch on the first failed unit
    AllOrNothing,

    /// Record the failed unit and continue with the rest
    Partial,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::AllOrNothing
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_or_nothing" => Ok(Self::AllOrNothing),
            "partial" => Ok(Self::Partial),
            other => Err(format!("Unknown failure policy: {}", other)),
        }
    }
}

/// What a run computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    HazardCurves,
    GroundMotionFields,
    CachePersist,
    CachePurge,
}

/// State of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunState {
    /// Currently executing
    Running,

    /// Every unit succeeded
    Completed,

    /// Finished, but some units failed
    PartiallyFailed { failed_units: usize },

    /// Aborted with error
    Failed { error: String },
}

impl Default for RunState {
    fn default() -> Self {
        Self::Running
    }
}

/// A unit of work that did not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFailure {
    /// Unit label (site, rupture or cache key)
    pub unit: String,

    /// Error text
    pub error: String,
}

/// Outcome of one batch (one call into a component)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Run identifier shared with the run's events
    pub run_id: Uuid,

    /// What was computed
    pub kind: RunKind,

    /// Current state of the run
    pub state: RunState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if applicable)
    pub completed_at: Option<DateTime<Utc>>,

    /// Units that completed, in completion order
    pub succeeded: Vec<String>,

    /// Units that failed, in failure order
    pub failed: Vec<UnitFailure>,
}

impl BatchReport {
    /// Create an empty report for a new run
    pub fn new(run_id: Uuid, kind: RunKind) -> Self {
        Self {
            run_id,
            kind,
            state: RunState::Running,
            started_at: Utc::now(),
            completed_at: None,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Reconstruct a report from a run's events
    pub fn from_events(kind: RunKind, events: &[Event]) -> Option<Self> {
        let first_event = events.first()?;

        let mut report = Self {
            run_id: first_event.run_id,
            kind,
            state: RunState::Running,
            started_at: first_event.timestamp,
            completed_at: None,
            succeeded: Vec::new(),
            failed: Vec::new(),
        };

        for event in events {
            report.apply_event(event);
        }

        Some(report)
    }

    /// Apply a single event to update the report
    pub fn apply_event(&mut self, event: &Event) {
        let unit = event.unit.clone().unwrap_or_default();

        match event.event_type {
            EventType::RunStarted => {
                self.state = RunState::Running;
                self.started_at = event.timestamp;
            }
            EventType::RunCompleted => {
                self.finish_at(event.timestamp);
            }
            EventType::RunFailed | EventType::ValidationFailed => {
                self.state = RunState::Failed {
                    error: event.error.clone().unwrap_or_default(),
                };
                self.completed_at = Some(event.timestamp);
            }
            t if t.is_unit_success() => self.succeeded.push(unit),
            t if t.is_unit_failure() => self.failed.push(UnitFailure {
                unit,
                error: event.error.clone().unwrap_or_default(),
            }),
            _ => {}
        }
    }

    /// Record a successful unit
    pub fn record_success(&mut self, unit: impl Into<String>) {
        self.succeeded.push(unit.into());
    }

    /// Record a failed unit
    pub fn record_failure(&mut self, unit: impl Into<String>, error: impl Into<String>) {
        self.failed.push(UnitFailure {
            unit: unit.into(),
            error: error.into(),
        });
    }

    /// Mark the run finished; the state reflects any recorded failures
    pub fn finish(&mut self) {
        self.finish_at(Utc::now());
    }

    /// Mark the run aborted
    pub fn abort(&mut self, error: impl Into<String>) {
        self.state = RunState::Failed {
            error: error.into(),
        };
        self.completed_at = Some(Utc::now());
    }

    fn finish_at(&mut self, at: DateTime<Utc>) {
        self.state = if self.failed.is_empty() {
            RunState::Completed
        } else {
            RunState::PartiallyFailed {
                failed_units: self.failed.len(),
            }
        };
        self.completed_at = Some(at);
    }

    /// Whether every unit succeeded and the run finished
    pub fn is_complete_success(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Whether the run has finished (successfully or not)
    pub fn is_finished(&self) -> bool {
        !matches!(self.state, RunState::Running)
    }
}
