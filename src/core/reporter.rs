//! Reporting collaborator injected into each component.
//!
//! Components never touch a global logger directly. They hand every event to
//! a [`Reporter`]; [`TracingReporter`] forwards to `tracing`, and
//! [`MemoryReporter`] keeps events for inspection.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{BatchReport, Event, EventType, RunKind, UnitStatus};

/// Receives run events
pub trait Reporter: Send + Sync {
    fn report(&self, event: Event);
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: Event) {
        let unit = event.unit.as_deref().unwrap_or("-");
        let run_id = event.run_id;

        match event.event_type {
            EventType::RunFailed | EventType::ValidationFailed => {
                let err = event.error.as_deref().unwrap_or_default();
                error!(%run_id, error = %err, "{}", event.summary);
            }
            t if t.is_unit_failure() => {
                let err = event.error.as_deref().unwrap_or_default();
                warn!(%run_id, unit, error = %err, "{}", event.summary);
            }
            EventType::RunStarted | EventType::RunCompleted | EventType::CachePurged => {
                info!(%run_id, "{}", event.summary);
            }
            _ => {
                debug!(%run_id, unit, duration_ms = ?event.duration_ms, "{}", event.summary);
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events reported so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Events of one type
    pub fn events_of_type(&self, event_type: EventType) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

/// Emits the events of one run and keeps its batch report in step
pub(crate) struct RunRecorder {
    reporter: Arc<dyn Reporter>,
    report: BatchReport,
}

impl RunRecorder {
    /// Start a run and emit `RunStarted`
    pub(crate) fn start(reporter: Arc<dyn Reporter>, kind: RunKind, summary: String) -> Self {
        let run_id = Uuid::new_v4();
        reporter.report(Event::new(
            run_id,
            None,
            EventType::RunStarted,
            summary,
            UnitStatus::Running,
        ));
        Self {
            reporter,
            report: BatchReport::new(run_id, kind),
        }
    }

    pub(crate) fn run_id(&self) -> Uuid {
        self.report.run_id
    }

    /// Emit an event that does not change the report
    pub(crate) fn note(&self, unit: Option<String>, event_type: EventType, summary: String) {
        self.reporter.report(Event::new(
            self.run_id(),
            unit,
            event_type,
            summary,
            UnitStatus::Running,
        ));
    }

    /// Record a successful unit
    pub(crate) fn success(
        &mut self,
        unit: String,
        event_type: EventType,
        summary: String,
        duration_ms: u64,
    ) {
        self.reporter.report(
            Event::new(
                self.run_id(),
                Some(unit.clone()),
                event_type,
                summary,
                UnitStatus::Completed,
            )
            .with_duration(duration_ms),
        );
        self.report.record_success(unit);
    }

    /// Record a failed unit
    pub(crate) fn failure(
        &mut self,
        unit: String,
        event_type: EventType,
        summary: String,
        error: String,
    ) {
        self.reporter.report(
            Event::new(
                self.run_id(),
                Some(unit.clone()),
                event_type,
                summary,
                UnitStatus::Failed,
            )
            .with_error(error.clone()),
        );
        self.report.record_failure(unit, error);
    }

    /// Emit `ValidationFailed` for a rejected request
    pub(crate) fn rejected(&mut self, error: String) {
        self.reporter.report(
            Event::new(
                self.run_id(),
                None,
                EventType::ValidationFailed,
                format!("Request rejected: {}", error),
                UnitStatus::Failed,
            )
            .with_error(error.clone()),
        );
        self.report.abort(error);
    }

    /// Emit `RunFailed` and mark the report aborted
    pub(crate) fn abort(&mut self, error: String) {
        self.reporter.report(
            Event::new(
                self.run_id(),
                None,
                EventType::RunFailed,
                format!("Run failed: {}", error),
                UnitStatus::Failed,
            )
            .with_error(error.clone()),
        );
        self.report.abort(error);
    }

    /// Emit `RunCompleted` and return the finished report
    pub(crate) fn finish(mut self, summary: String) -> BatchReport {
        self.report.finish();
        self.reporter.report(Event::new(
            self.run_id(),
            None,
            EventType::RunCompleted,
            summary,
            UnitStatus::Completed,
        ));
        self.report
    }
}
