//! Schedule progress reporting module
//!
//! The placement loop in `schedule_job` emits progress through a plain
//! callback trait after each operation, decoupled from the websocket fan-
//! out that ultimately renders it (Design Notes §9: "the target should
//! emit progress events through a channel or callback function the
//! scheduler writes after each operation, decoupled from the placement
//! loop. No suspension inside the inner scan").

use serde::{Deserialize, Serialize};

use crate::domain::entities::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStage {
    Initializing,
    Placing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleProgressEvent {
    pub job_id: JobId,
    /// 0-100.
    pub progress: u8,
    pub stage: ScheduleStage,
    pub operation_name: Option<String>,
    pub current_operation: Option<u32>,
    pub total_operations: Option<u32>,
    pub failure_details: Option<Vec<String>>,
}

/// Sink the placement loop writes progress events to. `web::server` wires
/// an implementation that fans out over the `/ws` channel
/// (`schedule_progress`, spec §6); the CLI wires one that updates an
/// `indicatif` progress bar; tests wire a no-op or a recording sink.
pub trait ScheduleProgressSink {
    fn emit(&self, event: ScheduleProgressEvent);
}

/// Discards every event. Used by batch callers that only care about the
/// final result.
pub struct NullProgressSink;

impl ScheduleProgressSink for NullProgressSink {
    fn emit(&self, _event: ScheduleProgressEvent) {}
}

/// Accumulates events for inspection, used by tests that assert on
/// progress-event ordering/content.
#[derive(Default)]
pub struct RecordingProgressSink {
    events: std::sync::Mutex<Vec<ScheduleProgressEvent>>,
}

impl RecordingProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScheduleProgressEvent> {
        self.events.lock().expect("progress sink mutex poisoned").clone()
    }
}

impl ScheduleProgressSink for RecordingProgressSink {
    fn emit(&self, event: ScheduleProgressEvent) {
        self.events.lock().expect("progress sink mutex poisoned").push(event);
    }
}
