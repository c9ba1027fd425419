//! WebSocket envelope shapes for `/ws` (spec §6).
//!
//! Every frame is `{type, data}`; `data`'s shape depends on `type`. Mirrors
//! the teacher's flat internally-tagged enum idiom used for the HTTP DTOs.

use serde::Serialize;

use crate::application::use_cases::progress::{ScheduleProgressEvent, ScheduleStage};
use crate::domain::entities::{JobId, MachineId};
use crate::presentation::dto::schedule_dto::ScheduleEntryResponse;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsMessage {
    ScheduleProgress(ScheduleProgressData),
    JobAutoScheduled(JobAutoScheduledData),
    RescheduleCompleted(RescheduleCompletedData),
    ResourceMarkedUnavailable(ResourceMarkedUnavailableData),
    MachineUpdated(MachineUpdatedData),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleProgressData {
    pub job_id: JobId,
    pub progress: u8,
    pub status: String,
    pub stage: ScheduleStage,
    pub operation_name: Option<String>,
    pub current_operation: Option<u32>,
    pub total_operations: Option<u32>,
    pub failure_details: Option<Vec<String>>,
}

impl From<&ScheduleProgressEvent> for ScheduleProgressData {
    fn from(event: &ScheduleProgressEvent) -> Self {
        let status = match event.stage {
            ScheduleStage::Initializing => "initializing",
            ScheduleStage::Placing => "placing",
            ScheduleStage::Completed => "completed",
            ScheduleStage::Error => "error",
        }
        .to_string();

        ScheduleProgressData {
            job_id: event.job_id,
            progress: event.progress,
            status,
            stage: event.stage,
            operation_name: event.operation_name.clone(),
            current_operation: event.current_operation,
            total_operations: event.total_operations,
            failure_details: event.failure_details.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobAutoScheduledData {
    pub job_id: JobId,
    pub entries: Vec<ScheduleEntryResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescheduleCompletedData {
    pub jobs_rescheduled: u32,
    pub operations_rescheduled: u32,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceMarkedUnavailableData {
    pub resource_id: crate::domain::entities::ResourceId,
    pub reschedule_triggered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineUpdatedData {
    pub machine_id: MachineId,
}
