//! Schedule-entry response shapes for the REST surface (spec §6).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{JobId, MachineId, ResourceId, ScheduleEntryId, ScheduleEntryStatus};

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntryResponse {
    pub id: ScheduleEntryId,
    pub job_id: JobId,
    pub machine_id: Option<MachineId>,
    pub resource_id: Option<ResourceId>,
    pub operation_sequence: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub shift: u8,
    pub status: ScheduleEntryStatus,
}

impl From<&crate::domain::entities::ScheduleEntry> for ScheduleEntryResponse {
    fn from(entry: &crate::domain::entities::ScheduleEntry) -> Self {
        ScheduleEntryResponse {
            id: entry.id,
            job_id: entry.job_id,
            machine_id: entry.machine_id,
            resource_id: entry.resource_id,
            operation_sequence: entry.operation_sequence,
            start: entry.start,
            end: entry.end,
            shift: entry.shift,
            status: entry.status,
        }
    }
}

/// `POST /api/jobs/:id/auto-schedule`, `.../manual-schedule`,
/// `.../drag-schedule` success body.
#[derive(Debug, Clone, Serialize)]
pub struct JobScheduledResponse {
    pub job_id: JobId,
    pub entries: Vec<ScheduleEntryResponse>,
}

/// `POST /api/jobs/schedule-all` success body.
#[derive(Debug, Clone, Serialize)]
pub struct BatchScheduleResponse {
    pub scheduled: Vec<JobScheduledResponse>,
    pub failed: Vec<BatchFailureEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailureEntry {
    pub job_id: JobId,
    pub reason: String,
}

impl From<&crate::application::use_cases::schedule_batch::BatchResult> for BatchScheduleResponse {
    fn from(result: &crate::application::use_cases::schedule_batch::BatchResult) -> Self {
        BatchScheduleResponse {
            scheduled: result
                .scheduled
                .iter()
                .map(|outcome| JobScheduledResponse {
                    job_id: outcome.job_id,
                    entries: outcome.entries.iter().map(ScheduleEntryResponse::from).collect(),
                })
                .collect(),
            failed: result
                .failed
                .iter()
                .map(|failure| BatchFailureEntry {
                    job_id: failure.job_id,
                    reason: failure.reason.clone(),
                })
                .collect(),
        }
    }
}
