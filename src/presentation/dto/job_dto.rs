//! Job-facing request/response shapes for the REST surface (spec §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{JobId, MachineId, RoutingOperation};
use crate::domain::value_objects::PriorityBucket;

/// `GET /api/jobs[?includeCompleted]`
#[derive(Debug, Clone, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub include_completed: bool,
}

/// `POST /api/jobs`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub job_number: String,
    pub part_number: String,
    pub customer: String,
    pub quantity: u32,
    pub promised_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub order_date: DateTime<Utc>,
    pub lead_days: u32,
    pub requires_material: bool,
    pub outsource_vendor: Option<String>,
    pub priority: Option<PriorityBucket>,
    pub routing: Vec<RoutingOperation>,
}

/// `PUT /api/jobs/:id` — partial update; absent fields leave the stored job
/// value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub part_number: Option<String>,
    pub customer: Option<String>,
    pub quantity: Option<u32>,
    pub promised_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub lead_days: Option<u32>,
    pub requires_material: Option<bool>,
    pub outsource_vendor: Option<String>,
    pub priority: Option<PriorityBucket>,
    pub routing: Option<Vec<RoutingOperation>>,
}

/// `POST /api/jobs/:id/manual-schedule`
#[derive(Debug, Clone, Deserialize)]
pub struct ManualScheduleRequest {
    pub start_date: DateTime<Utc>,
}

/// `POST /api/jobs/:id/drag-schedule`
#[derive(Debug, Clone, Deserialize)]
pub struct DragScheduleRequest {
    pub machine_id: MachineId,
    pub start_date: DateTime<Utc>,
    pub shift: u8,
}

/// `POST /api/jobs/schedule-all[?maxJobs=N]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleAllQuery {
    pub max_jobs: Option<usize>,
}

/// Failure payload returned alongside a 4xx/5xx from the scheduling
/// endpoints (spec §6: `{failureReason, failureDetails[]}`).
#[derive(Debug, Clone, Serialize)]
pub struct SchedulingFailureBody {
    pub failure_reason: String,
    pub failure_details: Vec<crate::application::errors::OperationFailureDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobIdResponse {
    pub job_id: JobId,
}
