//! Rescheduling / unavailability request-response shapes (spec §6, C9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::reschedule::RescheduleRequest;
use crate::domain::entities::{JobId, MachineId, ResourceId, ResourceUnavailability, UnavailabilityId};

/// `POST /api/reschedule/unavailability`
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleUnavailabilityRequest {
    pub reason: String,
    #[serde(default)]
    pub affected_resource_ids: Vec<ResourceId>,
    #[serde(default)]
    pub affected_machine_ids: Vec<MachineId>,
    pub unavailability_start: DateTime<Utc>,
    pub unavailability_end: DateTime<Utc>,
    #[serde(default)]
    pub shifts: Vec<u8>,
    #[serde(default)]
    pub force_reschedule: bool,
}

impl From<RescheduleUnavailabilityRequest> for RescheduleRequest {
    fn from(req: RescheduleUnavailabilityRequest) -> Self {
        RescheduleRequest {
            reason: req.reason,
            affected_resource_ids: req.affected_resource_ids,
            affected_machine_ids: req.affected_machine_ids,
            unavailability_start: req.unavailability_start,
            unavailability_end: req.unavailability_end,
            shifts: req.shifts,
            force_reschedule: req.force_reschedule,
        }
    }
}

/// `POST /api/resources/:id/mark-unavailable`
#[derive(Debug, Clone, Deserialize)]
pub struct MarkResourceUnavailableRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_partial_day: bool,
    pub start_time: Option<(u32, u32)>,
    pub end_time: Option<(u32, u32)>,
    pub reason: String,
    #[serde(default)]
    pub affected_shifts: Vec<u8>,
    pub notes: Option<String>,
}

impl MarkResourceUnavailableRequest {
    pub fn into_domain(self, resource_id: ResourceId) -> ResourceUnavailability {
        ResourceUnavailability {
            id: UnavailabilityId::new(),
            resource_id,
            start_date: self.start_date,
            end_date: self.end_date,
            is_partial_day: self.is_partial_day,
            start_time: self.start_time,
            end_time: self.end_time,
            reason: self.reason,
            affected_shifts: self.affected_shifts,
            notes: self.notes,
        }
    }
}

/// `POST /api/resources/bulk-unavailable`
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUnavailableRequest {
    pub resource_ids: Vec<ResourceId>,
    #[serde(flatten)]
    pub unavailability: MarkResourceUnavailableRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescheduleResultResponse {
    pub success: bool,
    pub conflicts_resolved: u32,
    pub jobs_rescheduled: u32,
    pub operations_rescheduled: u32,
    pub unresolvable_conflicts: Vec<JobId>,
    pub warnings: Vec<String>,
    pub summary: String,
}

impl From<&crate::application::use_cases::reschedule::RescheduleResult> for RescheduleResultResponse {
    fn from(result: &crate::application::use_cases::reschedule::RescheduleResult) -> Self {
        RescheduleResultResponse {
            success: result.success,
            conflicts_resolved: result.conflicts_resolved,
            jobs_rescheduled: result.jobs_rescheduled,
            operations_rescheduled: result.operations_rescheduled,
            unresolvable_conflicts: result.unresolvable_conflicts.clone(),
            warnings: result.warnings.clone(),
            summary: result.summary.clone(),
        }
    }
}
