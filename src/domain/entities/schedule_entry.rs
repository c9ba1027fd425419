//! Schedule entry entity module
//!
//! A ScheduleEntry is the concrete output of C8/C9: one contiguous chunk of
//! work on one machine by one resource. See spec §3 ("Schedule Entry") for
//! the five invariants enforced elsewhere by C8's chunking loop and by the
//! property tests in spec §8.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{JobId, MachineId, ResourceId, ScheduleEntryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEntryStatus {
    Planned,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ScheduleEntryId,
    pub job_id: JobId,
    /// `None` only for OUTSOURCE operations: an outsourced step has zero
    /// internal machine demand, so the entry is a logical placeholder
    /// (spec §4.8 step 3a).
    pub machine_id: Option<MachineId>,
    /// `None` only for OUTSOURCE operations (spec §3 invariant 1, §8
    /// property 7).
    pub resource_id: Option<ResourceId>,
    pub operation_sequence: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub shift: u8,
    pub status: ScheduleEntryStatus,
}

impl ScheduleEntry {
    pub fn is_outsource_placeholder(&self) -> bool {
        self.machine_id.is_none()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &ScheduleEntry) -> bool {
        self.start < other.end && other.start < self.end
    }
}
