//! Storage contract module
//!
//! `IStorage` bundles the CRUD surface spec §6 requires of the persistence
//! layer: "The core requires an IStorage with CRUD for jobs, machines,
//! schedule entries, resources, resource-unavailabilities, routing
//! operations, material orders, outsourced operations, plus
//! clearAllScheduleEntries, getScheduleEntriesInDateRange,
//! getJobsRequiringRescheduling." The core never depends on a concrete
//! store; `infrastructure::repositories::in_memory_store` and
//! `infrastructure::persistence::sqlite_store` are the two implementations
//! shipped in this crate.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Job, JobId, MachineId, MaterialOrder, OutsourcedOperation, Resource, ResourceId,
    ResourceUnavailability, ScheduleEntry, UnavailabilityId,
};

#[cfg_attr(test, mockall::automock)]
pub trait IStorage {
    // Jobs
    fn get_job(&self, id: JobId) -> Result<Option<Job>>;
    fn list_jobs(&self, include_completed: bool) -> Result<Vec<Job>>;
    fn put_job(&mut self, job: Job) -> Result<()>;
    fn delete_job(&mut self, id: JobId) -> Result<()>;

    // Machines
    fn get_machine(&self, id: MachineId) -> Result<Option<crate::domain::entities::Machine>>;
    fn list_machines(&self) -> Result<Vec<crate::domain::entities::Machine>>;
    fn put_machine(&mut self, machine: crate::domain::entities::Machine) -> Result<()>;

    // Resources (operators)
    fn list_resources(&self) -> Result<Vec<Resource>>;
    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>>;
    fn put_resource(&mut self, resource: Resource) -> Result<()>;

    // Resource unavailabilities
    fn list_unavailabilities(&self) -> Result<Vec<ResourceUnavailability>>;
    fn put_unavailability(&mut self, unavailability: ResourceUnavailability) -> Result<()>;
    fn delete_unavailability(&mut self, id: UnavailabilityId) -> Result<()>;

    // Schedule entries
    fn list_schedule_entries_for_job(&self, job_id: JobId) -> Result<Vec<ScheduleEntry>>;
    fn put_schedule_entries(&mut self, entries: Vec<ScheduleEntry>) -> Result<()>;
    fn delete_schedule_entries_for_job_from(
        &mut self,
        job_id: JobId,
        from: DateTime<Utc>,
    ) -> Result<()>;
    fn clear_all_schedule_entries(&mut self) -> Result<()>;
    fn schedule_entries_in_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>>;

    // External collaborators (read-only from the core's perspective)
    fn get_material_order(&self, job_id: JobId) -> Result<Option<MaterialOrder>>;
    fn list_outsourced_operations(&self) -> Result<Vec<OutsourcedOperation>>;

    /// Jobs with at least one schedule entry overlapping `[start, end]` on a
    /// machine or resource in the affected sets, restricted to `shifts`.
    /// Backs C9's conflict detection (spec §4.9).
    fn jobs_requiring_rescheduling(
        &self,
        resource_ids: &[ResourceId],
        machine_ids: &[MachineId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        shifts: &[u8],
    ) -> Result<Vec<JobId>>;
}
