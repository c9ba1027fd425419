//! In-memory IStorage implementation
//!
//! HashMap-backed store for testing and the CLI's batch snapshot mode,
//! grounded in the teacher's `InMemoryJobRepository` pattern (a single
//! struct, one HashMap per collection, no persistence between runs).

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Job, JobId, Machine, MachineId, MaterialOrder, OutsourcedOperation, Resource, ResourceId,
    ResourceUnavailability, ScheduleEntry, UnavailabilityId,
};
use crate::domain::repositories::IStorage;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    jobs: HashMap<JobId, Job>,
    machines: HashMap<MachineId, Machine>,
    resources: HashMap<ResourceId, Resource>,
    unavailabilities: HashMap<UnavailabilityId, ResourceUnavailability>,
    schedule_entries: Vec<ScheduleEntry>,
    material_orders: HashMap<JobId, MaterialOrder>,
    outsourced_operations: Vec<OutsourcedOperation>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material_orders(mut self, orders: Vec<MaterialOrder>) -> Self {
        self.material_orders = orders.into_iter().map(|m| (m.job_id, m)).collect();
        self
    }

    pub fn with_outsourced_operations(mut self, ops: Vec<OutsourcedOperation>) -> Self {
        self.outsourced_operations = ops;
        self
    }
}

impl IStorage for InMemoryStore {
    fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        Ok(self.jobs.get(&id).cloned())
    }

    fn list_jobs(&self, include_completed: bool) -> Result<Vec<Job>> {
        Ok(self
            .jobs
            .values()
            .filter(|j| include_completed || j.status != crate::domain::entities::JobStatus::Complete)
            .cloned()
            .collect())
    }

    fn put_job(&mut self, job: Job) -> Result<()> {
        self.jobs.insert(job.id, job);
        Ok(())
    }

    fn delete_job(&mut self, id: JobId) -> Result<()> {
        self.jobs.remove(&id);
        Ok(())
    }

    fn get_machine(&self, id: MachineId) -> Result<Option<Machine>> {
        Ok(self.machines.get(&id).cloned())
    }

    fn list_machines(&self) -> Result<Vec<Machine>> {
        Ok(self.machines.values().cloned().collect())
    }

    fn put_machine(&mut self, machine: Machine) -> Result<()> {
        self.machines.insert(machine.id, machine);
        Ok(())
    }

    fn list_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.resources.values().cloned().collect())
    }

    fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>> {
        Ok(self.resources.get(&id).cloned())
    }

    fn put_resource(&mut self, resource: Resource) -> Result<()> {
        self.resources.insert(resource.id, resource);
        Ok(())
    }

    fn list_unavailabilities(&self) -> Result<Vec<ResourceUnavailability>> {
        Ok(self.unavailabilities.values().cloned().collect())
    }

    fn put_unavailability(&mut self, unavailability: ResourceUnavailability) -> Result<()> {
        self.unavailabilities.insert(unavailability.id, unavailability);
        Ok(())
    }

    fn delete_unavailability(&mut self, id: UnavailabilityId) -> Result<()> {
        self.unavailabilities.remove(&id);
        Ok(())
    }

    fn list_schedule_entries_for_job(&self, job_id: JobId) -> Result<Vec<ScheduleEntry>> {
        Ok(self
            .schedule_entries
            .iter()
            .filter(|e| e.job_id == job_id)
            .cloned()
            .collect())
    }

    fn put_schedule_entries(&mut self, entries: Vec<ScheduleEntry>) -> Result<()> {
        self.schedule_entries.extend(entries);
        Ok(())
    }

    fn delete_schedule_entries_for_job_from(&mut self, job_id: JobId, from: DateTime<Utc>) -> Result<()> {
        self.schedule_entries
            .retain(|e| !(e.job_id == job_id && e.start >= from));
        Ok(())
    }

    fn clear_all_schedule_entries(&mut self) -> Result<()> {
        self.schedule_entries.clear();
        Ok(())
    }

    fn schedule_entries_in_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<ScheduleEntry>> {
        Ok(self
            .schedule_entries
            .iter()
            .filter(|e| e.start < end && start < e.end)
            .cloned()
            .collect())
    }

    fn get_material_order(&self, job_id: JobId) -> Result<Option<MaterialOrder>> {
        Ok(self.material_orders.get(&job_id).cloned())
    }

    fn list_outsourced_operations(&self) -> Result<Vec<OutsourcedOperation>> {
        Ok(self.outsourced_operations.clone())
    }

    fn jobs_requiring_rescheduling(
        &self,
        resource_ids: &[ResourceId],
        machine_ids: &[MachineId],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        shifts: &[u8],
    ) -> Result<Vec<JobId>> {
        let mut ids: Vec<JobId> = self
            .schedule_entries
            .iter()
            .filter(|e| e.start < end && start < e.end)
            .filter(|e| shifts.is_empty() || shifts.contains(&e.shift))
            .filter(|e| {
                e.resource_id.map(|r| resource_ids.contains(&r)).unwrap_or(false)
                    || e.machine_id.map(|m| machine_ids.contains(&m)).unwrap_or(false)
            })
            .map(|e| e.job_id)
            .collect();
        ids.sort_by_key(|id| id.as_uuid());
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job() -> Job {
        Job::new(
            "J1".to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn put_then_get_round_trips_a_job() {
        let mut store = InMemoryStore::new();
        let job = job();
        let id = job.id;
        store.put_job(job).unwrap();
        assert!(store.get_job(id).unwrap().is_some());
    }

    #[test]
    fn deleting_from_date_keeps_earlier_entries() {
        let mut store = InMemoryStore::new();
        let job_id = JobId::new();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let early = crate::domain::entities::ScheduleEntry {
            id: crate::domain::entities::ScheduleEntryId::new(),
            job_id,
            machine_id: Some(MachineId::new()),
            resource_id: Some(ResourceId::new()),
            operation_sequence: 10,
            start: t0,
            end: t0 + chrono::Duration::hours(4),
            shift: 1,
            status: crate::domain::entities::ScheduleEntryStatus::Planned,
        };
        let mut late = early.clone();
        late.start = t0 + chrono::Duration::days(1);
        late.end = late.start + chrono::Duration::hours(4);

        store.put_schedule_entries(vec![early, late]).unwrap();
        store
            .delete_schedule_entries_for_job_from(job_id, t0 + chrono::Duration::hours(1))
            .unwrap();

        let remaining = store.list_schedule_entries_for_job(job_id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].start, t0);
    }

    #[test]
    fn jobs_requiring_rescheduling_matches_affected_machine() {
        let mut store = InMemoryStore::new();
        let job_id = JobId::new();
        let machine_id = MachineId::new();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let entry = crate::domain::entities::ScheduleEntry {
            id: crate::domain::entities::ScheduleEntryId::new(),
            job_id,
            machine_id: Some(machine_id),
            resource_id: None,
            operation_sequence: 10,
            start: t0,
            end: t0 + chrono::Duration::hours(4),
            shift: 1,
            status: crate::domain::entities::ScheduleEntryStatus::Planned,
        };
        store.put_schedule_entries(vec![entry]).unwrap();

        let affected = store
            .jobs_requiring_rescheduling(&[], &[machine_id], t0, t0 + chrono::Duration::hours(1), &[1])
            .unwrap();
        assert_eq!(affected, vec![job_id]);
    }
}
