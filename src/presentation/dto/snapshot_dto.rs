//! On-disk scheduling snapshot shape read by the CLI's batch driver.
//!
//! Mirrors the inputs `SchedulerContext::new` and the use cases take
//! directly; the CLI shell has no database, so it loads this file in
//! place of the web shell's `SqliteStore` snapshot queries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    Job, JobId, Machine, MaterialOrder, Resource, ResourceUnavailability, ScheduleEntry,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulingSnapshot {
    pub jobs: Vec<Job>,
    pub machines: Vec<Machine>,
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub unavailabilities: Vec<ResourceUnavailability>,
    #[serde(default)]
    pub existing_entries: Vec<ScheduleEntry>,
    #[serde(default)]
    pub material_orders: Vec<MaterialOrder>,
}

impl SchedulingSnapshot {
    pub fn material_orders_by_job(&self) -> HashMap<JobId, MaterialOrder> {
        self.material_orders.iter().map(|m| (m.job_id, m.clone())).collect()
    }
}
