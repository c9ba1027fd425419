//! External collaborator records module
//!
//! MaterialOrder and OutsourcedOperation are owned by other systems; the
//! core only reads them to answer the readiness question (C8 step 3a) and
//! to drive the campaign manager (C7). See spec §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::JobId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialOrder {
    pub job_id: JobId,
    pub ready: bool,
    pub expected_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutsourcedOperation {
    pub job_id: JobId,
    pub operation_sequence: u32,
    pub vendor: String,
    pub description: String,
    pub lead_days: u32,
}

/// Answers "is this job ready for scheduling", per spec §7 (MaterialMissing
/// is a warning unless material issues are the only blocker).
pub fn is_job_ready_for_scheduling(material: Option<&MaterialOrder>) -> bool {
    material.map(|m| m.ready).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_material_order_defaults_to_ready() {
        assert!(is_job_ready_for_scheduling(None));
    }

    #[test]
    fn unready_material_blocks_readiness() {
        let material = MaterialOrder {
            job_id: JobId::new(),
            ready: false,
            expected_date: None,
        };
        assert!(!is_job_ready_for_scheduling(Some(&material)));
    }
}
