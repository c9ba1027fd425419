//! Scheduling error module
//!
//! `SchedulingError` has one variant per row of spec §7's error-kind
//! table. The core propagates these directly; CLI/web callers wrap them
//! in `anyhow::Error` at the boundary (teacher's `main.rs` pattern: `fn
//! main() -> anyhow::Result<()>`).

use serde::Serialize;

use crate::domain::entities::{JobId, MachineTypeBucket};

/// One attempted-and-failed routing operation, reported back to the
/// caller so a human can see why placement stalled (spec §7:
/// "failureDetails array, one entry per routing operation that was
/// attempted").
#[derive(Debug, Clone, Serialize)]
pub struct OperationFailureDetail {
    pub operation_sequence: u32,
    pub operation_name: String,
    pub machine_type: MachineTypeBucket,
    pub compatible_machines_tried: usize,
    pub attempted_days: i64,
    pub reasons: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("job {job_id} has an empty routing")]
    RoutingEmpty { job_id: JobId },

    #[error("job {job_id} has no compatible machine for one or more operations")]
    NoCompatibleMachine {
        job_id: JobId,
        failure_details: Vec<OperationFailureDetail>,
    },

    #[error("job {job_id} has no qualified operator for one or more operations")]
    NoQualifiedOperator {
        job_id: JobId,
        failure_details: Vec<OperationFailureDetail>,
    },

    #[error("job {job_id} could not be placed within the forward scan window")]
    MachineBookedOut {
        job_id: JobId,
        failure_details: Vec<OperationFailureDetail>,
    },

    #[error("job {job_id} is not ready for scheduling: required material is missing")]
    MaterialMissing { job_id: JobId },

    #[error("conflict for job {job_id} could not be resolved by rescheduling")]
    ConflictUnresolvable { job_id: JobId, reason: String },

    #[error("batch exceeded its wall-clock timeout")]
    Timeout,

    #[error("job {job_id} has an invalid routing: {source}")]
    InvalidRouting {
        job_id: JobId,
        #[source]
        source: crate::domain::entities::RoutingValidationError,
    },

    #[error("storage operation failed")]
    Storage(#[from] anyhow::Error),
}

impl SchedulingError {
    /// The `failureDetails` array the transport layer surfaces alongside
    /// the failure reason (spec §6/§7); empty for variants that carry none.
    pub fn failure_details(&self) -> Vec<OperationFailureDetail> {
        match self {
            SchedulingError::NoCompatibleMachine { failure_details, .. }
            | SchedulingError::NoQualifiedOperator { failure_details, .. }
            | SchedulingError::MachineBookedOut { failure_details, .. } => failure_details.clone(),
            _ => Vec::new(),
        }
    }
}
