//! Bar-Feeder Policy service module (C5)
//!
//! Validates lathe selection and substitution for bar-fed jobs (spec
//! §4.5). A saw operation anywhere in the routing forbids bar-fed
//! machines for the whole job; otherwise a declared bar length demands a
//! feeder at least that long, and downgrades are forbidden.

use crate::domain::entities::{Job, Machine};

#[derive(Debug, Clone, PartialEq)]
pub enum BarFeederViolation {
    /// The job has a saw operation; `machine` is bar-fed and therefore
    /// disqualified entirely.
    SawForbidsBarFeeder { machine_human_id: String },
    /// The job declares a bar length but `machine` has no bar feeder.
    MissingBarFeeder { machine_human_id: String },
    /// The job's declared bar length exceeds what `machine`'s feeder
    /// supports (a downgrade, spec §4.5: "no downgrade").
    BarLengthTooShort {
        machine_human_id: String,
        required_ft: f64,
        available_ft: f64,
    },
}

#[derive(Debug, Clone)]
pub struct BarFeederVerdict {
    pub allowed: bool,
    pub violations: Vec<BarFeederViolation>,
}

/// Evaluates whether `machine` may host this job's lathe work, per spec
/// §4.5.
pub fn evaluate(job: &Job, machine: &Machine) -> BarFeederVerdict {
    let mut violations = Vec::new();
    let lathe = machine.lathe.unwrap_or_default();

    if job.has_saw_operation() {
        if lathe.bar_feeder {
            violations.push(BarFeederViolation::SawForbidsBarFeeder {
                machine_human_id: machine.human_id.clone(),
            });
        }
        return BarFeederVerdict {
            allowed: violations.is_empty(),
            violations,
        };
    }

    if let Some(required_ft) = job.declared_bar_length_ft() {
        if !lathe.bar_feeder {
            violations.push(BarFeederViolation::MissingBarFeeder {
                machine_human_id: machine.human_id.clone(),
            });
        } else {
            let available_ft = lathe.bar_length_ft.unwrap_or(0.0);
            if available_ft < required_ft {
                violations.push(BarFeederViolation::BarLengthTooShort {
                    machine_human_id: machine.human_id.clone(),
                    required_ft,
                    available_ft,
                });
            }
        }
    }

    BarFeederVerdict {
        allowed: violations.is_empty(),
        violations,
    }
}

/// Filters a candidate list down to machines that pass the bar-feeder
/// policy, and returns the rejected set as alternatives-with-reasons for
/// the caller's failure detail (spec §4.5: "a structured verdict with the
/// violation list and a set of alternative machines").
pub fn filter_candidates<'a>(
    job: &Job,
    candidates: &[&'a Machine],
) -> (Vec<&'a Machine>, Vec<(&'a Machine, BarFeederVerdict)>) {
    let mut allowed = Vec::new();
    let mut rejected = Vec::new();
    for &machine in candidates {
        let verdict = evaluate(job, machine);
        if verdict.allowed {
            allowed.push(machine);
        } else {
            rejected.push((machine, verdict));
        }
    }
    (allowed, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        JobStatus, LatheFlags, MachineAvailabilityState, MachineId, MachineTier, MachineType,
        MachineTypeBucket, RoutingOperation,
    };
    use crate::domain::value_objects::ShiftSet;
    use chrono::Utc;

    fn lathe(human_id: &str, bar_feeder: bool, bar_length_ft: Option<f64>) -> Machine {
        Machine {
            id: MachineId::new(),
            human_id: human_id.to_string(),
            display_name: human_id.to_string(),
            machine_type: MachineType::Lathe,
            category: "Lathe".to_string(),
            subcategory: None,
            tier: MachineTier::Standard,
            capabilities: vec![],
            availability: MachineAvailabilityState::Available,
            shifts: ShiftSet::from([1, 2]),
            efficiency_factor: 1.0,
            substitution_group: None,
            lathe: Some(LatheFlags {
                dual_spindle: false,
                live_tooling: false,
                bar_feeder,
                bar_length_ft,
            }),
            mill: None,
            utilization_pct: 0.0,
        }
    }

    fn job_with_ops(ops: Vec<RoutingOperation>) -> Job {
        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), Utc::now());
        job.routing = ops;
        job.status = JobStatus::Unscheduled;
        job
    }

    fn op(sequence: u32, machine_type: MachineTypeBucket, bar_length: Option<f64>) -> RoutingOperation {
        RoutingOperation {
            sequence,
            name: "op".to_string(),
            machine_type,
            compatible_machines: vec![],
            estimated_hours: 1.0,
            setup_hours: None,
            required_bar_length_ft: bar_length,
            operation_type: None,
            original_quoted_machine: None,
            substitution_efficiency_impact: None,
            earliest_start_date: None,
            latest_finish_date: None,
            lead_days: None,
            outsource_vendor: None,
            outsource_description: None,
        }
    }

    #[test]
    fn saw_operation_forbids_bar_fed_lathe() {
        let job = job_with_ops(vec![
            op(10, MachineTypeBucket::Saw, None),
            op(20, MachineTypeBucket::Lathe, None),
        ]);
        let machine = lathe("LATHE-001", true, Some(12.0));
        let verdict = evaluate(&job, &machine);
        assert!(!verdict.allowed);
        assert!(matches!(
            verdict.violations[0],
            BarFeederViolation::SawForbidsBarFeeder { .. }
        ));
    }

    #[test]
    fn saw_operation_permits_non_bar_fed_lathe() {
        let job = job_with_ops(vec![
            op(10, MachineTypeBucket::Saw, None),
            op(20, MachineTypeBucket::Lathe, None),
        ]);
        let machine = lathe("LATHE-003", false, None);
        let verdict = evaluate(&job, &machine);
        assert!(verdict.allowed);
    }

    #[test]
    fn twelve_foot_job_refused_on_six_foot_feeder() {
        let job = job_with_ops(vec![op(10, MachineTypeBucket::Lathe, Some(12.0))]);
        let machine = lathe("LATHE-002", true, Some(6.0));
        let verdict = evaluate(&job, &machine);
        assert!(!verdict.allowed);
        assert!(matches!(
            verdict.violations[0],
            BarFeederViolation::BarLengthTooShort { .. }
        ));
    }

    #[test]
    fn bar_fed_job_accepted_on_longer_feeder() {
        let job = job_with_ops(vec![op(10, MachineTypeBucket::Lathe, Some(6.0))]);
        let machine = lathe("LATHE-001", true, Some(12.0));
        let verdict = evaluate(&job, &machine);
        assert!(verdict.allowed);
    }
}
