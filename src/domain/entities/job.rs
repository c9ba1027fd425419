//! Job entity module
//!
//! This module defines the Job aggregate: identity, customer/date metadata,
//! and its ordered routing of operations. See spec §3 ("Job", "Routing
//! Operation").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{JobId, MachineId};
use crate::domain::value_objects::PriorityBucket;

/// Lifecycle state of a job (spec §3, "Lifecycle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Unscheduled,
    Scheduled,
    InProgress,
    Complete,
}

/// The semantic machine-type bucket a routing operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineTypeBucket {
    Mill,
    Lathe,
    Saw,
    Waterjet,
    Inspect,
    Outsource,
    Other,
}

impl MachineTypeBucket {
    /// The baseline capability C2's capability-flow table is queried with
    /// for this bucket (spec §4.2). `Other` and `Outsource` carry no
    /// capability-flow requirement: `Other` falls back to the operation's
    /// explicit `compatible_machines` list, `Outsource` is never placed on
    /// a machine at all.
    pub fn base_capability(&self) -> Option<super::machine::Capability> {
        use super::machine::Capability;
        match self {
            MachineTypeBucket::Mill => Some(Capability::VmcMilling),
            MachineTypeBucket::Lathe => Some(Capability::SingleSpindleTurning),
            MachineTypeBucket::Saw => Some(Capability::Sawing),
            MachineTypeBucket::Waterjet => Some(Capability::Waterjet),
            MachineTypeBucket::Inspect => Some(Capability::Inspection),
            MachineTypeBucket::Outsource | MachineTypeBucket::Other => None,
        }
    }
}

/// Derived tag for how an operation is scheduled, instead of branching on
/// strings inside the placement loop (Design Notes §9, "Dynamic dispatch on
/// operation kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingOpKind {
    Production,
    Inspection,
    Outsource,
}

/// One step of a job's routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingOperation {
    pub sequence: u32,
    pub name: String,
    pub machine_type: MachineTypeBucket,
    pub compatible_machines: Vec<MachineId>,
    pub estimated_hours: f64,
    pub setup_hours: Option<f64>,
    pub required_bar_length_ft: Option<f64>,
    pub operation_type: Option<String>,
    pub original_quoted_machine: Option<MachineId>,
    pub substitution_efficiency_impact: Option<f64>,
    pub earliest_start_date: Option<DateTime<Utc>>,
    pub latest_finish_date: Option<DateTime<Utc>>,
    /// Lead days to wait once this (outsourced) operation starts.
    pub lead_days: Option<u32>,
    /// Vendor this operation is outsourced to, if any.
    pub outsource_vendor: Option<String>,
    /// Vendor description/part spec, used by the campaign manager to group
    /// jobs sharing the same outsourced step.
    pub outsource_description: Option<String>,
}

impl RoutingOperation {
    /// Derives the operation's dispatch tag from its machine-type bucket and
    /// `operation_type`, per spec §3: "an operation typed OUTSOURCE
    /// contributes no internal machine/operator time; an operation typed
    /// INSPECT requires an Inspector, never an Operator."
    pub fn kind(&self) -> RoutingOpKind {
        match self.machine_type {
            MachineTypeBucket::Outsource => RoutingOpKind::Outsource,
            MachineTypeBucket::Inspect => RoutingOpKind::Inspection,
            _ => RoutingOpKind::Production,
        }
    }

    /// True if this operation's name or operation_type marks it as a SAW
    /// step (spec §4.5: a saw operation creates a cut billet and forbids
    /// bar-fed machines for the whole job).
    pub fn is_saw(&self) -> bool {
        if self.machine_type == MachineTypeBucket::Saw {
            return true;
        }
        if self
            .operation_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("SAW"))
            .unwrap_or(false)
        {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["saw", "cut", "cutoff", "part off", "sawing"]
            .iter()
            .any(|kw| name.contains(kw))
    }

    pub fn is_waterjet(&self) -> bool {
        self.machine_type == MachineTypeBucket::Waterjet
            || self
                .operation_type
                .as_deref()
                .map(|t| t.eq_ignore_ascii_case("WATERJET"))
                .unwrap_or(false)
    }

    pub fn total_adjusted_hours(&self, efficiency_factor: f64) -> f64 {
        self.estimated_hours / efficiency_factor + self.setup_hours.unwrap_or(0.0)
    }

    /// The specific capability this op needs, one tier more precise than
    /// the bucket base when the op's text names a tier (spec §4.2: mills
    /// `vmc ⊂ pseudo_4th ⊂ true_4th ⊂ 5_axis`, lathes `single_spindle ⊂
    /// live_tooling ⊂ dual_spindle`). Classified by keyword the same way
    /// `is_saw`/`is_waterjet` classify operation text.
    pub fn required_capability(&self) -> Option<super::machine::Capability> {
        use super::machine::Capability;

        let haystack = format!("{} {}", self.operation_type.as_deref().unwrap_or(""), self.name)
            .to_ascii_lowercase();

        match self.machine_type {
            MachineTypeBucket::Mill => Some(
                if haystack.contains("5 axis") || haystack.contains("5-axis") || haystack.contains("five axis") {
                    Capability::FiveAxisMilling
                } else if haystack.contains("true 4th") || haystack.contains("true4th") || haystack.contains("true 4 axis") {
                    Capability::True4thAxisMilling
                } else if haystack.contains("4th axis") || haystack.contains("4-axis") || haystack.contains("pseudo") {
                    Capability::Pseudo4thAxisMilling
                } else {
                    Capability::VmcMilling
                },
            ),
            MachineTypeBucket::Lathe => Some(
                if haystack.contains("dual spindle") || haystack.contains("dual-spindle") {
                    Capability::DualSpindleTurning
                } else if haystack.contains("live tooling") || haystack.contains("live-tooling") {
                    Capability::LiveToolingTurning
                } else {
                    Capability::SingleSpindleTurning
                },
            ),
            _ => self.machine_type.base_capability(),
        }
    }
}

/// A manufacturing job: identity, customer/date metadata, and its routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_number: String,
    pub part_number: String,
    pub customer: String,
    pub quantity: u32,
    pub promised_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub order_date: DateTime<Utc>,
    pub created_date: DateTime<Utc>,
    pub lead_days: u32,
    pub requires_material: bool,
    pub outsource_vendor: Option<String>,
    pub priority: Option<PriorityBucket>,
    pub status: JobStatus,
    pub routing: Vec<RoutingOperation>,
}

/// Errors that can be raised by routing validation (spec §3 invariant:
/// "routing sequences are monotonically non-decreasing and unique per job").
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingValidationError {
    #[error("routing is empty")]
    Empty,
    #[error("duplicate operation sequence {0}")]
    DuplicateSequence(u32),
    #[error("routing sequences are not monotonically non-decreasing")]
    NotMonotonic,
}

impl Job {
    pub fn new(
        job_number: String,
        part_number: String,
        customer: String,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            job_number,
            part_number,
            customer,
            quantity: 1,
            promised_date: created_date,
            due_date: created_date,
            order_date: created_date,
            created_date,
            lead_days: 0,
            requires_material: false,
            outsource_vendor: None,
            priority: None,
            status: JobStatus::Unscheduled,
            routing: Vec::new(),
        }
    }

    /// True if the job number begins with 'S' (the Stock priority marker,
    /// spec §4.6).
    pub fn is_stock(&self) -> bool {
        self.job_number
            .chars()
            .next()
            .map(|c| c.eq_ignore_ascii_case(&'S'))
            .unwrap_or(false)
    }

    /// Sorted view of the routing by sequence number.
    pub fn sorted_routing(&self) -> Vec<&RoutingOperation> {
        let mut ops: Vec<&RoutingOperation> = self.routing.iter().collect();
        ops.sort_by_key(|op| op.sequence);
        ops
    }

    /// Validates the routing invariant from spec §3: sequences must be
    /// present, unique, and monotonically non-decreasing.
    pub fn validate_routing(&self) -> Result<(), RoutingValidationError> {
        if self.routing.is_empty() {
            return Err(RoutingValidationError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        let mut last_seq: Option<u32> = None;
        for op in self.sorted_routing() {
            if !seen.insert(op.sequence) {
                return Err(RoutingValidationError::DuplicateSequence(op.sequence));
            }
            if let Some(last) = last_seq {
                if op.sequence < last {
                    return Err(RoutingValidationError::NotMonotonic);
                }
            }
            last_seq = Some(op.sequence);
        }
        Ok(())
    }

    pub fn touches_lathes(&self) -> bool {
        self.routing
            .iter()
            .any(|op| op.machine_type == MachineTypeBucket::Lathe)
    }

    /// The bar length the job's lathe operations declare, if any (spec
    /// §4.5: "the routing declares `barLength = L`").
    pub fn declared_bar_length_ft(&self) -> Option<f64> {
        self.routing
            .iter()
            .find_map(|op| op.required_bar_length_ft)
    }

    pub fn has_saw_operation(&self) -> bool {
        self.routing.iter().any(|op| op.is_saw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(sequence: u32, machine_type: MachineTypeBucket) -> RoutingOperation {
        RoutingOperation {
            sequence,
            name: "op".to_string(),
            machine_type,
            compatible_machines: vec![],
            estimated_hours: 1.0,
            setup_hours: None,
            required_bar_length_ft: None,
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
    fn empty_routing_is_rejected() {
        let job = Job::new(
            "J1".to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            Utc::now(),
        );
        assert_eq!(job.validate_routing(), Err(RoutingValidationError::Empty));
    }

    #[test]
    fn duplicate_sequence_is_rejected() {
        let mut job = Job::new(
            "J1".to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            Utc::now(),
        );
        job.routing.push(op(10, MachineTypeBucket::Mill));
        job.routing.push(op(10, MachineTypeBucket::Lathe));
        assert_eq!(
            job.validate_routing(),
            Err(RoutingValidationError::DuplicateSequence(10))
        );
    }

    #[test]
    fn valid_routing_is_accepted() {
        let mut job = Job::new(
            "J1".to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            Utc::now(),
        );
        job.routing.push(op(10, MachineTypeBucket::Saw));
        job.routing.push(op(20, MachineTypeBucket::Lathe));
        assert!(job.validate_routing().is_ok());
    }

    #[test]
    fn stock_prefix_is_case_insensitive() {
        let mut job = Job::new(
            "s1000".to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            Utc::now(),
        );
        job.routing.push(op(10, MachineTypeBucket::Mill));
        assert!(job.is_stock());
    }

    #[test]
    fn saw_detection_matches_by_keyword() {
        let mut o = op(10, MachineTypeBucket::Lathe);
        o.name = "Cutoff stock".to_string();
        assert!(o.is_saw());
    }

    #[test]
    fn plain_mill_op_requires_only_vmc() {
        let o = op(10, MachineTypeBucket::Mill);
        assert_eq!(
            o.required_capability(),
            Some(super::super::machine::Capability::VmcMilling)
        );
    }

    #[test]
    fn pseudo_4th_axis_text_requires_pseudo_4th_axis_capability() {
        let mut o = op(10, MachineTypeBucket::Mill);
        o.name = "Pseudo 4th Axis Mill".to_string();
        assert_eq!(
            o.required_capability(),
            Some(super::super::machine::Capability::Pseudo4thAxisMilling)
        );
    }

    #[test]
    fn true_4th_axis_text_requires_true_4th_axis_capability() {
        let mut o = op(10, MachineTypeBucket::Mill);
        o.operation_type = Some("True 4th Axis".to_string());
        assert_eq!(
            o.required_capability(),
            Some(super::super::machine::Capability::True4thAxisMilling)
        );
    }

    #[test]
    fn dual_spindle_text_requires_dual_spindle_capability() {
        let mut o = op(10, MachineTypeBucket::Lathe);
        o.name = "Dual Spindle Turn".to_string();
        assert_eq!(
            o.required_capability(),
            Some(super::super::machine::Capability::DualSpindleTurning)
        );
    }
}
