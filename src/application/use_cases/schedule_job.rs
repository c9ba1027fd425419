//! Job Scheduler use case module (C8) — the heart
//!
//! Places one job's routing across machines and operators, chunking
//! across shift boundaries (spec §4.8). The placement loop is pure
//! synchronous computation over an in-memory snapshot (spec §5:
//! "Suspension points: none inside findNextAvailableChunk"); progress is
//! reported through `ScheduleProgressSink` rather than async callbacks
//! (Design Notes §9).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::application::context::SchedulerContext;
use crate::application::errors::{OperationFailureDetail, SchedulingError};
use crate::application::services::Campaign;
use crate::application::use_cases::progress::{ScheduleProgressEvent, ScheduleProgressSink, ScheduleStage};
use crate::domain::entities::{
    is_job_ready_for_scheduling, Capability, Job, JobId, Machine, MachineId, MaterialOrder,
    ResourceId, ResourceRole, RoutingOpKind, RoutingOperation, ScheduleEntry, ScheduleEntryId,
    ScheduleEntryStatus,
};
use crate::domain::value_objects::shift_set_contains;

/// Planning-horizon lead before a freshly created job's first operation
/// may start (spec §4.8 step 2: "a 7-day planning horizon before first
/// work").
const DEFAULT_PLANNING_LEAD_DAYS: i64 = 7;

struct ChunkPlan {
    machine_id: MachineId,
    resource_id: Option<ResourceId>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shift: u8,
}

/// Places jobs against a `SchedulerContext`, maintaining the in-batch lock
/// maps spec §5 describes: `machineLocksUntil` / `resourceLocksUntil`,
/// refreshed as entries are produced and consulted by every later job in
/// the same batch.
pub struct JobScheduler<'a> {
    context: &'a mut SchedulerContext,
    machine_locks_until: HashMap<MachineId, DateTime<Utc>>,
    resource_locks_until: HashMap<ResourceId, DateTime<Utc>>,
}

impl<'a> JobScheduler<'a> {
    pub fn new(context: &'a mut SchedulerContext, existing_entries: &[ScheduleEntry]) -> Self {
        let mut machine_locks_until = HashMap::new();
        let mut resource_locks_until = HashMap::new();
        for entry in existing_entries {
            if let Some(machine_id) = entry.machine_id {
                let slot = machine_locks_until.entry(machine_id).or_insert(entry.end);
                if entry.end > *slot {
                    *slot = entry.end;
                }
            }
            if let Some(resource_id) = entry.resource_id {
                let slot = resource_locks_until.entry(resource_id).or_insert(entry.end);
                if entry.end > *slot {
                    *slot = entry.end;
                }
            }
        }
        Self {
            context,
            machine_locks_until,
            resource_locks_until,
        }
    }

    /// spec §4.8 `scheduleJob(jobId, scheduleAfter=now)`.
    pub fn schedule_job(
        &mut self,
        job: &Job,
        schedule_after: Option<DateTime<Utc>>,
        material: Option<&MaterialOrder>,
        campaigns: &[Campaign],
        progress: &dyn ScheduleProgressSink,
    ) -> Result<Vec<ScheduleEntry>, SchedulingError> {
        progress.emit(ScheduleProgressEvent {
            job_id: job.id,
            progress: 0,
            stage: ScheduleStage::Initializing,
            operation_name: None,
            current_operation: None,
            total_operations: None,
            failure_details: None,
        });

        if job.routing.is_empty() {
            return Err(SchedulingError::RoutingEmpty { job_id: job.id });
        }
        job.validate_routing()
            .map_err(|source| SchedulingError::InvalidRouting { job_id: job.id, source })?;

        if !is_job_ready_for_scheduling(material) {
            return Err(SchedulingError::MaterialMissing { job_id: job.id });
        }

        let now = Utc::now();
        let mut boundary = schedule_after
            .unwrap_or_else(|| now.max(job.created_date + Duration::days(DEFAULT_PLANNING_LEAD_DAYS)));

        let sorted_routing = job.sorted_routing();
        let total_operations = sorted_routing.len() as u32;
        let mut entries: Vec<ScheduleEntry> = Vec::new();
        let campaign_ship_date = campaigns
            .iter()
            .find(|c| c.jobs.contains(&job.id))
            .map(|c| c.ship_date);

        for (index, op) in sorted_routing.iter().enumerate() {
            progress.emit(ScheduleProgressEvent {
                job_id: job.id,
                progress: ((index as f64 / total_operations as f64) * 100.0) as u8,
                stage: ScheduleStage::Placing,
                operation_name: Some(op.name.clone()),
                current_operation: Some(index as u32 + 1),
                total_operations: Some(total_operations),
                failure_details: None,
            });

            match op.kind() {
                RoutingOpKind::Outsource => {
                    let lead = op.lead_days.unwrap_or(0);
                    let mut next_boundary = boundary + Duration::days(lead as i64);
                    if let Some(ship_date) = campaign_ship_date {
                        next_boundary = next_boundary.max(ship_date);
                    }
                    entries.push(ScheduleEntry {
                        id: ScheduleEntryId::new(),
                        job_id: job.id,
                        machine_id: None,
                        resource_id: None,
                        operation_sequence: op.sequence,
                        start: boundary,
                        end: next_boundary,
                        shift: self
                            .context
                            .calendar
                            .shift_number_at(boundary)
                            .map(|s| s.number())
                            .unwrap_or(1),
                        status: ScheduleEntryStatus::Planned,
                    });
                    boundary = next_boundary;
                    continue;
                }
                RoutingOpKind::Inspection | RoutingOpKind::Production => {
                    let required_role = if op.kind() == RoutingOpKind::Inspection {
                        ResourceRole::QualityInspector
                    } else {
                        ResourceRole::Operator
                    };

                    let candidates = self.candidate_machines(job, op);
                    if candidates.is_empty() {
                        return Err(SchedulingError::NoCompatibleMachine {
                            job_id: job.id,
                            failure_details: vec![failure_detail(op, 0, 0, vec![
                                "no compatible machine after capability-flow and bar-feeder filtering".to_string(),
                            ])],
                        });
                    }

                    let placed = self.place_operation(
                        job.id,
                        op,
                        &candidates,
                        boundary,
                        required_role,
                    )?;

                    let op_end = placed
                        .iter()
                        .map(|e| e.end)
                        .max()
                        .expect("place_operation returns at least one chunk");
                    entries.extend(placed);

                    boundary = if op.is_saw() || op.is_waterjet() {
                        self.context.calendar.next_start_of_day(op_end)
                    } else {
                        op_end
                    };
                }
            }
        }

        for entry in &entries {
            if let Some(machine_id) = entry.machine_id {
                let slot = self.machine_locks_until.entry(machine_id).or_insert(entry.end);
                if entry.end > *slot {
                    *slot = entry.end;
                }
            }
            if let Some(resource_id) = entry.resource_id {
                let slot = self.resource_locks_until.entry(resource_id).or_insert(entry.end);
                if entry.end > *slot {
                    *slot = entry.end;
                }
            }
        }

        progress.emit(ScheduleProgressEvent {
            job_id: job.id,
            progress: 100,
            stage: ScheduleStage::Completed,
            operation_name: None,
            current_operation: Some(total_operations),
            total_operations: Some(total_operations),
            failure_details: None,
        });

        Ok(entries)
    }

    fn candidate_machines(&self, job: &Job, op: &RoutingOperation) -> Vec<Machine> {
        let required = op.required_capability();
        let mut candidates: Vec<Machine> = match required {
            Some(capability) => self
                .context
                .machines
                .compatible_machines(capability, None, None)
                .into_iter()
                .cloned()
                .collect(),
            None => op
                .compatible_machines
                .iter()
                .filter_map(|id| self.context.machines.by_id(*id))
                .cloned()
                .collect(),
        };

        // spec §4.2: "dual_spindle jobs require subcategory = Live Tooling
        // Lathes" — the flow table alone can't express a subcategory gate.
        if required == Some(Capability::DualSpindleTurning) {
            candidates.retain(|m| m.subcategory.as_deref() == Some("Live Tooling Lathes"));
        }

        if job.touches_lathes() {
            let refs: Vec<&Machine> = candidates.iter().collect();
            let (allowed, _rejected) =
                crate::application::services::bar_feeder_policy::filter_candidates(job, &refs);
            let allowed_ids: Vec<MachineId> = allowed.iter().map(|m| m.id).collect();
            candidates.retain(|m| allowed_ids.contains(&m.id));
        }

        candidates
    }

    /// spec §4.8 step f: the chunking loop. Places one operation,
    /// returning every chunk produced.
    fn place_operation(
        &mut self,
        job_id: JobId,
        op: &RoutingOperation,
        candidates: &[Machine],
        boundary: DateTime<Utc>,
        required_role: ResourceRole,
    ) -> Result<Vec<ScheduleEntry>, SchedulingError> {
        let mut cursor = boundary.max(op.earliest_start_date.unwrap_or(boundary));
        let mut locked_machine: Option<MachineId> = None;
        let mut locked_resource: Option<ResourceId> = None;
        let mut remaining_hours: Option<f64> = None;
        let mut chunks: Vec<ScheduleEntry> = Vec::new();
        let max_days = self.context.config.max_chunk_scan_days;
        let mut days_scanned: i64 = 0;

        loop {
            let plan = self.find_next_available_chunk(
                op,
                candidates,
                cursor,
                locked_machine,
                locked_resource,
                required_role,
                remaining_hours,
                max_days,
                &mut days_scanned,
            );

            let Some(plan) = plan else {
                return Err(SchedulingError::MachineBookedOut {
                    job_id,
                    failure_details: vec![failure_detail(
                        op,
                        candidates.len(),
                        days_scanned,
                        vec!["forward scan exhausted without a qualified operator/machine pairing".to_string()],
                    )],
                });
            };

            if remaining_hours.is_none() {
                let machine = candidates
                    .iter()
                    .find(|m| m.id == plan.machine_id)
                    .expect("plan machine is one of the candidates");
                remaining_hours = Some(op.total_adjusted_hours(machine.efficiency_factor));
                locked_machine = Some(plan.machine_id);
                locked_resource = plan.resource_id;
            }

            let chunk_hours = (plan.end - plan.start).num_minutes() as f64 / 60.0;
            remaining_hours = remaining_hours.map(|h| (h - chunk_hours).max(0.0));

            chunks.push(ScheduleEntry {
                id: ScheduleEntryId::new(),
                job_id,
                machine_id: Some(plan.machine_id),
                resource_id: plan.resource_id,
                operation_sequence: op.sequence,
                start: plan.start,
                end: plan.end,
                shift: plan.shift,
                status: ScheduleEntryStatus::Planned,
            });

            cursor = plan.end;
            if remaining_hours.unwrap_or(0.0) <= f64::EPSILON {
                return Ok(chunks);
            }
        }
    }

    /// spec §4.8 `findNextAvailableChunk`.
    #[allow(clippy::too_many_arguments)]
    fn find_next_available_chunk(
        &self,
        op: &RoutingOperation,
        candidates: &[Machine],
        cursor: DateTime<Utc>,
        locked_machine: Option<MachineId>,
        locked_resource: Option<ResourceId>,
        required_role: ResourceRole,
        remaining_hours: Option<f64>,
        max_days: i64,
        days_scanned: &mut i64,
    ) -> Option<ChunkPlan> {
        let preferred_shift = self.context.capacity.optimal_shift();
        let mut day_cursor = cursor;

        while *days_scanned <= max_days {
            for shift in [preferred_shift, preferred_shift.other()] {
                let shift_window = self.context.calendar.shift_window(day_cursor, shift);
                let window_start = shift_window.start.max(day_cursor);
                if window_start >= shift_window.end {
                    continue;
                }

                let mut machine_pool: Vec<&Machine> = match locked_machine {
                    Some(id) => candidates.iter().filter(|m| m.id == id).collect(),
                    None => candidates.iter().collect(),
                };
                machine_pool.retain(|m| shift_set_contains(&m.shifts, shift));
                order_candidates_by_score(&mut machine_pool, op);

                for machine in machine_pool {
                    let machine_free_at = self
                        .machine_locks_until
                        .get(&machine.id)
                        .copied()
                        .unwrap_or(DateTime::<Utc>::MIN_UTC);
                    if machine_free_at > window_start {
                        continue;
                    }

                    let mut resource_pool: Vec<ResourceId> = if let Some(resource_id) = locked_resource {
                        vec![resource_id]
                    } else {
                        self.context
                            .operators
                            .available_operators(window_start, shift.number(), Some(required_role), Some(machine.id))
                            .into_iter()
                            .map(|r| r.id)
                            .collect()
                    };
                    resource_pool.sort_by_key(|id| id.as_uuid());

                    for resource_id in resource_pool {
                        let resource_free_at = self
                            .resource_locks_until
                            .get(&resource_id)
                            .copied()
                            .unwrap_or(DateTime::<Utc>::MIN_UTC);
                        if resource_free_at > window_start {
                            continue;
                        }
                        if !self.context.operators.is_available(resource_id, window_start, Some(shift.number())) {
                            continue;
                        }
                        let Some(working_window) = self.context.operators.working_window(resource_id, window_start)
                        else {
                            continue;
                        };
                        let chunk_start = window_start.max(working_window.start);
                        let chunk_cap = shift_window.end.min(working_window.end);
                        if chunk_start >= chunk_cap {
                            continue;
                        }

                        let remaining = remaining_hours.unwrap_or_else(|| op.total_adjusted_hours(machine.efficiency_factor));
                        let remaining_duration = Duration::minutes((remaining * 60.0).ceil() as i64);
                        let chunk_end = chunk_cap.min(chunk_start + remaining_duration);

                        return Some(ChunkPlan {
                            machine_id: machine.id,
                            resource_id: Some(resource_id),
                            start: chunk_start,
                            end: chunk_end,
                            shift: shift.number(),
                        });
                    }
                }
            }

            day_cursor = self.context.calendar.round_to_shift_start(
                self.context.calendar.next_start_of_day(day_cursor),
            );
            *days_scanned += 1;
        }

        None
    }
}

/// Machine-selection scoring from spec §4.8: `score = (100 - utilization)
/// + tierScore + 20*efficiencyFactor + 15*exactMatchBonus`. Highest score
/// wins; ties broken by machine id.
fn order_candidates_by_score(machines: &mut [&Machine], op: &RoutingOperation) {
    machines.sort_by(|a, b| {
        score(b, op)
            .partial_cmp(&score(a, op))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
    });
}

fn score(machine: &Machine, op: &RoutingOperation) -> f64 {
    let exact_match_bonus = if op.compatible_machines.contains(&machine.id) {
        15.0
    } else {
        0.0
    };
    (100.0 - machine.utilization_pct) + machine.tier.score() + 20.0 * machine.efficiency_factor + exact_match_bonus
}

fn failure_detail(
    op: &RoutingOperation,
    compatible_machines_tried: usize,
    attempted_days: i64,
    reasons: Vec<String>,
) -> OperationFailureDetail {
    OperationFailureDetail {
        operation_sequence: op.sequence,
        operation_name: op.name.clone(),
        machine_type: op.machine_type,
        compatible_machines_tried,
        attempted_days,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::SchedulerConfig;
    use crate::application::use_cases::progress::NullProgressSink;
    use crate::domain::entities::{
        DaySchedule, JobStatus, MachineAvailabilityState, MachineTier, MachineType,
        MachineTypeBucket, Resource, ResourceRole as Role, WeeklyWorkSchedule,
    };
    use crate::domain::value_objects::ShiftSet;
    use chrono::TimeZone;

    fn monday(hour: u32) -> DateTime<Utc> {
        chrono_tz::America::Chicago
            .with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn full_week_schedule(start: (u32, u32), end: (u32, u32)) -> WeeklyWorkSchedule {
        let mut schedule = WeeklyWorkSchedule::new();
        for day in [
            chrono::Weekday::Mon,
            chrono::Weekday::Tue,
            chrono::Weekday::Wed,
            chrono::Weekday::Thu,
            chrono::Weekday::Fri,
        ] {
            schedule.insert(day, DaySchedule { enabled: true, start, end });
        }
        schedule
    }

    fn mill(human_id: &str, efficiency: f64, tier: MachineTier, utilization: f64) -> Machine {
        Machine {
            id: MachineId::new(),
            human_id: human_id.to_string(),
            display_name: human_id.to_string(),
            machine_type: MachineType::Mill,
            category: "VMC".to_string(),
            subcategory: None,
            tier,
            capabilities: vec![crate::domain::entities::Capability::VmcMilling],
            availability: MachineAvailabilityState::Available,
            shifts: ShiftSet::from([1, 2]),
            efficiency_factor: efficiency,
            substitution_group: None,
            lathe: None,
            mill: None,
            utilization_pct: utilization,
        }
    }

    fn operator(work_centers: Vec<MachineId>) -> Resource {
        Resource {
            id: ResourceId::new(),
            employee_id: "E1".to_string(),
            display_name: "O1".to_string(),
            role: Role::Operator,
            work_centers,
            skills: vec![],
            shift_schedule: ShiftSet::from([1]),
            active: true,
            work_schedule: full_week_schedule((6, 0), (16, 0)),
        }
    }

    fn mill_job(hours: f64, compatible: Vec<MachineId>) -> Job {
        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        job.status = JobStatus::Unscheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Mill".to_string(),
            machine_type: MachineTypeBucket::Mill,
            compatible_machines: compatible,
            estimated_hours: hours,
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
        });
        job
    }

    #[test]
    fn single_op_job_lands_on_higher_scoring_machine() {
        let vmc1 = mill("VMC-001", 1.15, MachineTier::Premium, 20.0);
        let vmc2 = mill("VMC-002", 1.0, MachineTier::Standard, 10.0);
        let op1 = operator(vec![vmc1.id, vmc2.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![vmc1.clone(), vmc2.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();
        let job = mill_job(4.0, vec![vmc1.id, vmc2.id]);
        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(job.created_date), None, &[], &NullProgressSink)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].machine_id, Some(vmc1.id));
    }

    #[test]
    fn chunks_across_a_shift_boundary() {
        let vmc1 = mill("VMC-001", 1.0, MachineTier::Standard, 0.0);
        let op1 = operator(vec![vmc1.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![vmc1.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();
        let job = mill_job(12.0, vec![vmc1.id]);
        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(monday(6)), None, &[], &NullProgressSink)
            .unwrap();
        assert!(entries.len() >= 2);
        for entry in &entries {
            assert_eq!(entry.machine_id, Some(vmc1.id));
        }
    }

    #[test]
    fn saw_op_steers_lathe_op_away_from_bar_fed_machine() {
        use crate::domain::entities::LatheFlags;

        let bar_fed = Machine {
            lathe: Some(LatheFlags {
                dual_spindle: false,
                live_tooling: false,
                bar_feeder: true,
                bar_length_ft: Some(12.0),
            }),
            machine_type: MachineType::Lathe,
            capabilities: vec![crate::domain::entities::Capability::SingleSpindleTurning],
            ..mill("LATHE-001", 1.0, MachineTier::Standard, 0.0)
        };
        let chucker = Machine {
            lathe: Some(LatheFlags {
                dual_spindle: false,
                live_tooling: false,
                bar_feeder: false,
                bar_length_ft: None,
            }),
            machine_type: MachineType::Lathe,
            capabilities: vec![crate::domain::entities::Capability::SingleSpindleTurning],
            ..mill("LATHE-003", 1.0, MachineTier::Standard, 0.0)
        };
        let saw = Machine {
            machine_type: MachineType::Saw,
            capabilities: vec![crate::domain::entities::Capability::Sawing],
            ..mill("SAW-001", 1.0, MachineTier::Standard, 0.0)
        };
        let op1 = operator(vec![saw.id, bar_fed.id, chucker.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![saw.clone(), bar_fed.clone(), chucker.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();

        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        job.status = JobStatus::Unscheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Cutoff".to_string(),
            machine_type: MachineTypeBucket::Saw,
            compatible_machines: vec![saw.id],
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
        });
        job.routing.push(RoutingOperation {
            sequence: 20,
            name: "Turn".to_string(),
            machine_type: MachineTypeBucket::Lathe,
            compatible_machines: vec![bar_fed.id, chucker.id],
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
        });

        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(job.created_date), None, &[], &NullProgressSink)
            .unwrap();

        let lathe_entry = entries.iter().find(|e| e.operation_sequence == 20).unwrap();
        assert_eq!(lathe_entry.machine_id, Some(chucker.id));
        assert_ne!(lathe_entry.machine_id, Some(bar_fed.id));
    }

    #[test]
    fn pseudo_4th_axis_op_is_refused_on_a_basic_vmc() {
        let vmc = mill("VMC-001", 1.0, MachineTier::Standard, 0.0);
        let op1 = operator(vec![vmc.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![vmc.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();

        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        job.status = JobStatus::Unscheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Pseudo 4th Axis Mill".to_string(),
            machine_type: MachineTypeBucket::Mill,
            compatible_machines: vec![vmc.id],
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
        });

        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let result = scheduler.schedule_job(&job, None, None, &[], &NullProgressSink);
        assert!(matches!(result, Err(SchedulingError::NoCompatibleMachine { .. })));
    }

    #[test]
    fn pseudo_4th_axis_op_is_accepted_on_a_pseudo_4th_axis_mill() {
        let vmc = Machine {
            capabilities: vec![crate::domain::entities::Capability::Pseudo4thAxisMilling],
            ..mill("VMC-HD-001", 1.0, MachineTier::Standard, 0.0)
        };
        let op1 = operator(vec![vmc.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![vmc.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();

        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        job.status = JobStatus::Unscheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Pseudo 4th Axis Mill".to_string(),
            machine_type: MachineTypeBucket::Mill,
            compatible_machines: vec![vmc.id],
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
        });

        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(job.created_date), None, &[], &NullProgressSink)
            .unwrap();
        assert_eq!(entries[0].machine_id, Some(vmc.id));
    }

    #[test]
    fn dual_spindle_op_requires_live_tooling_lathes_subcategory() {
        let plain_lathe = Machine {
            subcategory: None,
            capabilities: vec![crate::domain::entities::Capability::DualSpindleTurning],
            machine_type: MachineType::Lathe,
            ..mill("LATHE-PLAIN", 1.0, MachineTier::Standard, 0.0)
        };
        let live_tooling_lathe = Machine {
            subcategory: Some("Live Tooling Lathes".to_string()),
            capabilities: vec![crate::domain::entities::Capability::DualSpindleTurning],
            machine_type: MachineType::Lathe,
            ..mill("LATHE-LT", 1.0, MachineTier::Standard, 0.0)
        };
        let op1 = operator(vec![plain_lathe.id, live_tooling_lathe.id]);
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![plain_lathe.clone(), live_tooling_lathe.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();

        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        job.status = JobStatus::Unscheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Dual Spindle Turn".to_string(),
            machine_type: MachineTypeBucket::Lathe,
            compatible_machines: vec![plain_lathe.id, live_tooling_lathe.id],
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
        });

        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(job.created_date), None, &[], &NullProgressSink)
            .unwrap();
        assert_eq!(entries[0].machine_id, Some(live_tooling_lathe.id));
    }

    #[test]
    fn shift_two_only_machine_never_receives_shift_one_work() {
        let night_only = Machine {
            shifts: ShiftSet::from([2]),
            ..mill("VMC-NIGHT", 1.0, MachineTier::Standard, 0.0)
        };
        let op1 = Resource {
            shift_schedule: ShiftSet::from([2]),
            work_schedule: full_week_schedule((16, 0), (2, 0)),
            ..operator(vec![night_only.id])
        };
        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![night_only.clone()],
            vec![op1],
            vec![],
        )
        .unwrap();
        let job = mill_job(1.0, vec![night_only.id]);
        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let entries = scheduler
            .schedule_job(&job, Some(monday(6)), None, &[], &NullProgressSink)
            .unwrap();
        assert!(!entries.is_empty());
        for entry in &entries {
            assert_eq!(entry.shift, 2);
            assert_eq!(entry.machine_id, Some(night_only.id));
        }
    }

    #[test]
    fn empty_routing_is_rejected() {
        let mut context = SchedulerContext::new(SchedulerConfig::default(), vec![], vec![], vec![]).unwrap();
        let job = Job::new("J2".to_string(), "P1".to_string(), "ACME".to_string(), monday(0));
        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let result = scheduler.schedule_job(&job, None, None, &[], &NullProgressSink);
        assert!(matches!(result, Err(SchedulingError::RoutingEmpty { .. })));
    }

    #[test]
    fn missing_material_blocks_scheduling() {
        let mut context = SchedulerContext::new(SchedulerConfig::default(), vec![], vec![], vec![]).unwrap();
        let job = mill_job(1.0, vec![]);
        let material = MaterialOrder {
            job_id: job.id,
            ready: false,
            expected_date: None,
        };
        let mut scheduler = JobScheduler::new(&mut context, &[]);
        let result = scheduler.schedule_job(&job, None, Some(&material), &[], &NullProgressSink);
        assert!(matches!(result, Err(SchedulingError::MaterialMissing { .. })));
    }
}
