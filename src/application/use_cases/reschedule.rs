//! Rescheduling Engine use case module (C9)
//!
//! Detects conflicts raised by newly posted resource/machine
//! unavailability and re-plans the displaced tail of each affected job
//! (spec §4.9), reusing C8 rather than a second placement algorithm.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::application::context::SchedulerContext;
use crate::application::services::Campaign;
use crate::application::use_cases::progress::{NullProgressSink, ScheduleProgressSink};
use crate::application::use_cases::schedule_job::JobScheduler;
use crate::domain::entities::{Job, JobId, MachineId, MaterialOrder, ResourceId, ScheduleEntry};
use crate::domain::repositories::storage::IStorage;
use crate::domain::value_objects::{classify_priority, JobPriority, PriorityInputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// spec §4.9: "critical if the entry starts within 8 hours of now, high
/// within 24h, medium within 72h, low otherwise."
pub fn severity_for(now: DateTime<Utc>, entry_start: DateTime<Utc>) -> ConflictSeverity {
    let lead = entry_start - now;
    if lead <= Duration::hours(8) {
        ConflictSeverity::Critical
    } else if lead <= Duration::hours(24) {
        ConflictSeverity::High
    } else if lead <= Duration::hours(72) {
        ConflictSeverity::Medium
    } else {
        ConflictSeverity::Low
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConflict {
    pub entry: ScheduleEntry,
    pub severity: ConflictSeverity,
}

#[derive(Debug, Clone)]
pub struct RescheduleRequest {
    pub reason: String,
    pub affected_resource_ids: Vec<ResourceId>,
    pub affected_machine_ids: Vec<MachineId>,
    pub unavailability_start: DateTime<Utc>,
    pub unavailability_end: DateTime<Utc>,
    pub shifts: Vec<u8>,
    pub force_reschedule: bool,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RescheduleResult {
    pub success: bool,
    pub conflicts_resolved: u32,
    pub jobs_rescheduled: u32,
    pub operations_rescheduled: u32,
    pub unresolvable_conflicts: Vec<JobId>,
    pub warnings: Vec<String>,
    pub summary: String,
    /// Per-job replacement tails: every entry the engine kept or newly
    /// placed for a rescheduled job, keyed by job id. The caller persists
    /// these by deleting each job's entries from the earliest conflict
    /// onward and writing this vector back (storage has no transactional
    /// "replace tail" primitive of its own).
    pub updated_entries: Vec<ScheduleEntry>,
}

/// spec §4.9 "Detection": every existing entry overlapping the
/// unavailability window whose machine/operator is in the affected set
/// and whose shift is in `shifts`.
pub fn detect_conflicts(
    request: &RescheduleRequest,
    existing_entries: &[ScheduleEntry],
    now: DateTime<Utc>,
) -> Vec<ScheduleConflict> {
    existing_entries
        .iter()
        .filter(|entry| entry.start < request.unavailability_end && request.unavailability_start < entry.end)
        .filter(|entry| {
            entry
                .resource_id
                .map(|id| request.affected_resource_ids.contains(&id))
                .unwrap_or(false)
                || entry
                    .machine_id
                    .map(|id| request.affected_machine_ids.contains(&id))
                    .unwrap_or(false)
        })
        .filter(|entry| request.shifts.is_empty() || request.shifts.contains(&entry.shift))
        .map(|entry| ScheduleConflict {
            entry: entry.clone(),
            severity: severity_for(now, entry.start),
        })
        .collect()
}

/// Runs the full rescheduling engine: detect conflicts, group by job,
/// discard and re-place the affected tail of each job in priority order
/// (spec §4.9 "Resolution plan").
#[allow(clippy::too_many_arguments)]
pub fn reschedule(
    context: &mut SchedulerContext,
    request: &RescheduleRequest,
    jobs: &[Job],
    existing_entries: &[ScheduleEntry],
    materials: &std::collections::HashMap<JobId, MaterialOrder>,
    campaigns: &[Campaign],
    now: DateTime<Utc>,
    progress: &dyn ScheduleProgressSink,
) -> RescheduleResult {
    let conflicts = detect_conflicts(request, existing_entries, now);
    if conflicts.is_empty() {
        return RescheduleResult {
            success: true,
            summary: "no conflicts found".to_string(),
            ..Default::default()
        };
    }

    let mut affected_job_ids: Vec<JobId> = conflicts.iter().map(|c| c.entry.job_id).collect();
    affected_job_ids.sort();
    affected_job_ids.dedup();

    let mut groups: Vec<(&Job, DateTime<Utc>)> = affected_job_ids
        .iter()
        .filter_map(|id| {
            let job = jobs.iter().find(|j| j.id == *id)?;
            let earliest = conflicts
                .iter()
                .filter(|c| c.entry.job_id == *id)
                .map(|c| c.entry.start)
                .min()?;
            Some((job, earliest))
        })
        .collect();

    groups.sort_by(|(a, _), (b, _)| {
        let priority = |job: &Job| JobPriority {
            bucket: job.priority.unwrap_or_else(|| {
                classify_priority(&PriorityInputs {
                    job_number_starts_with_s: job.is_stock(),
                    now,
                    promised_date: job.promised_date,
                    due_date: job.due_date,
                    order_date: job.order_date,
                })
            }),
            promised_date: job.promised_date,
            job_id: job.id,
        };
        priority(a).batch_order(&priority(b))
    });

    let mut result = RescheduleResult {
        success: true,
        ..Default::default()
    };

    for (job, earliest_conflict) in groups {
        let mut job_entries: Vec<ScheduleEntry> = existing_entries
            .iter()
            .filter(|e| e.job_id == job.id && e.start < earliest_conflict)
            .cloned()
            .collect();

        let discarded = existing_entries
            .iter()
            .filter(|e| e.job_id == job.id && e.start >= earliest_conflict)
            .count();

        let material = materials.get(&job.id);
        let mut scheduler = JobScheduler::new(context, &job_entries);
        match scheduler.schedule_job(
            job,
            Some(request.unavailability_end),
            material,
            campaigns,
            progress,
        ) {
            Ok(new_entries) => {
                result.conflicts_resolved += discarded.min(new_entries.len()) as u32;
                result.jobs_rescheduled += 1;
                result.operations_rescheduled += new_entries.len() as u32;
                job_entries.extend(new_entries);

                if job_entries
                    .iter()
                    .map(|e| e.end)
                    .max()
                    .map(|latest| latest > job.promised_date)
                    .unwrap_or(false)
                {
                    result
                        .warnings
                        .push(format!("job {} reschedules past its promised date", job.job_number));
                }

                result.updated_entries.extend(job_entries);
            }
            Err(err) => {
                result.unresolvable_conflicts.push(job.id);
                result.warnings.push(format!(
                    "job {} could not be fully rescheduled: {}",
                    job.job_number, err
                ));
                if !request.force_reschedule {
                    result.success = false;
                }
            }
        }
    }

    result.summary = format!(
        "{} conflicts detected across {} jobs; {} rescheduled, {} unresolvable",
        conflicts.len(),
        affected_job_ids.len(),
        result.jobs_rescheduled,
        result.unresolvable_conflicts.len()
    );

    result
}

/// Fetches everything `reschedule()` needs from storage: every job, every
/// schedule entry in `range`, and each job's material order if it has one.
/// Generic over `IStorage` so the same gathering logic runs behind
/// `MockIStorage` in tests and `SqliteStore` in `AppState`.
pub fn gather_reschedule_inputs<S: IStorage + ?Sized>(
    storage: &S,
    range: (DateTime<Utc>, DateTime<Utc>),
) -> anyhow::Result<(Vec<Job>, Vec<ScheduleEntry>, HashMap<JobId, MaterialOrder>)> {
    let jobs = storage.list_jobs(true)?;
    let existing_entries = storage.schedule_entries_in_date_range(range.0, range.1)?;
    let materials = jobs
        .iter()
        .filter_map(|j| storage.get_material_order(j.id).ok().flatten().map(|m| (j.id, m)))
        .collect();
    Ok((jobs, existing_entries, materials))
}

pub fn reschedule_silently(
    context: &mut SchedulerContext,
    request: &RescheduleRequest,
    jobs: &[Job],
    existing_entries: &[ScheduleEntry],
    materials: &std::collections::HashMap<JobId, MaterialOrder>,
    campaigns: &[Campaign],
    now: DateTime<Utc>,
) -> RescheduleResult {
    reschedule(
        context,
        request,
        jobs,
        existing_entries,
        materials,
        campaigns,
        now,
        &NullProgressSink,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::context::SchedulerConfig;
    use crate::domain::entities::{ScheduleEntryId, ScheduleEntryStatus};
    use chrono::TimeZone;

    fn entry(job_id: JobId, resource_id: ResourceId, start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleEntryId::new(),
            job_id,
            machine_id: Some(MachineId::new()),
            resource_id: Some(resource_id),
            operation_sequence: 10,
            start,
            end,
            shift: 1,
            status: ScheduleEntryStatus::Planned,
        }
    }

    #[test]
    fn empty_unavailability_resolves_nothing() {
        let job_id = JobId::new();
        let resource_id = ResourceId::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let e = entry(job_id, resource_id, now + Duration::days(5), now + Duration::days(5) + Duration::hours(4));
        let request = RescheduleRequest {
            reason: "test".to_string(),
            affected_resource_ids: vec![],
            affected_machine_ids: vec![],
            unavailability_start: now,
            unavailability_end: now,
            shifts: vec![],
            force_reschedule: true,
        };
        let conflicts = detect_conflicts(&request, &[e], now);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn overlapping_entry_on_affected_resource_is_a_conflict() {
        let job_id = JobId::new();
        let resource_id = ResourceId::new();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let start = now + Duration::hours(4);
        let e = entry(job_id, resource_id, start, start + Duration::hours(4));
        let request = RescheduleRequest {
            reason: "vacation".to_string(),
            affected_resource_ids: vec![resource_id],
            affected_machine_ids: vec![],
            unavailability_start: now,
            unavailability_end: now + Duration::days(1),
            shifts: vec![1],
            force_reschedule: true,
        };
        let conflicts = detect_conflicts(&request, &[e], now);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, ConflictSeverity::Critical);
    }

    #[test]
    fn severity_escalates_with_proximity() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        assert_eq!(severity_for(now, now + Duration::hours(2)), ConflictSeverity::Critical);
        assert_eq!(severity_for(now, now + Duration::hours(20)), ConflictSeverity::High);
        assert_eq!(severity_for(now, now + Duration::hours(48)), ConflictSeverity::Medium);
        assert_eq!(severity_for(now, now + Duration::hours(100)), ConflictSeverity::Low);
    }

    #[test]
    fn context_constructs_without_machines_for_detection_only_tests() {
        let _context = SchedulerContext::new(SchedulerConfig::default(), vec![], vec![], vec![]).unwrap();
    }

    #[test]
    fn operator_vacation_bumps_job_to_a_covering_operator() {
        use crate::application::use_cases::schedule_job::JobScheduler;
        use crate::domain::entities::{
            Capability, DaySchedule, Job, JobStatus, Machine, MachineAvailabilityState, MachineId,
            MachineTier, MachineType, MachineTypeBucket, Resource, ResourceRole, ResourceUnavailability,
            RoutingOperation, UnavailabilityId, WeeklyWorkSchedule,
        };
        use crate::domain::value_objects::ShiftSet;

        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();

        let mut week = WeeklyWorkSchedule::new();
        for day in [chrono::Weekday::Mon, chrono::Weekday::Tue, chrono::Weekday::Wed, chrono::Weekday::Thu, chrono::Weekday::Fri] {
            week.insert(day, DaySchedule { enabled: true, start: (6, 0), end: (16, 0) });
        }

        let machine = Machine {
            id: MachineId::new(),
            human_id: "VMC-001".to_string(),
            display_name: "VMC-001".to_string(),
            machine_type: MachineType::Mill,
            category: "VMC".to_string(),
            subcategory: None,
            tier: MachineTier::Standard,
            capabilities: vec![Capability::VmcMilling],
            availability: MachineAvailabilityState::Available,
            shifts: ShiftSet::from([1]),
            efficiency_factor: 1.0,
            substitution_group: None,
            lathe: None,
            mill: None,
            utilization_pct: 0.0,
        };

        let on_vacation = Resource {
            id: ResourceId::new(),
            employee_id: "E1".to_string(),
            display_name: "Vacationing Operator".to_string(),
            role: ResourceRole::Operator,
            work_centers: vec![machine.id],
            skills: vec![],
            shift_schedule: ShiftSet::from([1]),
            active: true,
            work_schedule: week.clone(),
        };
        let covering = Resource {
            id: ResourceId::new(),
            employee_id: "E2".to_string(),
            display_name: "Covering Operator".to_string(),
            role: ResourceRole::Operator,
            work_centers: vec![machine.id],
            skills: vec![],
            shift_schedule: ShiftSet::from([1]),
            active: true,
            work_schedule: week,
        };

        let unavailability = ResourceUnavailability {
            id: UnavailabilityId::new(),
            resource_id: on_vacation.id,
            start_date: monday,
            end_date: monday + Duration::days(1),
            is_partial_day: false,
            start_time: None,
            end_time: None,
            reason: "vacation".to_string(),
            affected_shifts: vec![1],
            notes: None,
        };

        let mut context = SchedulerContext::new(
            SchedulerConfig::default(),
            vec![machine.clone()],
            vec![on_vacation.clone(), covering.clone()],
            vec![unavailability.clone()],
        )
        .unwrap();

        let mut job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), monday);
        job.status = JobStatus::Scheduled;
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Mill".to_string(),
            machine_type: MachineTypeBucket::Mill,
            compatible_machines: vec![machine.id],
            estimated_hours: 4.0,
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

        let original_entry = entry(job.id, on_vacation.id, monday, monday + Duration::hours(4));

        let request = RescheduleRequest {
            reason: "operator vacation".to_string(),
            affected_resource_ids: vec![on_vacation.id],
            affected_machine_ids: vec![],
            unavailability_start: unavailability.start_date,
            unavailability_end: unavailability.end_date,
            shifts: vec![1],
            force_reschedule: false,
        };

        let result = reschedule(
            &mut context,
            &request,
            &[job.clone()],
            &[original_entry],
            &std::collections::HashMap::new(),
            &[],
            monday,
            &NullProgressSink,
        );

        assert_eq!(result.jobs_rescheduled, 1);
        assert!(result.unresolvable_conflicts.is_empty());
        let replacement = result
            .updated_entries
            .iter()
            .find(|e| e.operation_sequence == 10)
            .expect("seq 10 re-placed");
        assert_ne!(replacement.resource_id, Some(on_vacation.id));
        assert_eq!(replacement.resource_id, Some(covering.id));

        // confirm a fresh JobScheduler run over the same snapshot, unconstrained
        // by the vacation, would have placed the job on Monday with E1 — i.e.
        // the reschedule genuinely moved it, rather than landing there anyway.
        let mut baseline_context =
            SchedulerContext::new(SchedulerConfig::default(), vec![machine], vec![on_vacation, covering], vec![]).unwrap();
        let mut baseline_scheduler = JobScheduler::new(&mut baseline_context, &[]);
        let baseline = baseline_scheduler
            .schedule_job(&job, Some(monday), None, &[], &NullProgressSink)
            .unwrap();
        assert_eq!(baseline[0].start, monday);
    }

    #[test]
    fn gather_reschedule_inputs_assembles_jobs_entries_and_materials_from_a_fake_store() {
        use crate::domain::entities::MaterialOrder;
        use crate::domain::repositories::storage::MockIStorage;

        let job = Job::new("J1".to_string(), "P1".to_string(), "ACME".to_string(), Utc::now());
        let job_id = job.id;
        let entry = entry(job_id, ResourceId::new(), Utc::now(), Utc::now() + Duration::hours(1));
        let material = MaterialOrder {
            job_id,
            ready: true,
            expected_date: None,
        };

        let mut mock = MockIStorage::new();
        let returned_job = job.clone();
        mock.expect_list_jobs().returning(move |_| Ok(vec![returned_job.clone()]));
        let returned_entry = entry.clone();
        mock.expect_schedule_entries_in_date_range()
            .returning(move |_, _| Ok(vec![returned_entry.clone()]));
        let returned_material = material.clone();
        mock.expect_get_material_order()
            .returning(move |_| Ok(Some(returned_material.clone())));

        let now = Utc::now();
        let (jobs, entries, materials) =
            gather_reschedule_inputs(&mock, (now - Duration::days(1), now + Duration::days(1))).unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job_id);
        assert_eq!(entries.len(), 1);
        assert_eq!(materials.get(&job_id), Some(&material));
    }
}
