//! Batch scheduling driver module
//!
//! Iterates jobs in priority order (C6) calling C8 for each, the way
//! spec §2's control-flow summary describes: "a batch driver iterates
//! over jobs in priority order calling C8." Enforces the ordering
//! guarantee from spec §5: "within a batch, jobs are processed in strict
//! priority order then by job id."

use chrono::{DateTime, Utc};

use crate::application::context::SchedulerContext;
use crate::application::errors::SchedulingError;
use crate::application::services::Campaign;
use crate::application::use_cases::progress::ScheduleProgressSink;
use crate::application::use_cases::schedule_job::JobScheduler;
use crate::domain::entities::{Job, JobId, MaterialOrder, ScheduleEntry};
use crate::domain::value_objects::{classify_priority, JobPriority, PriorityInputs};

/// spec §6: `POST /api/jobs/schedule-all[?maxJobs=N]`, default 50,
/// maximum 100 jobs per call.
pub const DEFAULT_MAX_JOBS: usize = 50;
pub const MAX_JOBS_PER_CALL: usize = 100;

#[derive(Debug, Clone)]
pub struct BatchJobOutcome {
    pub job_id: JobId,
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone)]
pub struct BatchJobFailure {
    pub job_id: JobId,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub scheduled: Vec<BatchJobOutcome>,
    pub failed: Vec<BatchJobFailure>,
}

fn job_priority(job: &Job, now: DateTime<Utc>) -> JobPriority {
    JobPriority {
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
    }
}

/// Orders `jobs` the way a batch driver must: priority bucket descending,
/// then promised-date, then job id (spec §4.6's tie-break, reused
/// verbatim by spec §5's batch ordering guarantee).
pub fn order_for_batch(jobs: &mut [Job], now: DateTime<Utc>) {
    jobs.sort_by(|a, b| job_priority(a, now).batch_order(&job_priority(b, now)));
}

/// Runs the batch driver over `jobs` (already filtered to the ones the
/// caller wants scheduled), capping at `max_jobs` and never exceeding
/// `MAX_JOBS_PER_CALL` (spec §6).
#[allow(clippy::too_many_arguments)]
pub fn schedule_batch(
    context: &mut SchedulerContext,
    jobs: &[Job],
    existing_entries: &[ScheduleEntry],
    materials: &std::collections::HashMap<JobId, MaterialOrder>,
    campaigns: &[Campaign],
    max_jobs: Option<usize>,
    now: DateTime<Utc>,
    progress: &dyn ScheduleProgressSink,
) -> BatchResult {
    let cap = max_jobs.unwrap_or(DEFAULT_MAX_JOBS).min(MAX_JOBS_PER_CALL);

    let mut ordered: Vec<Job> = jobs.to_vec();
    order_for_batch(&mut ordered, now);
    ordered.truncate(cap);

    let mut result = BatchResult::default();
    let mut batch_entries: Vec<ScheduleEntry> = existing_entries.to_vec();

    for job in &ordered {
        let mut scheduler = JobScheduler::new(context, &batch_entries);
        let material = materials.get(&job.id);
        match scheduler.schedule_job(job, None, material, campaigns, progress) {
            Ok(entries) => {
                batch_entries.extend(entries.iter().cloned());
                result.scheduled.push(BatchJobOutcome {
                    job_id: job.id,
                    entries,
                });
            }
            Err(err) => {
                result.failed.push(BatchJobFailure {
                    job_id: job.id,
                    reason: format_reason(&err),
                });
            }
        }
    }

    result
}

fn format_reason(err: &SchedulingError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::JobStatus;
    use chrono::TimeZone;

    fn job(job_number: &str, promised_days_out: i64) -> Job {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut job = Job::new(job_number.to_string(), "P1".to_string(), "ACME".to_string(), now);
        job.promised_date = now + chrono::Duration::days(promised_days_out);
        job.due_date = job.promised_date;
        job.order_date = now;
        job.status = JobStatus::Unscheduled;
        job
    }

    #[test]
    fn late_job_sorts_before_normal_job() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut jobs = vec![job("J5", 60), job("J4", -1)];
        order_for_batch(&mut jobs, now);
        assert_eq!(jobs[0].job_number, "J4");
    }

    #[test]
    fn stock_job_never_outranks_late_job() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut jobs = vec![job("S100", 60), job("J4", -1)];
        order_for_batch(&mut jobs, now);
        assert_eq!(jobs[0].job_number, "J4");
    }
}
