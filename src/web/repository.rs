//! Application state module
//!
//! `AppState` is the scheduler's equivalent of the teacher's `JobRepository`:
//! a thin, `Arc`-shared wrapper around the storage backend that HTTP
//! handlers pull out of `web::Data`. Unlike the teacher's repository it
//! also owns the `SchedulerConfig` and constructs a fresh `SchedulerContext`
//! snapshot per call, matching spec §5's concurrency model — "at most one
//! batch in-flight process-wide" — by serializing every scheduling
//! operation behind a single mutex.

use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};

use crate::application::context::{SchedulerConfig, SchedulerContext};
use crate::application::errors::SchedulingError;
use crate::application::services::build_campaigns;
use crate::application::use_cases::progress::ScheduleProgressSink;
use crate::application::use_cases::reschedule::{self, RescheduleRequest, RescheduleResult};
use crate::application::use_cases::schedule_batch::{self, BatchResult};
use crate::application::use_cases::schedule_job::JobScheduler;
use crate::domain::entities::{
    Job, JobId, JobStatus, MachineId, ResourceUnavailability, ScheduleEntry, UnavailabilityId,
};
use crate::domain::repositories::storage::IStorage;
use crate::infrastructure::persistence::SqliteStore;

/// Wide enough to stand in for "all schedule entries" when the storage
/// contract only offers a date-range query (the `IStorage` trait has no
/// unbounded `listScheduleEntries`, by design — see DESIGN.md).
fn unbounded_range() -> (DateTime<Utc>, DateTime<Utc>) {
    let far_past = Utc::now() - Duration::days(365 * 5);
    let far_future = Utc::now() + Duration::days(365 * 5);
    (far_past, far_future)
}

/// Fan-out capacity for the `/ws` broadcast channel; a slow or absent
/// subscriber simply misses events rather than blocking the scheduler.
const WS_CHANNEL_CAPACITY: usize = 256;

pub struct AppState {
    storage: Mutex<SqliteStore>,
    config: SchedulerConfig,
    ws_tx: tokio::sync::broadcast::Sender<crate::presentation::dto::ws_dto::WsMessage>,
}

impl AppState {
    pub fn new(database_path: &str, config: SchedulerConfig) -> Result<Self> {
        let storage = SqliteStore::open(database_path).context("failed to open scheduler database")?;
        let (ws_tx, _rx) = tokio::sync::broadcast::channel(WS_CHANNEL_CAPACITY);
        Ok(Self {
            storage: Mutex::new(storage),
            config,
            ws_tx,
        })
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<crate::presentation::dto::ws_dto::WsMessage> {
        self.ws_tx.subscribe()
    }

    fn publish(&self, message: crate::presentation::dto::ws_dto::WsMessage) {
        let _ = self.ws_tx.send(message);
    }

    /// Progress sink that fans `schedule_progress` events out over `/ws`
    /// (spec §6), reusing the same envelope the CLI's `RecordingProgressSink`
    /// tests assert against.
    pub fn progress_sink(&self) -> BroadcastProgressSink {
        BroadcastProgressSink {
            tx: self.ws_tx.clone(),
        }
    }

    fn all_entries(storage: &SqliteStore) -> Result<Vec<ScheduleEntry>> {
        let (start, end) = unbounded_range();
        storage.schedule_entries_in_date_range(start, end)
    }

    fn build_context(storage: &SqliteStore, config: SchedulerConfig) -> Result<SchedulerContext> {
        SchedulerContext::new(
            config,
            storage.list_machines()?,
            storage.list_resources()?,
            storage.list_unavailabilities()?,
        )
    }

    pub fn list_jobs(&self, include_completed: bool) -> Result<Vec<Job>> {
        let storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.list_jobs(include_completed)
    }

    pub fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.get_job(id)
    }

    pub fn create_job(&self, job: Job) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.put_job(job)
    }

    pub fn update_job(&self, job: Job) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.put_job(job)
    }

    pub fn delete_job(&self, id: JobId) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.delete_job(id)
    }

    pub fn delete_all_jobs(&self) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        for job in storage.list_jobs(true)? {
            storage.delete_job(job.id)?;
        }
        Ok(())
    }

    pub fn import_jobs(&self, jobs: Vec<Job>) -> Result<usize> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        let count = jobs.len();
        for job in jobs {
            storage.put_job(job)?;
        }
        Ok(count)
    }

    /// `POST /api/jobs/:id/auto-schedule`.
    pub fn auto_schedule_job(
        &self,
        job_id: JobId,
        now: DateTime<Utc>,
        progress: &dyn ScheduleProgressSink,
    ) -> Result<Result<Vec<ScheduleEntry>, SchedulingError>> {
        self.place_job(job_id, None, now, progress)
    }

    /// `POST /api/jobs/:id/manual-schedule` and `.../drag-schedule` both
    /// pin an earliest start; drag-schedule's machine/shift hint is
    /// informational only — placement still runs the full C8 compatibility
    /// search (Open Question OQ-1 in DESIGN.md).
    pub fn manual_schedule_job(
        &self,
        job_id: JobId,
        start_date: DateTime<Utc>,
        now: DateTime<Utc>,
        progress: &dyn ScheduleProgressSink,
    ) -> Result<Result<Vec<ScheduleEntry>, SchedulingError>> {
        self.place_job(job_id, Some(start_date), now, progress)
    }

    pub fn drag_schedule_job(
        &self,
        job_id: JobId,
        _machine_id: MachineId,
        start_date: DateTime<Utc>,
        _shift: u8,
        now: DateTime<Utc>,
        progress: &dyn ScheduleProgressSink,
    ) -> Result<Result<Vec<ScheduleEntry>, SchedulingError>> {
        self.place_job(job_id, Some(start_date), now, progress)
    }

    fn place_job(
        &self,
        job_id: JobId,
        schedule_after: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        progress: &dyn ScheduleProgressSink,
    ) -> Result<Result<Vec<ScheduleEntry>, SchedulingError>> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        let job = storage
            .get_job(job_id)?
            .with_context(|| format!("job {job_id} not found"))?;
        let jobs = storage.list_jobs(true)?;
        let existing_entries: Vec<ScheduleEntry> = Self::all_entries(&storage)?
            .into_iter()
            .filter(|e| e.job_id != job_id)
            .collect();
        let material = storage.get_material_order(job_id)?;
        let campaigns = build_campaigns(&jobs);

        let mut context = Self::build_context(&storage, self.config.clone())?;
        let mut scheduler = JobScheduler::new(&mut context, &existing_entries);
        let result = scheduler.schedule_job(&job, schedule_after.or(Some(now)), material.as_ref(), &campaigns, progress);

        if let Ok(entries) = &result {
            storage.delete_schedule_entries_for_job_from(job_id, schedule_after.unwrap_or(now))?;
            storage.put_schedule_entries(entries.clone())?;
            self.publish(crate::presentation::dto::ws_dto::WsMessage::JobAutoScheduled(
                crate::presentation::dto::ws_dto::JobAutoScheduledData {
                    job_id,
                    entries: entries.iter().map(crate::presentation::dto::schedule_dto::ScheduleEntryResponse::from).collect(),
                },
            ));
        }
        Ok(result)
    }

    /// `POST /api/jobs/schedule-all[?maxJobs=N]`.
    pub fn schedule_all(
        &self,
        max_jobs: Option<usize>,
        now: DateTime<Utc>,
        progress: &dyn ScheduleProgressSink,
    ) -> Result<BatchResult> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        let jobs: Vec<Job> = storage
            .list_jobs(false)?
            .into_iter()
            .filter(|job| job.status != JobStatus::Complete)
            .collect();
        let existing_entries = Self::all_entries(&storage)?;
        let materials: std::collections::HashMap<JobId, _> = jobs
            .iter()
            .filter_map(|j| storage.get_material_order(j.id).ok().flatten().map(|m| (j.id, m)))
            .collect();
        let campaigns = build_campaigns(&jobs);

        let mut context = Self::build_context(&storage, self.config.clone())?;
        let result = schedule_batch::schedule_batch(
            &mut context,
            &jobs,
            &existing_entries,
            &materials,
            &campaigns,
            max_jobs,
            now,
            progress,
        );

        for outcome in &result.scheduled {
            storage.put_schedule_entries(outcome.entries.clone())?;
        }
        Ok(result)
    }

    /// `DELETE /api/schedule/all`.
    pub fn clear_all_schedule_entries(&self) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.clear_all_schedule_entries()
    }

    /// `POST /api/reschedule/unavailability`.
    pub fn reschedule_unavailability(&self, request: RescheduleRequest, now: DateTime<Utc>) -> Result<RescheduleResult> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        let (jobs, existing_entries, materials) =
            reschedule::gather_reschedule_inputs(&*storage, unbounded_range())?;
        let campaigns = build_campaigns(&jobs);

        let mut context = Self::build_context(&storage, self.config.clone())?;
        let result = reschedule::reschedule_silently(
            &mut context,
            &request,
            &jobs,
            &existing_entries,
            &materials,
            &campaigns,
            now,
        );

        let mut by_job: std::collections::HashMap<JobId, Vec<ScheduleEntry>> = std::collections::HashMap::new();
        for entry in &result.updated_entries {
            by_job.entry(entry.job_id).or_default().push(entry.clone());
        }
        for (job_id, entries) in by_job {
            if let Some(earliest) = entries.iter().map(|e| e.start).min() {
                storage.delete_schedule_entries_for_job_from(job_id, earliest.min(request.unavailability_start))?;
            }
            storage.put_schedule_entries(entries)?;
        }

        self.publish(crate::presentation::dto::ws_dto::WsMessage::RescheduleCompleted(
            crate::presentation::dto::ws_dto::RescheduleCompletedData {
                jobs_rescheduled: result.jobs_rescheduled,
                operations_rescheduled: result.operations_rescheduled,
                summary: result.summary.clone(),
            },
        ));

        Ok(result)
    }

    /// `POST /api/resources/:id/mark-unavailable` and
    /// `POST /api/resources/bulk-unavailable`.
    pub fn mark_resource_unavailable(&self, unavailability: ResourceUnavailability) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        let resource_id = unavailability.resource_id;
        storage.put_unavailability(unavailability)?;
        self.publish(crate::presentation::dto::ws_dto::WsMessage::ResourceMarkedUnavailable(
            crate::presentation::dto::ws_dto::ResourceMarkedUnavailableData {
                resource_id,
                reschedule_triggered: false,
            },
        ));
        Ok(())
    }

    pub fn delete_unavailability(&self, id: UnavailabilityId) -> Result<()> {
        let mut storage = self.storage.lock().expect("scheduler storage mutex poisoned");
        storage.delete_unavailability(id)
    }
}

/// Fans placement-loop progress events out over the `/ws` broadcast
/// channel; a dropped/no-op send just means nobody's listening.
pub struct BroadcastProgressSink {
    tx: tokio::sync::broadcast::Sender<crate::presentation::dto::ws_dto::WsMessage>,
}

impl ScheduleProgressSink for BroadcastProgressSink {
    fn emit(&self, event: crate::application::use_cases::progress::ScheduleProgressEvent) {
        let _ = self.tx.send(crate::presentation::dto::ws_dto::WsMessage::ScheduleProgress(
            crate::presentation::dto::ws_dto::ScheduleProgressData::from(&event),
        ));
    }
}
