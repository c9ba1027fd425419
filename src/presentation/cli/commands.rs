//! CLI commands module
//!
//! Thin drivers over the core use cases, styled after the teacher's
//! `AnalyzeCommand`/`ExportSqliteCommand`: read input from disk, run a
//! use case, print a human summary, write JSON output. No database, no
//! HTTP — `presentation::dto::snapshot_dto::SchedulingSnapshot` stands in
//! for the web shell's `SqliteStore` snapshot queries.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::application::context::{SchedulerConfig, SchedulerContext};
use crate::application::services::build_campaigns;
use crate::application::use_cases::progress::{ScheduleProgressEvent, ScheduleProgressSink, ScheduleStage};
use crate::application::use_cases::reschedule::{self, RescheduleResult};
use crate::application::use_cases::schedule_batch::{self, BatchResult};
use crate::presentation::dto::reschedule_dto::RescheduleUnavailabilityRequest;
use crate::presentation::dto::snapshot_dto::SchedulingSnapshot;

/// Drives `schedule_job`'s progress callback into an `indicatif` bar, the
/// way the teacher's `ExportSqliteCommand` drives a progress callback
/// into a bar via `with_progress_callback`.
struct CliProgressSink {
    bar: ProgressBar,
}

impl ScheduleProgressSink for CliProgressSink {
    fn emit(&self, event: ScheduleProgressEvent) {
        self.bar.set_position(event.progress as u64);
        let label = event.operation_name.unwrap_or_else(|| "-".to_string());
        match event.stage {
            ScheduleStage::Error => self.bar.set_message(format!("job {} failed: {label}", event.job_id)),
            ScheduleStage::Completed => self.bar.set_message(format!("job {} placed", event.job_id)),
            _ => self.bar.set_message(format!("job {} · {label}", event.job_id)),
        }
    }
}

fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<SchedulingSnapshot> {
    let raw = fs::read_to_string(&path).with_context(|| format!("reading snapshot {:?}", path.as_ref()))?;
    serde_json::from_str(&raw).context("parsing scheduling snapshot JSON")
}

fn write_json<T: serde::Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    fs::write(&path, json).with_context(|| format!("writing {:?}", path.as_ref()))
}

pub struct ScheduleAllCommand;

impl ScheduleAllCommand {
    pub fn execute<P: AsRef<Path>>(input: P, output: P, max_jobs: Option<usize>) -> Result<()> {
        info!("loading snapshot: {:?}", input.as_ref());
        let snapshot = load_snapshot(&input)?;
        info!("{} jobs, {} machines, {} resources", snapshot.jobs.len(), snapshot.machines.len(), snapshot.resources.len());

        if snapshot.jobs.is_empty() {
            warn!("no jobs in snapshot, nothing to schedule");
            return Ok(());
        }

        let now = Utc::now();
        let config = SchedulerConfig::default();
        let mut context = SchedulerContext::new(
            config,
            snapshot.machines.clone(),
            snapshot.resources.clone(),
            snapshot.unavailabilities.clone(),
        )?;

        let campaigns = build_campaigns(&snapshot.jobs);
        let materials = snapshot.material_orders_by_job();

        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓▒░ "),
        );
        let progress = CliProgressSink { bar: bar.clone() };

        let result: BatchResult = schedule_batch::schedule_batch(
            &mut context,
            &snapshot.jobs,
            &snapshot.existing_entries,
            &materials,
            &campaigns,
            max_jobs,
            now,
            &progress,
        );
        bar.finish_with_message("batch complete");

        Self::print_summary(&result);
        write_json(&result_to_output(&result), &output)?;
        info!("wrote schedule to {:?}", output.as_ref());

        Ok(())
    }

    fn print_summary(result: &BatchResult) {
        println!("\n{}", "=".repeat(80));
        println!("SCHEDULE-ALL SUMMARY");
        println!("{}", "=".repeat(80));
        println!("  • Jobs scheduled:  {}", result.scheduled.len());
        println!("  • Jobs failed:     {}", result.failed.len());
        let placed: usize = result.scheduled.iter().map(|o| o.entries.len()).sum();
        println!("  • Entries placed:  {}", placed);
        if !result.failed.is_empty() {
            println!("\nFailures:");
            for failure in result.failed.iter().take(10) {
                println!("  - job {}: {}", failure.job_id, failure.reason);
            }
            if result.failed.len() > 10 {
                println!("  ... and {} more", result.failed.len() - 10);
            }
        }
        println!("{}", "=".repeat(80));
    }
}

#[derive(serde::Serialize)]
struct BatchOutputFile {
    scheduled_job_count: usize,
    failed_job_count: usize,
    entries: Vec<crate::domain::entities::ScheduleEntry>,
    failures: Vec<(crate::domain::entities::JobId, String)>,
}

fn result_to_output(result: &BatchResult) -> BatchOutputFile {
    BatchOutputFile {
        scheduled_job_count: result.scheduled.len(),
        failed_job_count: result.failed.len(),
        entries: result.scheduled.iter().flat_map(|o| o.entries.clone()).collect(),
        failures: result.failed.iter().map(|f| (f.job_id, f.reason.clone())).collect(),
    }
}

pub struct RescheduleCommand;

impl RescheduleCommand {
    pub fn execute<P: AsRef<Path>>(input: P, request_path: P, output: P) -> Result<()> {
        let snapshot = load_snapshot(&input)?;
        let raw = fs::read_to_string(&request_path)
            .with_context(|| format!("reading reschedule request {:?}", request_path.as_ref()))?;
        let request: RescheduleUnavailabilityRequest =
            serde_json::from_str(&raw).context("parsing reschedule request JSON")?;

        let now = Utc::now();
        let config = SchedulerConfig::default();
        let mut context = SchedulerContext::new(
            config,
            snapshot.machines.clone(),
            snapshot.resources.clone(),
            snapshot.unavailabilities.clone(),
        )?;
        let campaigns = build_campaigns(&snapshot.jobs);
        let materials = snapshot.material_orders_by_job();

        let result: RescheduleResult = reschedule::reschedule_silently(
            &mut context,
            &request.into(),
            &snapshot.jobs,
            &snapshot.existing_entries,
            &materials,
            &campaigns,
            now,
        );

        Self::print_summary(&result);
        write_json(&result, &output)?;
        info!("wrote reschedule result to {:?}", output.as_ref());

        Ok(())
    }

    fn print_summary(result: &RescheduleResult) {
        println!("\n{}", "=".repeat(80));
        println!("RESCHEDULE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("  • Success:              {}", result.success);
        println!("  • Conflicts resolved:   {}", result.conflicts_resolved);
        println!("  • Jobs rescheduled:     {}", result.jobs_rescheduled);
        println!("  • Unresolvable:         {}", result.unresolvable_conflicts.len());
        println!("  {}", result.summary);
        for warning in &result.warnings {
            println!("  ⚠ {warning}");
        }
        println!("{}", "=".repeat(80));
    }
}
