//! Campaign Manager service module (C7)
//!
//! Groups jobs whose final operation outsources to the same vendor with
//! the same description into a shared shipping campaign (spec §4.7).
//! Admission is strict: a job joins only if its own last-safe-ship-date is
//! at least the campaign's (Design Notes §9, resolved Open Question:
//! "this spec treats it as strict").

use chrono::{DateTime, Duration, Utc};

use crate::domain::entities::{Job, JobId, RoutingOperation};

#[derive(Debug, Clone)]
pub struct Campaign {
    pub vendor: String,
    pub operation_description: String,
    pub jobs: Vec<JobId>,
    /// `promisedDate - leadTimeDays - 7d` (spec §4.7: "a 7-day internal
    /// shipping buffer").
    pub ship_date: DateTime<Utc>,
}

const INTERNAL_SHIPPING_BUFFER_DAYS: i64 = 7;

fn final_outsource_operation(job: &Job) -> Option<&RoutingOperation> {
    job.sorted_routing()
        .into_iter()
        .rev()
        .find(|op| op.outsource_vendor.is_some())
}

fn last_safe_ship_date(job: &Job, op: &RoutingOperation) -> Option<DateTime<Utc>> {
    let lead_days = op.lead_days?;
    Some(job.promised_date - Duration::days(lead_days as i64) - Duration::days(INTERNAL_SHIPPING_BUFFER_DAYS))
}

/// Groups `jobs` into campaigns by shared (vendor, description) of their
/// final outsourced operation, applying the strict ship-date admission
/// rule. Jobs are considered in the order given (the caller is expected to
/// pass them in priority order, spec §5: "within a batch, jobs are
/// processed in strict priority order"); the first job for a given
/// vendor+description founds the campaign and fixes its ship-date, since
/// admission can only loosen, never tighten, an existing campaign.
pub fn build_campaigns(jobs: &[Job]) -> Vec<Campaign> {
    let mut campaigns: Vec<Campaign> = Vec::new();

    let candidates: Vec<(&Job, &RoutingOperation, DateTime<Utc>)> = jobs
        .iter()
        .filter_map(|job| {
            let op = final_outsource_operation(job)?;
            let ship_date = last_safe_ship_date(job, op)?;
            Some((job, op, ship_date))
        })
        .collect();

    for (job, op, ship_date) in candidates {
        let vendor = op.outsource_vendor.clone().unwrap_or_default();
        let description = op.outsource_description.clone().unwrap_or_default();

        let existing = campaigns.iter_mut().find(|c| {
            c.vendor == vendor && c.operation_description == description && ship_date >= c.ship_date
        });

        match existing {
            Some(campaign) => campaign.jobs.push(job.id),
            None => campaigns.push(Campaign {
                vendor,
                operation_description: description,
                jobs: vec![job.id],
                ship_date,
            }),
        }
    }

    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MachineTypeBucket;
    use chrono::TimeZone;

    fn plating_job(job_number: &str, promised_days_out: i64, lead_days: u32) -> Job {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut job = Job::new(
            job_number.to_string(),
            "P1".to_string(),
            "ACME".to_string(),
            now,
        );
        job.promised_date = now + Duration::days(promised_days_out);
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Plate".to_string(),
            machine_type: MachineTypeBucket::Outsource,
            compatible_machines: vec![],
            estimated_hours: 0.0,
            setup_hours: None,
            required_bar_length_ft: None,
            operation_type: None,
            original_quoted_machine: None,
            substitution_efficiency_impact: None,
            earliest_start_date: None,
            latest_finish_date: None,
            lead_days: Some(lead_days),
            outsource_vendor: Some("V".to_string()),
            outsource_description: Some("Plating".to_string()),
        });
        job
    }

    #[test]
    fn two_jobs_with_matching_ship_dates_join_one_campaign() {
        let jobs = vec![plating_job("J7", 30, 10), plating_job("J8", 30, 10)];
        let campaigns = build_campaigns(&jobs);
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].jobs.len(), 2);
        let expected_ship = jobs[0].promised_date - Duration::days(17);
        assert_eq!(campaigns[0].ship_date, expected_ship);
    }

    #[test]
    fn a_tighter_latecomer_is_rejected_from_an_established_campaign() {
        let loose = plating_job("J9", 40, 10);
        let tight = plating_job("J7", 15, 10);
        let jobs = vec![loose, tight];
        let campaigns = build_campaigns(&jobs);
        assert_eq!(campaigns.len(), 2);
    }

    #[test]
    fn a_looser_latecomer_joins_an_established_campaign() {
        let tight = plating_job("J7", 15, 10);
        let loose = plating_job("J9", 40, 10);
        let jobs = vec![tight, loose];
        let campaigns = build_campaigns(&jobs);
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].jobs.len(), 2);
    }

    #[test]
    fn jobs_without_outsourcing_are_excluded() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut job = Job::new("J10".to_string(), "P1".to_string(), "ACME".to_string(), now);
        job.routing.push(RoutingOperation {
            sequence: 10,
            name: "Mill".to_string(),
            machine_type: MachineTypeBucket::Mill,
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
        });
        let campaigns = build_campaigns(&[job]);
        assert!(campaigns.is_empty());
    }
}
