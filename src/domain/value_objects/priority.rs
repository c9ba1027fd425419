//! Priority bucket value object module
//!
//! This module implements C6, the Priority Manager: five descending buckets
//! with a deterministic tie-break. See spec §4.6. The Stock rule is
//! evaluated first and overrides every other bucket (resolved Open Question,
//! spec §9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One of the five scheduling priority buckets, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityBucket {
    LateToCustomer,
    LateToUs,
    NearingShip,
    Normal,
    Stock,
}

impl PriorityBucket {
    pub fn score(&self) -> u32 {
        match self {
            PriorityBucket::LateToCustomer => 500,
            PriorityBucket::LateToUs => 400,
            PriorityBucket::NearingShip => 300,
            PriorityBucket::Normal => 200,
            PriorityBucket::Stock => 100,
        }
    }
}

/// Inputs needed to classify a job into a priority bucket.
#[derive(Debug, Clone, Copy)]
pub struct PriorityInputs {
    pub job_number_starts_with_s: bool,
    pub now: DateTime<Utc>,
    pub promised_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub order_date: DateTime<Utc>,
}

/// Determines the priority bucket for a job.
///
/// The Stock rule is evaluated first: a job number beginning with 'S' is
/// always Stock, even if it would otherwise be Late-to-Customer or
/// Late-to-Us. This overrides the in-source ambiguity noted in spec §9.
pub fn classify_priority(inputs: &PriorityInputs) -> PriorityBucket {
    if inputs.job_number_starts_with_s {
        return PriorityBucket::Stock;
    }

    if inputs.now > inputs.promised_date {
        return PriorityBucket::LateToCustomer;
    }

    if inputs.now > inputs.due_date {
        return PriorityBucket::LateToUs;
    }

    let nearing_ship_deadline = inputs.order_date + chrono::Duration::days(21);
    if nearing_ship_deadline - inputs.now <= chrono::Duration::days(7) {
        return PriorityBucket::NearingShip;
    }

    PriorityBucket::Normal
}

/// A job's priority plus the tie-break fields needed to order a batch.
#[derive(Debug, Clone, Copy)]
pub struct JobPriority {
    pub bucket: PriorityBucket,
    pub promised_date: DateTime<Utc>,
    pub job_id: crate::domain::entities::JobId,
}

impl JobPriority {
    /// Orders jobs for a batch: higher score first, then earlier promised
    /// date, then job id as the final deterministic tie-break (spec §4.6:
    /// "if still tied, the order is undefined... must be deterministic
    /// within a run, e.g. by job id").
    pub fn batch_order(&self, other: &JobPriority) -> Ordering {
        other
            .bucket
            .score()
            .cmp(&self.bucket.score())
            .then_with(|| self.promised_date.cmp(&other.promised_date))
            .then_with(|| self.job_id.as_uuid().cmp(&other.job_id.as_uuid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn stock_overrides_late_to_customer() {
        let inputs = PriorityInputs {
            job_number_starts_with_s: true,
            now: dt(2026, 3, 10),
            promised_date: dt(2026, 3, 1),
            due_date: dt(2026, 3, 1),
            order_date: dt(2026, 1, 1),
        };
        assert_eq!(classify_priority(&inputs), PriorityBucket::Stock);
    }

    #[test]
    fn late_to_customer_beats_late_to_us() {
        let inputs = PriorityInputs {
            job_number_starts_with_s: false,
            now: dt(2026, 3, 10),
            promised_date: dt(2026, 3, 1),
            due_date: dt(2026, 2, 1),
            order_date: dt(2026, 1, 1),
        };
        assert_eq!(classify_priority(&inputs), PriorityBucket::LateToCustomer);
    }

    #[test]
    fn nearing_ship_window() {
        let order_date = dt(2026, 1, 1);
        let inputs = PriorityInputs {
            job_number_starts_with_s: false,
            now: order_date + chrono::Duration::days(15),
            promised_date: dt(2026, 6, 1),
            due_date: dt(2026, 6, 1),
            order_date,
        };
        assert_eq!(classify_priority(&inputs), PriorityBucket::NearingShip);
    }

    #[test]
    fn default_is_normal() {
        let inputs = PriorityInputs {
            job_number_starts_with_s: false,
            now: dt(2026, 1, 2),
            promised_date: dt(2026, 6, 1),
            due_date: dt(2026, 6, 1),
            order_date: dt(2026, 1, 1),
        };
        assert_eq!(classify_priority(&inputs), PriorityBucket::Normal);
    }
}
