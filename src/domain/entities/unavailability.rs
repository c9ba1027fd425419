//! Resource unavailability entity module
//!
//! See spec §3 ("Resource Unavailability"). The interval [start, end] is
//! inclusive of whole days unless `is_partial_day` is true, in which case
//! `start_time`/`end_time` narrow the first/last day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ResourceId, UnavailabilityId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUnavailability {
    pub id: UnavailabilityId,
    pub resource_id: ResourceId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_partial_day: bool,
    pub start_time: Option<(u32, u32)>,
    pub end_time: Option<(u32, u32)>,
    pub reason: String,
    pub affected_shifts: Vec<u8>,
    pub notes: Option<String>,
}

impl ResourceUnavailability {
    /// True if the given instant falls within this unavailability window.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        if instant < self.start_date || instant > self.end_date {
            return false;
        }
        if !self.is_partial_day {
            return true;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                let minutes = instant.time().hour_minute();
                minutes >= start && minutes <= end
            }
            _ => true,
        }
    }
}

trait TimeMinutes {
    fn hour_minute(&self) -> (u32, u32);
}

impl TimeMinutes for chrono::NaiveTime {
    fn hour_minute(&self) -> (u32, u32) {
        use chrono::Timelike;
        (self.hour(), self.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn whole_day_window_covers_entire_range() {
        let unavail = ResourceUnavailability {
            id: UnavailabilityId::new(),
            resource_id: ResourceId::new(),
            start_date: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap(),
            is_partial_day: false,
            start_time: None,
            end_time: None,
            reason: "vacation".to_string(),
            affected_shifts: vec![1, 2],
            notes: None,
        };
        let probe = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert!(unavail.covers(probe));
    }

    #[test]
    fn partial_day_window_restricts_to_time_range() {
        let unavail = ResourceUnavailability {
            id: UnavailabilityId::new(),
            resource_id: ResourceId::new(),
            start_date: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap(),
            is_partial_day: true,
            start_time: Some((13, 0)),
            end_time: Some((15, 0)),
            reason: "appointment".to_string(),
            affected_shifts: vec![1],
            notes: None,
        };
        let inside = Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        assert!(unavail.covers(inside));
        assert!(!unavail.covers(outside));
    }
}
