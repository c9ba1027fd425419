//! Clock & Shift Calendar service module (C1)
//!
//! Two fixed daily shifts in a single IANA timezone. All scheduling math in
//! C3/C4/C8/C9 routes through this module; spec §4.1: "no raw arithmetic on
//! local wall-clock is permitted elsewhere."

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::application::context::SchedulerConfig;
use crate::domain::value_objects::Shift;

/// Stateless (config-driven) shift calendar. Constructed once per
/// `SchedulerContext` and shared by reference, the way `DependencyAnalyzer`
/// is constructed once and queried repeatedly.
#[derive(Debug, Clone)]
pub struct ShiftCalendar {
    tz: Tz,
    shift_one: (NaiveTime, NaiveTime),
    shift_two: (NaiveTime, NaiveTime),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftWindowInstant {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftCalendar {
    pub fn new(config: &SchedulerConfig) -> anyhow::Result<Self> {
        let tz: Tz = config
            .timezone_name
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown timezone: {}", config.timezone_name))?;
        Ok(Self {
            tz,
            shift_one: (
                naive_time(config.shift_one.start),
                naive_time(config.shift_one.end),
            ),
            shift_two: (
                naive_time(config.shift_two.start),
                naive_time(config.shift_two.end),
            ),
        })
    }

    /// The IANA timezone wall-clock times are interpreted in, so other
    /// services (e.g. `OperatorAvailabilityManager`) can localize through
    /// the same zone rather than re-parsing `config.timezone_name`.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    fn window_bounds(&self, shift: Shift) -> (NaiveTime, NaiveTime) {
        match shift {
            Shift::First => self.shift_one,
            Shift::Second => self.shift_two,
        }
    }

    /// True if `shift`'s window wraps past midnight (the Shift 2 case).
    fn wraps(&self, shift: Shift) -> bool {
        let (start, end) = self.window_bounds(shift);
        end <= start
    }

    /// Which shift (if any) covers instant `t`, per spec §4.1's two fixed
    /// windows.
    pub fn shift_number_at(&self, t: DateTime<Utc>) -> Option<Shift> {
        let local = t.with_timezone(&self.tz);
        let time = local.time();
        for shift in [Shift::First, Shift::Second] {
            let (start, end) = self.window_bounds(shift);
            let inside = if end <= start {
                time >= start || time < end
            } else {
                time >= start && time < end
            };
            if inside {
                return Some(shift);
            }
        }
        None
    }

    /// Advances `t` to the next start-of-shift if it currently falls
    /// outside both shift windows (spec §4.1, `roundToShiftStart`).
    pub fn round_to_shift_start(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        if self.shift_number_at(t).is_some() {
            return t;
        }
        let mut probe = t;
        for _ in 0..(48 * 60) {
            probe += Duration::minutes(1);
            if self.shift_number_at(probe).is_some() {
                return probe;
            }
        }
        probe
    }

    /// Advances `t` past the end of its current shift; if `t` is not
    /// inside a shift, returns `t` unchanged (spec §4.1,
    /// `advancePastShiftEnd`).
    pub fn advance_past_shift_end(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        match self.shift_number_at(t) {
            Some(shift) => self.shift_window(t, shift).end,
            None => t,
        }
    }

    /// Concrete UTC window for the calendar day containing `t`'s local
    /// date, for the given shift.
    pub fn shift_window(&self, t: DateTime<Utc>, shift: Shift) -> ShiftWindowInstant {
        let local_date = t.with_timezone(&self.tz).date_naive();
        let (start_time, end_time) = self.window_bounds(shift);
        let start_naive = local_date.and_time(start_time);
        let start = self
            .tz
            .from_local_datetime(&start_naive)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&start_naive));
        let end_date = if self.wraps(shift) {
            local_date + Duration::days(1)
        } else {
            local_date
        };
        let end_naive = end_date.and_time(end_time);
        let end = self
            .tz
            .from_local_datetime(&end_naive)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&end_naive));
        ShiftWindowInstant {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        }
    }

    /// Start-of-next-day, local time, expressed in UTC. Used by C8's
    /// post-lag rule after SAW/WATERJET operations (spec §4.8, resolved
    /// per Design Notes §9: "this spec mandates start-of-next-day").
    pub fn next_start_of_day(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let local = t.with_timezone(&self.tz);
        let next_date = local.date_naive() + Duration::days(1);
        let midnight = next_date.and_hms_opt(0, 0, 0).unwrap();
        self.tz
            .from_local_datetime(&midnight)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&midnight))
            .with_timezone(&Utc)
    }
}

fn naive_time(hm: (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hm.0, hm.1, 0).expect("valid shift boundary time")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn calendar() -> ShiftCalendar {
        ShiftCalendar::new(&SchedulerConfig::default()).unwrap()
    }

    fn chicago_utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        let tz: Tz = "America/Chicago".parse().unwrap();
        tz.with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn shift_one_covers_morning_window() {
        let cal = calendar();
        let t = chicago_utc(2026, 3, 2, 8, 0);
        assert_eq!(cal.shift_number_at(t), Some(Shift::First));
    }

    #[test]
    fn shift_two_wraps_past_midnight() {
        let cal = calendar();
        let t = chicago_utc(2026, 3, 2, 23, 30);
        assert_eq!(cal.shift_number_at(t), Some(Shift::Second));
        let after_midnight = chicago_utc(2026, 3, 3, 1, 0);
        assert_eq!(cal.shift_number_at(after_midnight), Some(Shift::Second));
    }

    #[test]
    fn outside_any_shift_rounds_forward() {
        let cal = calendar();
        let t = chicago_utc(2026, 3, 2, 2, 0);
        let rounded = cal.round_to_shift_start(t);
        assert_eq!(cal.shift_number_at(rounded), Some(Shift::First));
        assert!(rounded > t);
    }

    #[test]
    fn next_start_of_day_is_local_midnight_tomorrow() {
        let cal = calendar();
        let t = chicago_utc(2026, 3, 2, 14, 0);
        let next = cal.next_start_of_day(t);
        let local = next.with_timezone(&cal.tz);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(local.date_naive(), chicago_utc(2026, 3, 3, 0, 0).with_timezone(&cal.tz).date_naive());
    }
}
