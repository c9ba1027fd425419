//! Operator Availability Manager service module (C3)
//!
//! Caches `(resources, unavailabilities)` and answers pure synchronous
//! availability queries. Data is swapped atomically via `update_data`
//! instead of mutated field-by-field behind a singleton (Design Notes §9:
//! "Reimplement as an explicitly constructed SchedulerContext passed to
//! every call").

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;

use crate::application::services::clock::ShiftCalendar;
use crate::domain::entities::{MachineId, Resource, ResourceId, ResourceRole, ResourceUnavailability};
use crate::domain::value_objects::shift_set_contains;

pub struct WorkingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub struct OperatorAvailabilityManager {
    resources: Vec<Resource>,
    unavailabilities: Vec<ResourceUnavailability>,
    tz: Tz,
}

impl OperatorAvailabilityManager {
    /// `tz` is the shift calendar's zone (spec §4.1/§4.3): working windows
    /// are wall-clock in this zone, not raw UTC (`ShiftCalendar::shift_window`
    /// localizes the same way).
    pub fn new(resources: Vec<Resource>, unavailabilities: Vec<ResourceUnavailability>, tz: Tz) -> Self {
        Self {
            resources,
            unavailabilities,
            tz,
        }
    }

    /// Atomically replaces the cached snapshot (spec §4.3: "the caller
    /// calls updateData(...) to replace the snapshot atomically").
    pub fn update_data(&mut self, resources: Vec<Resource>, unavailabilities: Vec<ResourceUnavailability>) {
        self.resources = resources;
        self.unavailabilities = unavailabilities;
    }

    fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    fn unavailable_at(&self, id: ResourceId, instant: DateTime<Utc>) -> bool {
        self.unavailabilities
            .iter()
            .filter(|u| u.resource_id == id)
            .any(|u| u.covers(instant))
    }

    /// spec §4.3 `isAvailable`.
    pub fn is_available(&self, id: ResourceId, date: DateTime<Utc>, shift: Option<u8>) -> bool {
        let Some(resource) = self.resource(id) else {
            return false;
        };
        if !resource.active {
            return false;
        }
        if let Some(shift_number) = shift {
            let Some(shift) = crate::domain::value_objects::Shift::from_number(shift_number) else {
                return false;
            };
            if !shift_set_contains(&resource.shift_schedule, shift) {
                return false;
            }
        }
        if self.unavailable_at(id, date) {
            return false;
        }
        resource.day_schedule(date.weekday()).enabled
    }

    /// spec §4.3 `workingWindow`: builds the concrete wall-clock window for
    /// `date`, wrapping to the next calendar day if `end <= start`.
    pub fn working_window(&self, id: ResourceId, date: DateTime<Utc>) -> Option<WorkingWindow> {
        let resource = self.resource(id)?;
        let day = resource.day_schedule(date.weekday());
        if !day.enabled {
            return None;
        }
        let base = date.with_timezone(&self.tz).date_naive();
        let start_naive = base.and_hms_opt(day.start.0, day.start.1, 0)?;
        let end_date = if day.wraps_midnight() {
            base + Duration::days(1)
        } else {
            base
        };
        let end_naive = end_date.and_hms_opt(day.end.0, day.end.1, 0)?;
        let start = self
            .tz
            .from_local_datetime(&start_naive)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&start_naive));
        let end = self
            .tz
            .from_local_datetime(&end_naive)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&end_naive));
        Some(WorkingWindow {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }

    /// spec §4.3 `availableOperators`.
    pub fn available_operators(
        &self,
        date: DateTime<Utc>,
        shift: u8,
        required_role: Option<ResourceRole>,
        required_work_center: Option<MachineId>,
    ) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| self.is_available(r.id, date, Some(shift)))
            .filter(|r| required_role.map(|role| role_matches(r.role, role)).unwrap_or(true))
            .filter(|r| {
                required_work_center
                    .map(|mc| r.qualified_for_work_center(mc))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// spec §4.3 `nextAvailableDay`, scanning forward up to 365 days.
    pub fn next_available_day(&self, id: ResourceId, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut probe = after;
        for _ in 0..365 {
            probe += Duration::days(1);
            if self.is_available(id, probe, None) {
                return Some(probe);
            }
        }
        None
    }

    /// spec §4.3 `availableHours`: sum of working-window durations on days
    /// where `isAvailable` holds.
    pub fn available_hours(&self, id: ResourceId, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
        let mut total = 0.0;
        let mut day = start.date_naive();
        let end_day = end.date_naive();
        while day <= end_day {
            let probe = DateTime::<Utc>::from_naive_utc_and_offset(day.and_hms_opt(12, 0, 0).unwrap(), Utc);
            if self.is_available(id, probe, None) {
                if let Some(window) = self.working_window(id, probe) {
                    total += (window.end - window.start).num_minutes() as f64 / 60.0;
                }
            }
            day += Duration::days(1);
        }
        total
    }

    /// spec §4.3 `isAvailableInWindow`: true iff every calendar day the
    /// window touches is available during the overlap.
    pub fn is_available_in_window(
        &self,
        id: ResourceId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> bool {
        let mut day = window_start.date_naive();
        let end_day = window_end.date_naive();
        while day <= end_day {
            let probe = DateTime::<Utc>::from_naive_utc_and_offset(day.and_hms_opt(12, 0, 0).unwrap(), Utc);
            if !self.is_available(id, probe, None) {
                return false;
            }
            day += Duration::days(1);
        }
        true
    }

    /// The shift covering `instant`, delegating to the shared calendar
    /// rather than re-deriving shift boundaries locally (spec §4.1).
    pub fn shift_at(&self, calendar: &ShiftCalendar, instant: DateTime<Utc>) -> Option<u8> {
        calendar.shift_number_at(instant).map(|s| s.number())
    }
}

fn role_matches(actual: ResourceRole, required: ResourceRole) -> bool {
    match required {
        ResourceRole::QualityInspector => actual.qualifies_for_inspection(),
        ResourceRole::Operator | ResourceRole::ShiftLead => actual.qualifies_for_production(),
        other => actual == other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DaySchedule, WeeklyWorkSchedule};
    use crate::domain::value_objects::ShiftSet;
    use chrono::TimeZone;

    fn chicago() -> Tz {
        "America/Chicago".parse().unwrap()
    }

    fn operator(active: bool) -> Resource {
        let mut schedule = WeeklyWorkSchedule::new();
        schedule.insert(
            chrono::Weekday::Mon,
            DaySchedule {
                enabled: true,
                start: (6, 0),
                end: (16, 0),
            },
        );
        Resource {
            id: ResourceId::new(),
            employee_id: "E1".to_string(),
            display_name: "Op".to_string(),
            role: ResourceRole::Operator,
            work_centers: vec![],
            skills: vec![],
            shift_schedule: ShiftSet::from([1]),
            active,
            work_schedule: schedule,
        }
    }

    #[test]
    fn inactive_resource_is_never_available() {
        let op = operator(false);
        let manager = OperatorAvailabilityManager::new(vec![op.clone()], vec![], chicago());
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert!(!manager.is_available(op.id, monday, None));
    }

    #[test]
    fn available_on_scheduled_day_and_shift() {
        let op = operator(true);
        let manager = OperatorAvailabilityManager::new(vec![op.clone()], vec![], chicago());
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        assert!(manager.is_available(op.id, monday, Some(1)));
        assert!(!manager.is_available(op.id, monday, Some(2)));
    }

    #[test]
    fn unscheduled_day_is_unavailable() {
        let op = operator(true);
        let manager = OperatorAvailabilityManager::new(vec![op.clone()], vec![], chicago());
        let tuesday = Utc.with_ymd_and_hms(2026, 3, 3, 8, 0, 0).unwrap();
        assert!(!manager.is_available(op.id, tuesday, None));
    }

    #[test]
    fn unavailability_window_blocks_availability() {
        let op = operator(true);
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let unavail = ResourceUnavailability {
            id: UnavailabilityId::new(),
            resource_id: op.id,
            start_date: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 3, 2, 23, 59, 0).unwrap(),
            is_partial_day: false,
            start_time: None,
            end_time: None,
            reason: "vacation".to_string(),
            affected_shifts: vec![1],
            notes: None,
        };
        let manager = OperatorAvailabilityManager::new(vec![op.clone()], vec![unavail], chicago());
        assert!(!manager.is_available(op.id, monday, None));
    }

    use crate::domain::entities::UnavailabilityId;

    #[test]
    fn working_window_wraps_midnight_for_shift_two() {
        let mut op = operator(true);
        op.work_schedule.insert(
            chrono::Weekday::Mon,
            DaySchedule {
                enabled: true,
                start: (16, 0),
                end: (2, 0),
            },
        );
        let manager = OperatorAvailabilityManager::new(vec![op.clone()], vec![], chicago());
        let monday = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let window = manager.working_window(op.id, monday).unwrap();
        assert!(window.end > window.start);
        assert_eq!((window.end - window.start).num_hours(), 10);
    }
}
