//! Scheduler context and configuration module
//!
//! `SchedulerConfig` carries the ambient settings C1-C9 read (shift
//! windows, timezone, planning horizon) the way `web::config::WebConfig`
//! carries server settings: a plain struct with a `Default` impl and
//! builder-style `with_*` methods, loaded once at startup and passed down
//! explicitly rather than read from globals (Design Notes §9: "no
//! singleton, no global mutable state").

use serde::{Deserialize, Serialize};

/// Shift start/end as local wall-clock (hour, minute), mirroring
/// `domain::entities::resource::DaySchedule`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: (u32, u32),
    pub end: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// IANA timezone name the shift calendar operates in (spec §4.1).
    pub timezone_name: String,
    pub shift_one: ShiftWindow,
    pub shift_two: ShiftWindow,
    /// How many days ahead C8 is willing to search for an open chunk
    /// before giving up (spec §4.8, "scheduling horizon").
    pub planning_horizon_days: i64,
    /// Upper bound on chunk-search iterations per operation, guarding
    /// against runaway placement loops (spec §7, failure kind
    /// `NoAvailableSlot`).
    pub max_chunk_scan_days: i64,
    /// Ship-date admission window for the campaign manager (spec §4.7).
    pub campaign_admission_days: i64,
}

impl Default for SchedulerConfig {
    /// - Timezone: "America/Chicago" (spec §4.1)
    /// - Shift 1: 06:00-16:00, Shift 2: 16:00-02:00 (spec §4.1)
    /// - Planning horizon: 90 days
    /// - Max chunk scan: 120 days
    /// - Campaign admission window: 5 days
    fn default() -> Self {
        Self {
            timezone_name: "America/Chicago".to_string(),
            shift_one: ShiftWindow {
                start: (6, 0),
                end: (16, 0),
            },
            shift_two: ShiftWindow {
                start: (16, 0),
                end: (2, 0),
            },
            planning_horizon_days: 90,
            max_chunk_scan_days: 120,
            campaign_admission_days: 5,
        }
    }
}

impl SchedulerConfig {
    pub fn with_timezone(mut self, timezone_name: String) -> Self {
        self.timezone_name = timezone_name;
        self
    }

    pub fn with_planning_horizon_days(mut self, days: i64) -> Self {
        self.planning_horizon_days = days;
        self
    }

    /// Returns the window for `shift` (1 or 2), defaulting unknown values
    /// to Shift 1 the way `Resource::day_schedule` defaults a missing day
    /// to off.
    pub fn window_for_shift(&self, shift: u8) -> ShiftWindow {
        match shift {
            2 => self.shift_two,
            _ => self.shift_one,
        }
    }
}

/// Explicitly constructed bundle of the C1-C4 services C8/C9 consume.
/// Built once per batch from caller-supplied snapshots (Design Notes §9:
/// "Reimplement as an explicitly constructed SchedulerContext passed to
/// every call; process-wide state is limited to the batch-serialization
/// queue").
pub struct SchedulerContext {
    pub config: SchedulerConfig,
    pub calendar: crate::application::services::ShiftCalendar,
    pub machines: crate::application::services::MachineRegistry,
    pub operators: crate::application::services::OperatorAvailabilityManager,
    pub capacity: crate::application::services::ShiftCapacityManager,
}

impl SchedulerContext {
    pub fn new(
        config: SchedulerConfig,
        machines: Vec<crate::domain::entities::Machine>,
        resources: Vec<crate::domain::entities::Resource>,
        unavailabilities: Vec<crate::domain::entities::ResourceUnavailability>,
    ) -> anyhow::Result<Self> {
        let calendar = crate::application::services::ShiftCalendar::new(&config)?;
        Ok(Self {
            config,
            calendar,
            machines: crate::application::services::MachineRegistry::new(machines),
            operators: crate::application::services::OperatorAvailabilityManager::new(
                resources,
                unavailabilities,
                calendar.tz(),
            ),
            capacity: crate::application::services::ShiftCapacityManager::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_central_time_two_shift_calendar() {
        let config = SchedulerConfig::default();
        assert_eq!(config.timezone_name, "America/Chicago");
        assert_eq!(config.shift_one.start, (6, 0));
        assert_eq!(config.shift_two.end, (2, 0));
    }

    #[test]
    fn unknown_shift_number_defaults_to_shift_one() {
        let config = SchedulerConfig::default();
        let window = config.window_for_shift(9);
        assert_eq!(window.start, config.shift_one.start);
    }
}
