//! Resource (operator) entity module
//!
//! This module defines the human Resource entity: role, work-center
//! qualifications, and weekly work schedule (spec §3, "Resource").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::{MachineId, ResourceId};
use crate::domain::value_objects::ShiftSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceRole {
    Operator,
    ShiftLead,
    QualityInspector,
    Technician,
    Supervisor,
}

impl ResourceRole {
    pub fn qualifies_for_production(&self) -> bool {
        matches!(self, ResourceRole::Operator | ResourceRole::ShiftLead)
    }

    pub fn qualifies_for_inspection(&self) -> bool {
        matches!(self, ResourceRole::QualityInspector)
    }
}

/// One weekday's working window. An empty/disabled entry means the
/// resource is off that day regardless of shift membership (spec §3
/// invariant).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DaySchedule {
    pub enabled: bool,
    /// HH:MM local wall-clock start.
    pub start: (u32, u32),
    /// HH:MM local wall-clock end. If `end <= start` the window wraps into
    /// the next calendar day (the Shift 2 case, spec §4.3).
    pub end: (u32, u32),
}

impl DaySchedule {
    pub fn off() -> Self {
        Self {
            enabled: false,
            start: (0, 0),
            end: (0, 0),
        }
    }

    pub fn wraps_midnight(&self) -> bool {
        let start_minutes = self.start.0 * 60 + self.start.1;
        let end_minutes = self.end.0 * 60 + self.end.1;
        end_minutes <= start_minutes
    }
}

pub type WeeklyWorkSchedule = HashMap<chrono::Weekday, DaySchedule>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub employee_id: String,
    pub display_name: String,
    pub role: ResourceRole,
    pub work_centers: Vec<MachineId>,
    pub skills: Vec<String>,
    pub shift_schedule: ShiftSet,
    pub active: bool,
    pub work_schedule: WeeklyWorkSchedule,
}

impl Resource {
    pub fn qualified_for_work_center(&self, machine_id: MachineId) -> bool {
        self.work_centers.contains(&machine_id)
    }

    pub fn day_schedule(&self, weekday: chrono::Weekday) -> DaySchedule {
        self.work_schedule
            .get(&weekday)
            .copied()
            .unwrap_or_else(DaySchedule::off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_and_shift_lead_qualify_for_production() {
        assert!(ResourceRole::Operator.qualifies_for_production());
        assert!(ResourceRole::ShiftLead.qualifies_for_production());
        assert!(!ResourceRole::QualityInspector.qualifies_for_production());
    }

    #[test]
    fn only_inspector_qualifies_for_inspection() {
        assert!(ResourceRole::QualityInspector.qualifies_for_inspection());
        assert!(!ResourceRole::Operator.qualifies_for_inspection());
    }

    #[test]
    fn missing_day_defaults_to_off() {
        let resource = Resource {
            id: ResourceId::new(),
            employee_id: "E1".to_string(),
            display_name: "Op".to_string(),
            role: ResourceRole::Operator,
            work_centers: vec![],
            skills: vec![],
            shift_schedule: ShiftSet::from([1, 2]),
            active: true,
            work_schedule: WeeklyWorkSchedule::new(),
        };
        assert!(!resource.day_schedule(chrono::Weekday::Mon).enabled);
    }

    #[test]
    fn shift_two_window_wraps_midnight() {
        let day = DaySchedule {
            enabled: true,
            start: (16, 0),
            end: (2, 0),
        };
        assert!(day.wraps_midnight());
    }
}
