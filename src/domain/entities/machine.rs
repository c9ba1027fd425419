//! Machine entity module
//!
//! This module defines the Machine entity and the capability vocabulary used
//! by C2 (Machine Registry) and C5 (Bar-Feeder Policy). See spec §3
//! ("Machine") and §4.2.

use serde::{Deserialize, Serialize};

use super::ids::MachineId;
use crate::domain::value_objects::ShiftSet;

/// Semantic machine type bucket, matching `MachineTypeBucket` on the
/// routing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    Mill,
    Lathe,
    Saw,
    Waterjet,
    Inspect,
    Other,
}

/// Machine tier, used by the scoring formula in §4.8. "Tier 1" is an alias
/// for Premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineTier {
    Premium,
    Standard,
    Budget,
}

impl MachineTier {
    pub fn from_label(label: &str) -> MachineTier {
        match label {
            "Tier 1" | "Premium" => MachineTier::Premium,
            "Budget" => MachineTier::Budget,
            _ => MachineTier::Standard,
        }
    }

    /// Points contributed to the machine-selection score (§4.8).
    pub fn score(&self) -> f64 {
        match self {
            MachineTier::Premium => 30.0,
            MachineTier::Standard => 20.0,
            MachineTier::Budget => 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineAvailabilityState {
    Available,
    Busy,
    Maintenance,
    Offline,
}

/// Leaf capabilities used by the capability-flow table (§4.2). Lathe and
/// mill capabilities form upward-only substitution chains; other types
/// match by explicit membership only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    SingleSpindleTurning,
    LiveToolingTurning,
    DualSpindleTurning,
    BarFedTurning,
    VmcMilling,
    Pseudo4thAxisMilling,
    True4thAxisMilling,
    FiveAxisMilling,
    Sawing,
    Waterjet,
    Inspection,
}

/// Lathe-specific flags (spec §3, "Machine": "lathe flags").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LatheFlags {
    pub dual_spindle: bool,
    pub live_tooling: bool,
    pub bar_feeder: bool,
    pub bar_length_ft: Option<f64>,
}

/// Mill-specific flag (spec §3, "Machine": "mill flag").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MillFlags {
    pub fourth_axis: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub human_id: String,
    pub display_name: String,
    pub machine_type: MachineType,
    pub category: String,
    pub subcategory: Option<String>,
    pub tier: MachineTier,
    pub capabilities: Vec<Capability>,
    pub availability: MachineAvailabilityState,
    pub shifts: ShiftSet,
    pub efficiency_factor: f64,
    pub substitution_group: Option<String>,
    pub lathe: Option<LatheFlags>,
    pub mill: Option<MillFlags>,
    /// Current utilization, 0.0-100.0, used by C4/C8 scoring.
    pub utilization_pct: f64,
}

impl Machine {
    pub fn is_available_for_scheduling(&self) -> bool {
        matches!(self.availability, MachineAvailabilityState::Available)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_one_label_maps_to_premium() {
        assert!(matches!(
            MachineTier::from_label("Tier 1"),
            MachineTier::Premium
        ));
    }

    #[test]
    fn unknown_label_defaults_to_standard() {
        assert!(matches!(
            MachineTier::from_label("whatever"),
            MachineTier::Standard
        ));
    }

    #[test]
    fn tier_scores_match_spec() {
        assert_eq!(MachineTier::Premium.score(), 30.0);
        assert_eq!(MachineTier::Standard.score(), 20.0);
        assert_eq!(MachineTier::Budget.score(), 10.0);
    }
}
