//! Shift value object module
//!
//! A shift is one of the two fixed daily windows a machine or operator may
//! be used in (see C1, Clock & Shift Calendar).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two daily production shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    First = 1,
    Second = 2,
}

impl Shift {
    pub fn number(&self) -> u8 {
        match self {
            Shift::First => 1,
            Shift::Second => 2,
        }
    }

    pub fn other(&self) -> Shift {
        match self {
            Shift::First => Shift::Second,
            Shift::Second => Shift::First,
        }
    }

    pub fn from_number(n: u8) -> Option<Shift> {
        match n {
            1 => Some(Shift::First),
            2 => Some(Shift::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A subset of {1, 2}; most entities carry this instead of a single shift.
pub type ShiftSet = std::collections::BTreeSet<u8>;

pub fn shift_set_contains(shifts: &ShiftSet, shift: Shift) -> bool {
    shifts.contains(&shift.number())
}
