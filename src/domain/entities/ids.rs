//! Opaque identifier module
//!
//! Every entity in the scheduling domain is addressed by an opaque UUID
//! newtype rather than by object reference, so that Job/Machine/Resource/
//! ScheduleEntry form a value graph with no cycles (see Design Notes,
//! "Cyclic references").

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(JobId);
opaque_id!(MachineId);
opaque_id!(ResourceId);
opaque_id!(ScheduleEntryId);
opaque_id!(UnavailabilityId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn display_round_trips_through_uuid() {
        let id = MachineId::new();
        let rendered = id.to_string();
        assert_eq!(rendered, id.as_uuid().to_string());
    }
}
