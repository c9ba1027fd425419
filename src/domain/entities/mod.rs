pub mod collaborators;
pub mod ids;
pub mod job;
pub mod machine;
pub mod resource;
pub mod schedule_entry;
pub mod unavailability;

pub use collaborators::{is_job_ready_for_scheduling, MaterialOrder, OutsourcedOperation};
pub use ids::{JobId, MachineId, ResourceId, ScheduleEntryId, UnavailabilityId};
pub use job::{
    Job, JobStatus, MachineTypeBucket, RoutingOpKind, RoutingOperation, RoutingValidationError,
};
pub use machine::{
    Capability, LatheFlags, Machine, MachineAvailabilityState, MachineTier, MachineType,
    MillFlags,
};
pub use resource::{DaySchedule, Resource, ResourceRole, WeeklyWorkSchedule};
pub use schedule_entry::{ScheduleEntry, ScheduleEntryStatus};
pub use unavailability::ResourceUnavailability;
