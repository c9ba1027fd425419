pub mod priority;
pub mod shift;

pub use priority::{classify_priority, JobPriority, PriorityBucket, PriorityInputs};
pub use shift::{shift_set_contains, Shift, ShiftSet};
