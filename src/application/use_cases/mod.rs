pub mod progress;
pub mod reschedule;
pub mod schedule_batch;
pub mod schedule_job;

pub use progress::{
    NullProgressSink, RecordingProgressSink, ScheduleProgressEvent, ScheduleProgressSink, ScheduleStage,
};
pub use reschedule::{
    reschedule, reschedule_silently, ConflictSeverity, RescheduleRequest, RescheduleResult, ScheduleConflict,
};
pub use schedule_batch::{order_for_batch, schedule_batch, BatchJobFailure, BatchJobOutcome, BatchResult};
pub use schedule_job::JobScheduler;
