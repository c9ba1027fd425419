pub mod job_dto;
pub mod reschedule_dto;
pub mod schedule_dto;
pub mod snapshot_dto;
pub mod ws_dto;
