pub mod application_dto;
pub mod job_dto;
pub mod profile_dto;
