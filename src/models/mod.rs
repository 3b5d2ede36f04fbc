pub mod application;
pub mod attachment;
pub mod job;
