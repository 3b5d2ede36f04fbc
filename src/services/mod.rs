pub mod application_service;
pub mod email_templates;
pub mod fallback_store;
pub mod job_service;
pub mod ledger;
pub mod mailer;
pub mod object_store;
