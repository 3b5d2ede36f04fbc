pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    application_service::{ApplicationService, NotificationSettings},
    fallback_store::LocalFallbackStore,
    job_service::JobService,
    ledger::JsonFileLedger,
    mailer::SmtpMailer,
    object_store::SupabaseStorage,
};
use crate::utils::upload::UploadPolicy;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub application_service: ApplicationService,
    pub job_service: JobService,
    pub upload_policy: UploadPolicy,
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let http_client = Client::builder().timeout(config.external_timeout()).build()?;

        let remote = Arc::new(SupabaseStorage::new(
            http_client,
            &config.supabase_url,
            config.supabase_key.clone(),
        ));
        let mailer = Arc::new(SmtpMailer::new(
            &config.smtp_host,
            config.smtp_user.clone(),
            config.smtp_pass.clone(),
        )?);
        let ledger = Arc::new(JsonFileLedger::open(config.ledger_path()).await?);

        let application_service = ApplicationService::new(
            remote,
            LocalFallbackStore::new(&config.fallback_dir),
            mailer,
            ledger,
            NotificationSettings {
                from: config.email_from.clone(),
                employer: config.employer_email.clone(),
            },
            config.external_timeout(),
        );
        let job_service = JobService::open(config.jobs_path()).await?;
        let upload_policy =
            UploadPolicy::new(config.max_upload_bytes(), config.data_dir.join("uploads-tmp"));

        Ok(Self {
            application_service,
            job_service,
            upload_policy,
            uploads_dir: config.uploads_dir.clone(),
        })
    }
}
