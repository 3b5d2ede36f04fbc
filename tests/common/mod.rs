#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use mockall::mock;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use jobfinder_backend::dto::application_dto::ApplicationForm;
use jobfinder_backend::error::{Error, Result};
use jobfinder_backend::models::attachment::ResumeAttachment;
use jobfinder_backend::services::application_service::{ApplicationService, NotificationSettings};
use jobfinder_backend::services::fallback_store::{LocalFallbackStore, LOCAL_PREFIX};
use jobfinder_backend::services::job_service::JobService;
use jobfinder_backend::services::ledger::JsonFileLedger;
use jobfinder_backend::services::mailer::{Mailer, OutgoingEmail};
use jobfinder_backend::services::object_store::ObjectStore;
use jobfinder_backend::utils::upload::UploadPolicy;
use jobfinder_backend::AppState;

pub const EMPLOYER: &str = "hiring@jobfinder.test";

mock! {
    pub Remote {}

    #[async_trait]
    impl ObjectStore for Remote {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            bytes: Bytes,
            content_type: &str,
        ) -> Result<String>;
    }
}

mock! {
    pub Relay {}

    #[async_trait]
    impl Mailer for Relay {
        async fn send(&self, email: OutgoingEmail) -> Result<()>;
    }
}

pub fn is_local(location: &str) -> bool {
    location.starts_with(LOCAL_PREFIX)
}

/// Remote store whose uploads fail for one bucket only.
pub fn remote_failing_bucket(failing: &'static str) -> MockRemote {
    let mut remote = MockRemote::new();
    remote.expect_upload().returning(move |bucket, key, _, _| {
        if bucket == failing {
            Err(Error::Internal(format!("bucket '{}' unreachable", bucket)))
        } else {
            Ok(format!("{}/{}", bucket, key))
        }
    });
    remote
}

pub fn working_remote() -> MockRemote {
    let mut remote = MockRemote::new();
    remote
        .expect_upload()
        .returning(|bucket, key, _, _| Ok(format!("{}/{}", bucket, key)));
    remote
}

pub fn failing_remote() -> MockRemote {
    let mut remote = MockRemote::new();
    remote
        .expect_upload()
        .returning(|_, _, _, _| Err(Error::Internal("storage unreachable".into())));
    remote
}

/// Remote store that never answers within the pipeline timeout.
pub struct StalledRemote;

#[async_trait]
impl ObjectStore for StalledRemote {
    async fn upload(&self, _: &str, key: &str, _: Bytes, _: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(key.to_string())
    }
}

/// Mailer that records every message and optionally fails them all.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        self.sent.lock().unwrap().push(email);
        if self.fail {
            Err(Error::Email("relay refused connection".into()))
        } else {
            Ok(())
        }
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub service: ApplicationService,
    pub ledger: Arc<JsonFileLedger>,
    pub fallback_dir: PathBuf,
}

pub async fn harness(remote: Arc<dyn ObjectStore>, mailer: Arc<dyn Mailer>) -> Harness {
    let dir = TempDir::new().unwrap();
    let fallback_dir = dir.path().join("storage");
    harness_in(dir, fallback_dir, remote, mailer).await
}

/// Harness whose local fallback root is a plain file, so every fallback write fails.
pub async fn harness_without_fallback(
    remote: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let fallback_dir = dir.path().join("storage");
    std::fs::write(&fallback_dir, b"not a directory").unwrap();
    harness_in(dir, fallback_dir, remote, mailer).await
}

async fn harness_in(
    dir: TempDir,
    fallback_dir: PathBuf,
    remote: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
) -> Harness {
    let ledger = Arc::new(
        JsonFileLedger::open(dir.path().join("data/applications.json"))
            .await
            .unwrap(),
    );
    let service = ApplicationService::new(
        remote,
        LocalFallbackStore::new(&fallback_dir),
        mailer,
        ledger.clone(),
        NotificationSettings {
            from: "jobs@jobfinder.test".into(),
            employer: Some(EMPLOYER.into()),
        },
        Duration::from_millis(200),
    );
    Harness {
        dir,
        service,
        ledger,
        fallback_dir,
    }
}

impl Harness {
    pub async fn app_state(&self) -> AppState {
        let uploads_dir = self.dir.path().join("uploads");
        AppState {
            application_service: self.service.clone(),
            job_service: JobService::open(self.dir.path().join("data/jobs.json"))
                .await
                .unwrap(),
            upload_policy: UploadPolicy::new(1024 * 1024, self.dir.path().join("tmp")),
            uploads_dir,
        }
    }
}

pub fn sample_form() -> ApplicationForm {
    let mut form = ApplicationForm::default();
    form.set_field("jobTitle", "Engineer".into());
    form.set_field("companyName", "Acme".into());
    form.set_field("applicantName", "A. Lee".into());
    form.set_field("applicantEmail", "a@x.com".into());
    form.set_field("applicantPhone", "555-0100".into());
    form.set_field("coverLetter", "Hello".into());
    form
}

/// Writes a small PDF to `dir` and wraps it as an uploaded resume.
pub fn sample_resume(dir: &Path) -> ResumeAttachment {
    std::fs::create_dir_all(dir).unwrap();
    let data = b"%PDF-1.4 resume";
    let temp_path = dir.join("1700000000000-42-cv.pdf");
    std::fs::write(&temp_path, data).unwrap();
    ResumeAttachment::new(
        "cv.pdf".into(),
        "1700000000000-42-cv.pdf".into(),
        data.len() as u64,
        "application/pdf".into(),
        temp_path,
    )
}
