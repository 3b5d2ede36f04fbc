use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::ApplicationForm;
use crate::error::{Error, Result};
use crate::models::application::{ApplicationRecord, ApplicationStatus, StorageLocations};
use crate::models::attachment::ResumeAttachment;
use crate::services::email_templates::{ApplicantConfirmation, EmployerAlert, StatusUpdate};
use crate::services::fallback_store::LocalFallbackStore;
use crate::services::ledger::ApplicationLedger;
use crate::services::mailer::{EmailAttachment, Mailer, OutgoingEmail};
use crate::services::object_store::{ObjectStore, APPLICATIONS_BUCKET, RESUMES_BUCKET};
use crate::utils::{keys, time};

/// Result of one non-fatal stage of the intake pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Skipped,
    Succeeded,
    Failed(String),
}

impl StageOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, StageOutcome::Succeeded)
    }

    pub fn failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub resume_upload: StageOutcome,
    pub metadata_upload: StageOutcome,
    pub local_fallback: StageOutcome,
    pub applicant_email: StageOutcome,
    pub employer_email: StageOutcome,
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub storage: StorageLocations,
    pub email_sent: bool,
    pub stages: StageReport,
    /// Background ledger append. Yields the stored record, or `None` when the
    /// append failed (the failure is logged, never returned).
    pub ledger_append: JoinHandle<Option<ApplicationRecord>>,
}

#[derive(Debug, Clone)]
pub struct StatusChange {
    pub record: ApplicationRecord,
    pub removed: bool,
    pub email_sent: bool,
}

/// Sender and employer addresses for notification emails.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub from: String,
    /// Falls back to the applicant's own address when unset.
    pub employer: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationSnapshot<'a> {
    job_id: &'a Option<JsonValue>,
    job_title: &'a str,
    company_name: &'a Option<String>,
    applicant_name: &'a str,
    applicant_email: &'a str,
    applicant_phone: &'a str,
    applicant_location: &'a Option<String>,
    cover_letter: &'a str,
    resume_path: Option<String>,
    resume_original_name: Option<&'a str>,
    resume_size: Option<u64>,
    resume_content_type: Option<&'a str>,
    submitted_at: DateTime<Utc>,
}

struct Persisted {
    storage: StorageLocations,
    resume_upload: StageOutcome,
    metadata_upload: StageOutcome,
    local_fallback: StageOutcome,
}

#[derive(Clone)]
pub struct ApplicationService {
    remote: Arc<dyn ObjectStore>,
    fallback: LocalFallbackStore,
    mailer: Arc<dyn Mailer>,
    ledger: Arc<dyn ApplicationLedger>,
    notify: NotificationSettings,
    io_timeout: Duration,
}

impl ApplicationService {
    pub fn new(
        remote: Arc<dyn ObjectStore>,
        fallback: LocalFallbackStore,
        mailer: Arc<dyn Mailer>,
        ledger: Arc<dyn ApplicationLedger>,
        notify: NotificationSettings,
        io_timeout: Duration,
    ) -> Self {
        Self {
            remote,
            fallback,
            mailer,
            ledger,
            notify,
            io_timeout,
        }
    }

    /// Runs the intake pipeline for one application.
    ///
    /// Only invalid input and exhaustion of every storage path are errors;
    /// remote storage and email failures are reported in the receipt.
    /// The temp resume file is gone when this returns.
    pub async fn submit(
        &self,
        form: ApplicationForm,
        resume: Option<ResumeAttachment>,
    ) -> Result<SubmissionReceipt> {
        if let Err(e) = form.validate() {
            if let Some(resume) = resume {
                resume.discard().await;
            }
            return Err(e.into());
        }

        let outcome = self.persist_and_notify(&form, resume.as_ref()).await;
        if let Some(resume) = resume {
            resume.discard().await;
        }
        let (persisted, applicant_email, employer_email) = outcome?;

        let email_sent = applicant_email.succeeded() && employer_email.succeeded();
        let ledger_append = self.spawn_ledger_append(form, persisted.storage.clone());

        Ok(SubmissionReceipt {
            storage: persisted.storage,
            email_sent,
            stages: StageReport {
                resume_upload: persisted.resume_upload,
                metadata_upload: persisted.metadata_upload,
                local_fallback: persisted.local_fallback,
                applicant_email,
                employer_email,
            },
            ledger_append,
        })
    }

    async fn persist_and_notify(
        &self,
        form: &ApplicationForm,
        resume: Option<&ResumeAttachment>,
    ) -> Result<(Persisted, StageOutcome, StageOutcome)> {
        let resume = match resume {
            Some(r) => Some((r, r.read().await?)),
            None => None,
        };

        let persisted = self.persist(form, resume.as_ref()).await?;

        let attachments: Vec<EmailAttachment> = resume
            .iter()
            .map(|(r, data)| EmailAttachment {
                filename: r.original_name.clone(),
                content_type: r.content_type.clone(),
                data: data.clone(),
            })
            .collect();
        let resume_name = resume.as_ref().map(|(r, _)| r.original_name.as_str());

        let confirmation = ApplicantConfirmation { form, resume_name };
        let applicant_email = self
            .deliver(OutgoingEmail {
                from: self.notify.from.clone(),
                to: form.applicant_email.clone(),
                subject: confirmation.subject(),
                html: confirmation.to_string(),
                attachments: attachments.clone(),
            })
            .await;

        let alert = EmployerAlert { form, resume_name };
        let employer_email = self
            .deliver(OutgoingEmail {
                from: self.notify.from.clone(),
                to: self
                    .notify
                    .employer
                    .clone()
                    .unwrap_or_else(|| form.applicant_email.clone()),
                subject: alert.subject(),
                html: alert.to_string(),
                attachments,
            })
            .await;

        Ok((persisted, applicant_email, employer_email))
    }

    async fn persist(
        &self,
        form: &ApplicationForm,
        resume: Option<&(&ResumeAttachment, Bytes)>,
    ) -> Result<Persisted> {
        let submitted_at = time::now();
        let stamp = time::millis(submitted_at);
        let token = keys::submission_token();
        let resume_key = resume.map(|(r, _)| {
            keys::resume_key(stamp, &token, &form.applicant_email, &r.original_name)
        });
        let application_key = keys::application_key(stamp, &token, &form.applicant_email);

        let (resume_remote, resume_upload) = match (resume, &resume_key) {
            (Some((r, data)), Some(key)) => {
                match self
                    .upload(RESUMES_BUCKET, key, data.clone(), &r.content_type)
                    .await
                {
                    Ok(location) => {
                        info!("Stored resume remotely at {}", location);
                        (Some(location), StageOutcome::Succeeded)
                    }
                    Err(e) => {
                        warn!(error = %e, "Resume upload failed");
                        (None, StageOutcome::Failed(e.to_string()))
                    }
                }
            }
            _ => (None, StageOutcome::Skipped),
        };

        let mut snapshot = ApplicationSnapshot {
            job_id: &form.job_id,
            job_title: &form.job_title,
            company_name: &form.company_name,
            applicant_name: &form.applicant_name,
            applicant_email: &form.applicant_email,
            applicant_phone: &form.applicant_phone,
            applicant_location: &form.applicant_location,
            cover_letter: &form.cover_letter,
            resume_path: resume_remote.clone(),
            resume_original_name: resume.map(|(r, _)| r.original_name.as_str()),
            resume_size: resume.map(|(r, _)| r.size),
            resume_content_type: resume.map(|(r, _)| r.content_type.as_str()),
            submitted_at,
        };

        let snapshot_bytes = Bytes::from(serde_json::to_vec_pretty(&snapshot)?);
        let (application_remote, metadata_upload) = match self
            .upload(
                APPLICATIONS_BUCKET,
                &application_key,
                snapshot_bytes,
                "application/json",
            )
            .await
        {
            Ok(location) => {
                info!("Stored application snapshot remotely at {}", location);
                (Some(location), StageOutcome::Succeeded)
            }
            Err(e) => {
                warn!(error = %e, "Application snapshot upload failed");
                (None, StageOutcome::Failed(e.to_string()))
            }
        };

        if resume_remote.is_some() || application_remote.is_some() {
            return Ok(Persisted {
                storage: StorageLocations {
                    resume_path: resume_remote,
                    application_path: application_remote,
                },
                resume_upload,
                metadata_upload,
                local_fallback: StageOutcome::Skipped,
            });
        }

        warn!("Remote storage unavailable, writing application to local fallback");
        let resume_local = match (resume, &resume_key) {
            (Some((_, data)), Some(key)) => Some(
                self.fallback
                    .save_resume(key, data)
                    .await
                    .map_err(log_fallback_failure)?,
            ),
            _ => None,
        };
        snapshot.resume_path = resume_local.clone();
        let snapshot_bytes = serde_json::to_vec_pretty(&snapshot)?;
        let application_local = self
            .fallback
            .save_application(&application_key, &snapshot_bytes)
            .await
            .map_err(log_fallback_failure)?;

        Ok(Persisted {
            storage: StorageLocations {
                resume_path: resume_local,
                application_path: Some(application_local),
            },
            resume_upload,
            metadata_upload,
            local_fallback: StageOutcome::Succeeded,
        })
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String> {
        match timeout(self.io_timeout, self.remote.upload(bucket, key, data, content_type)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Internal(format!(
                "Upload to '{}' timed out after {:?}",
                bucket, self.io_timeout
            ))),
        }
    }

    async fn deliver(&self, email: OutgoingEmail) -> StageOutcome {
        let to = email.to.clone();
        let result = match timeout(self.io_timeout, self.mailer.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Email(format!(
                "Send timed out after {:?}",
                self.io_timeout
            ))),
        };
        match result {
            Ok(()) => {
                info!("Email sent to {}", to);
                StageOutcome::Succeeded
            }
            Err(e) => {
                warn!(error = %e, "Could not send email to {}", to);
                StageOutcome::Failed(e.to_string())
            }
        }
    }

    fn spawn_ledger_append(
        &self,
        form: ApplicationForm,
        storage: StorageLocations,
    ) -> JoinHandle<Option<ApplicationRecord>> {
        let ledger = self.ledger.clone();
        tokio::spawn(async move {
            let now = time::now();
            let record = ApplicationRecord {
                id: Uuid::new_v4().to_string(),
                status: ApplicationStatus::Pending,
                job_id: form.job_id,
                job_title: form.job_title,
                company_name: form.company_name,
                applicant_name: form.applicant_name,
                applicant_email: form.applicant_email,
                applicant_phone: form.applicant_phone,
                applicant_location: form.applicant_location,
                cover_letter: form.cover_letter,
                storage,
                created_at: now,
                updated_at: now,
            };
            match ledger.append(record.clone()).await {
                Ok(()) => {
                    info!("Recorded application {} in ledger", record.id);
                    Some(record)
                }
                Err(e) => {
                    error!(error = %e, "Failed to append application to ledger");
                    None
                }
            }
        })
    }

    /// Newest first, optionally filtered by applicant email (case-insensitive).
    pub async fn list(&self, email: Option<&str>) -> Result<Vec<ApplicationRecord>> {
        let mut records = self.ledger.list().await?;
        if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
            records.retain(|r| r.applicant_email.eq_ignore_ascii_case(email));
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<ApplicationRecord> {
        self.ledger
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    /// Moves an application to `new_status`. Accepted applications leave the
    /// ledger; rejected ones stay but accept no further change of status.
    pub async fn set_status(&self, id: &str, new_status: &str) -> Result<StatusChange> {
        let status: ApplicationStatus = new_status.parse()?;
        let mut record = self.get(id).await?;

        if record.status == ApplicationStatus::Rejected && status != ApplicationStatus::Rejected {
            return Err(Error::InvalidStatus(format!(
                "Application {} was rejected and cannot become {}",
                id, status
            )));
        }

        record.status = status;
        record.updated_at = time::now();

        if status == ApplicationStatus::Accepted {
            let email_sent = self.notify_status(&record).await;
            self.ledger.remove(id).await?;
            info!("Application {} accepted and removed from ledger", id);
            return Ok(StatusChange {
                record,
                removed: true,
                email_sent,
            });
        }

        self.ledger.update(record.clone()).await?;
        info!("Application {} marked {}", id, status);
        let email_sent = self.notify_status(&record).await;
        Ok(StatusChange {
            record,
            removed: false,
            email_sent,
        })
    }

    async fn notify_status(&self, record: &ApplicationRecord) -> bool {
        let update = StatusUpdate { record };
        self.deliver(OutgoingEmail {
            from: self.notify.from.clone(),
            to: record.applicant_email.clone(),
            subject: update.subject(),
            html: update.to_string(),
            attachments: Vec::new(),
        })
        .await
        .succeeded()
    }
}

fn log_fallback_failure(e: Error) -> Error {
    error!(error = %e, "Local fallback write failed");
    match e {
        Error::Persistence(_) => e,
        other => Error::Persistence(other.to_string()),
    }
}
