mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use jobfinder_backend::error::Error;
use jobfinder_backend::models::application::ApplicationStatus;
use jobfinder_backend::services::application_service::StageOutcome;
use jobfinder_backend::services::fallback_store::LOCAL_PREFIX;
use jobfinder_backend::services::object_store::{APPLICATIONS_BUCKET, RESUMES_BUCKET};
use jobfinder_backend::services::ledger::ApplicationLedger;

#[tokio::test]
async fn submission_without_file_succeeds_and_records_pending() {
    let mailer = Arc::new(RecordingMailer::default());
    let h = harness(Arc::new(working_remote()), mailer.clone()).await;

    let receipt = h.service.submit(sample_form(), None).await.unwrap();
    assert_eq!(receipt.storage.resume_path, None);
    assert!(receipt
        .storage
        .application_path
        .as_deref()
        .unwrap()
        .starts_with("applications/"));
    assert!(receipt.email_sent);
    assert_eq!(receipt.stages.resume_upload, StageOutcome::Skipped);
    assert_eq!(receipt.stages.local_fallback, StageOutcome::Skipped);
    assert_eq!(mailer.recipients(), vec!["a@x.com", EMPLOYER]);

    let record = receipt.ledger_append.await.unwrap().expect("ledger record");
    assert_eq!(record.status, ApplicationStatus::Pending);
    assert_eq!(record.storage, receipt.storage);

    let stored = h.ledger.list().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, record.id);
    assert_eq!(stored[0].job_title, "Engineer");
}

#[tokio::test]
async fn resume_is_uploaded_and_attached_to_both_emails() {
    let mailer = Arc::new(RecordingMailer::default());
    let h = harness(Arc::new(working_remote()), mailer.clone()).await;
    let resume = sample_resume(&h.dir.path().join("tmp"));
    let temp_path = resume.temp_path.clone();

    let receipt = h.service.submit(sample_form(), Some(resume)).await.unwrap();
    let resume_path = receipt.storage.resume_path.clone().unwrap();
    assert!(resume_path.starts_with("resumes/"));
    assert!(resume_path.ends_with("_a_x.com_cv.pdf"));
    assert_eq!(receipt.stages.resume_upload, StageOutcome::Succeeded);
    assert!(!temp_path.exists());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    for email in sent.iter() {
        assert_eq!(email.attachments.len(), 1);
        assert_eq!(email.attachments[0].filename, "cv.pdf");
        assert_eq!(&email.attachments[0].data[..], b"%PDF-1.4 resume");
    }
    assert_eq!(sent[0].subject, "Application Confirmation - Engineer at Acme");
    assert_eq!(sent[1].subject, "New Job Application - Engineer");
}

#[tokio::test]
async fn remote_outage_falls_back_to_local_storage() {
    let mailer = Arc::new(RecordingMailer::default());
    let h = harness(Arc::new(failing_remote()), mailer).await;
    let resume = sample_resume(&h.dir.path().join("tmp"));

    let receipt = h.service.submit(sample_form(), Some(resume)).await.unwrap();
    assert!(receipt.stages.resume_upload.failed());
    assert!(receipt.stages.metadata_upload.failed());
    assert_eq!(receipt.stages.local_fallback, StageOutcome::Succeeded);

    let resume_path = receipt.storage.resume_path.clone().unwrap();
    let application_path = receipt.storage.application_path.clone().unwrap();
    assert!(is_local(&resume_path));
    assert!(is_local(&application_path));

    let resume_file = resume_path.trim_start_matches(LOCAL_PREFIX);
    assert_eq!(std::fs::read(resume_file).unwrap(), b"%PDF-1.4 resume");
    assert!(resume_file.starts_with(h.fallback_dir.join("resumes").to_str().unwrap()));

    let snapshot: serde_json::Value = serde_json::from_slice(
        &std::fs::read(application_path.trim_start_matches(LOCAL_PREFIX)).unwrap(),
    )
    .unwrap();
    assert_eq!(snapshot["applicantEmail"], "a@x.com");
    assert_eq!(snapshot["resumePath"], resume_path.as_str());

    let record = receipt.ledger_append.await.unwrap().unwrap();
    assert_eq!(record.storage, receipt.storage);
}

#[tokio::test]
async fn remote_outage_without_file_keeps_resume_path_empty() {
    let h = harness(
        Arc::new(failing_remote()),
        Arc::new(RecordingMailer::default()),
    )
    .await;

    let receipt = h.service.submit(sample_form(), None).await.unwrap();
    assert_eq!(receipt.storage.resume_path, None);
    assert!(is_local(receipt.storage.application_path.as_deref().unwrap()));
}

#[tokio::test]
async fn stalled_remote_is_treated_as_failure() {
    let h = harness(Arc::new(StalledRemote), Arc::new(RecordingMailer::default())).await;

    let receipt = h.service.submit(sample_form(), None).await.unwrap();
    assert!(receipt.stages.metadata_upload.failed());
    assert_eq!(receipt.stages.local_fallback, StageOutcome::Succeeded);
    assert!(is_local(receipt.storage.application_path.as_deref().unwrap()));
}

#[tokio::test]
async fn failed_local_fallback_is_a_persistence_error_without_ledger_entry() {
    let mailer = Arc::new(RecordingMailer::default());
    let h = harness_without_fallback(Arc::new(failing_remote()), mailer.clone()).await;
    let resume = sample_resume(&h.dir.path().join("tmp"));
    let temp_path = resume.temp_path.clone();

    let err = h
        .service
        .submit(sample_form(), Some(resume))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(!temp_path.exists());
    assert!(mailer.recipients().is_empty());
    assert!(h.ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn email_failure_is_soft() {
    let mailer = Arc::new(RecordingMailer::failing());
    let h = harness(Arc::new(working_remote()), mailer.clone()).await;

    let receipt = h.service.submit(sample_form(), None).await.unwrap();
    assert!(!receipt.email_sent);
    assert!(receipt.stages.applicant_email.failed());
    assert!(receipt.stages.employer_email.failed());
    assert_eq!(mailer.recipients().len(), 2);
    assert!(receipt.storage.application_path.is_some());
    assert!(receipt.ledger_append.await.unwrap().is_some());
}

#[tokio::test]
async fn one_failed_email_clears_email_sent() {
    let mut relay = MockRelay::new();
    relay.expect_send().times(2).returning(|email| {
        if email.to == EMPLOYER {
            Err(Error::Email("mailbox full".into()))
        } else {
            Ok(())
        }
    });
    let h = harness(Arc::new(working_remote()), Arc::new(relay)).await;

    let receipt = h.service.submit(sample_form(), None).await.unwrap();
    assert!(receipt.stages.applicant_email.succeeded());
    assert!(receipt.stages.employer_email.failed());
    assert!(!receipt.email_sent);
}

#[tokio::test]
async fn missing_required_field_rejects_before_any_side_effect() {
    let mut remote = MockRemote::new();
    remote.expect_upload().times(0);
    let mut relay = MockRelay::new();
    relay.expect_send().times(0);
    let h = harness(Arc::new(remote), Arc::new(relay)).await;
    let resume = sample_resume(&h.dir.path().join("tmp"));
    let temp_path = resume.temp_path.clone();

    let mut form = sample_form();
    form.cover_letter.clear();

    let err = h.service.submit(form, Some(resume)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!temp_path.exists());
    assert!(h.ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn resume_upload_failure_alone_skips_fallback() {
    let h = harness(
        Arc::new(remote_failing_bucket(RESUMES_BUCKET)),
        Arc::new(RecordingMailer::default()),
    )
    .await;
    let resume = sample_resume(&h.dir.path().join("tmp"));
    let temp_path = resume.temp_path.clone();

    let receipt = h.service.submit(sample_form(), Some(resume)).await.unwrap();
    assert!(receipt.stages.resume_upload.failed());
    assert_eq!(receipt.stages.metadata_upload, StageOutcome::Succeeded);
    assert_eq!(receipt.stages.local_fallback, StageOutcome::Skipped);
    assert_eq!(receipt.storage.resume_path, None);
    assert!(receipt
        .storage
        .application_path
        .as_deref()
        .unwrap()
        .starts_with("applications/"));
    assert!(!h.fallback_dir.exists());
    assert!(!temp_path.exists());
}

#[tokio::test]
async fn metadata_upload_failure_alone_skips_fallback() {
    let h = harness(
        Arc::new(remote_failing_bucket(APPLICATIONS_BUCKET)),
        Arc::new(RecordingMailer::default()),
    )
    .await;
    let resume = sample_resume(&h.dir.path().join("tmp"));

    let receipt = h.service.submit(sample_form(), Some(resume)).await.unwrap();
    assert_eq!(receipt.stages.resume_upload, StageOutcome::Succeeded);
    assert!(receipt.stages.metadata_upload.failed());
    assert_eq!(receipt.stages.local_fallback, StageOutcome::Skipped);
    assert!(receipt
        .storage
        .resume_path
        .as_deref()
        .unwrap()
        .starts_with("resumes/"));
    assert_eq!(receipt.storage.application_path, None);
    assert!(!h.fallback_dir.exists());
}

#[tokio::test]
async fn concurrent_same_applicant_fallbacks_keep_every_snapshot() {
    let h = harness(
        Arc::new(failing_remote()),
        Arc::new(RecordingMailer::default()),
    )
    .await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let service = h.service.clone();
            tokio::spawn(async move { service.submit(sample_form(), None).await })
        })
        .collect();

    let mut paths = HashSet::new();
    for task in tasks {
        let receipt = task.await.unwrap().unwrap();
        assert_eq!(receipt.stages.local_fallback, StageOutcome::Succeeded);
        paths.insert(receipt.storage.application_path.clone().unwrap());
        receipt.ledger_append.await.unwrap().unwrap();
    }
    assert_eq!(paths.len(), 20);

    let snapshots = std::fs::read_dir(h.fallback_dir.join("applications"))
        .unwrap()
        .count();
    assert_eq!(snapshots, 20);

    let recorded: HashSet<_> = h
        .ledger
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|r| r.storage.application_path)
        .collect();
    assert_eq!(recorded, paths);
}
