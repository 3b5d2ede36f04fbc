use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::application_dto::{ApplicationForm, SubmitApplicationResponse},
    error::{Error, Result},
    models::attachment::ResumeAttachment,
    utils::upload::{receive_resume, UploadPolicy},
    AppState,
};

const RESUME_FIELD: &str = "resumeFile";

/// Reads the application form. A temp file already written for the resume
/// is removed if any later part of the body fails to parse.
async fn read_application_form(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<(ApplicationForm, Option<ResumeAttachment>)> {
    let mut form = ApplicationForm::default();
    let mut resume: Option<ResumeAttachment> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field: {}", e);
        Error::from(e)
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        if field_name == RESUME_FIELD {
            if resume.is_some() {
                return Err(Error::UploadRejected(
                    "Only one resume file may be uploaded".into(),
                ));
            }
            resume = receive_resume(field, policy).await?;
        } else {
            let value = field.text().await?;
            form.set_field(&field_name, value);
        }
    }

    Ok((form, resume))
}

#[utoipa::path(
    post,
    path = "/api/apply",
    responses(
        (status = 200, description = "Application submitted", body = Json<SubmitApplicationResponse>),
        (status = 400, description = "Missing fields or rejected file"),
        (status = 500, description = "All storage paths failed")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (form, resume) = read_application_form(multipart, &state.upload_policy).await?;
    tracing::info!(
        job_title = %form.job_title,
        has_resume = resume.is_some(),
        "Application received"
    );

    let receipt = state.application_service.submit(form, resume).await?;
    // The ledger append keeps running after the response is sent.
    drop(receipt.ledger_append);

    Ok(Json(SubmitApplicationResponse {
        message: "Application submitted successfully! Check your email for confirmation."
            .to_string(),
        success: true,
        storage: receipt.storage,
        email_sent: receipt.email_sent,
    }))
}
