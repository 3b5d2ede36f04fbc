use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::profile_dto::{ProfileUpdate, ProfileUpdateResponse, ResumeUploadResponse},
    error::{Error, Result},
    utils::{extract::ApiJson, upload::receive_resume},
    AppState,
};

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut resume = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("resumeFile") {
            resume = receive_resume(field, &state.upload_policy).await?;
            if resume.is_some() {
                break;
            }
        }
    }

    let resume = resume.ok_or_else(|| Error::BadRequest("No file uploaded".into()))?;
    let filename = resume.stored_name.clone();
    resume
        .persist_to(&state.uploads_dir.join("resumes"))
        .await?;

    Ok(Json(ResumeUploadResponse {
        message: "Resume uploaded successfully!".to_string(),
        resume_url: format!("/uploads/resumes/{}", filename),
        filename,
    }))
}

#[axum::debug_handler]
pub async fn update_profile(ApiJson(data): ApiJson<ProfileUpdate>) -> impl IntoResponse {
    Json(ProfileUpdateResponse {
        message: "Profile updated successfully!".to_string(),
        data,
    })
}
