use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::{
    dto::{
        application_dto::{
            ApplicationListQuery, ApplicationListResponse, UpdateStatusRequest,
            UpdateStatusResponse,
        },
        job_dto::{CreateJobPayload, JobListResponse, JobResponse},
    },
    error::Result,
    utils::extract::ApiJson,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/applications",
    params(
        ("email" = Option<String>, Query, description = "Only applications from this applicant")
    ),
    responses(
        (status = 200, description = "Applications, newest first", body = Json<ApplicationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let applications = state
        .application_service
        .list(query.email.as_deref())
        .await?;
    Ok(Json(ApplicationListResponse {
        total: applications.len(),
        applications,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/applications/{id}",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get(&id).await?;
    Ok(Json(json!({ "application": application })))
}

#[utoipa::path(
    put,
    path = "/api/admin/applications/{id}/status",
    params(
        ("id" = String, Path, description = "Application ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Json<UpdateStatusResponse>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    let change = state
        .application_service
        .set_status(&id, &payload.status)
        .await?;

    let (message, application) = if change.removed {
        (
            format!("Application {} accepted", id),
            None,
        )
    } else {
        (
            format!("Application {} marked {}", id, change.record.status),
            Some(change.record),
        )
    };

    Ok(Json(UpdateStatusResponse {
        message,
        removed: change.removed,
        email_sent: change.email_sent,
        application,
    }))
}

#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list().await?;
    Ok(Json(JobListResponse { jobs }))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 200, description = "Job added", body = Json<JobResponse>),
        (status = 400, description = "Missing fields")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(payload).await?;
    Ok(Json(JobResponse {
        message: "Job added successfully!".to_string(),
        job,
    }))
}

#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(changes): ApiJson<JsonValue>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.update(id, changes).await?;
    Ok(Json(JobResponse {
        message: "Job updated successfully!".to_string(),
        job,
    }))
}

#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.job_service.delete(id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully!" })))
}
