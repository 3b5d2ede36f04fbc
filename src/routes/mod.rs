pub mod admin;
pub mod application;
pub mod health;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::AppState;

/// Multipart framing and text fields on top of the largest allowed resume.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.upload_policy.max_bytes as usize + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(&state.uploads_dir);

    let public_api = Router::new()
        .route("/api/apply", post(application::submit_application))
        .route("/api/profile/upload-resume", post(profile::upload_resume))
        .route("/api/profile/update", post(profile::update_profile));

    let admin_api = Router::new()
        .route("/api/admin/applications", get(admin::list_applications))
        .route("/api/admin/applications/:id", get(admin::get_application))
        .route(
            "/api/admin/applications/:id/status",
            put(admin::update_application_status),
        )
        .route(
            "/api/admin/jobs",
            get(admin::list_jobs).post(admin::create_job),
        )
        .route(
            "/api/admin/jobs/:id",
            put(admin::update_job).delete(admin::delete_job),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(admin_api)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
}
