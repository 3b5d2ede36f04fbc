use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Short machine-facing summary used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Multipart(_) => "BadRequest",
            Error::Validation(_) => "ValidationError",
            Error::UploadRejected(_) => "UploadRejected",
            Error::InvalidStatus(_) => "InvalidStatusError",
            Error::NotFound(_) => "NotFoundError",
            Error::Persistence(_) => "PersistenceError",
            _ => "InternalError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Multipart(err) => err.status(),
            Error::BadRequest(_)
            | Error::Validation(_)
            | Error::UploadRejected(_)
            | Error::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let details = match &self {
            Error::BadRequest(msg)
            | Error::UploadRejected(msg)
            | Error::InvalidStatus(msg)
            | Error::NotFound(msg)
            | Error::Persistence(msg) => msg.clone(),
            Error::Validation(_) => "All required fields must be filled".to_string(),
            Error::Multipart(err) => err.to_string(),
            other => {
                tracing::error!(error = %other, "Request failed");
                other.to_string()
            }
        };

        let body = Json(json!({ "error": self.kind(), "details": details }));
        (status, body).into_response()
    }
}
