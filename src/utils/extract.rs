use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::Error;

/// `Json` body extractor whose rejections use the crate's error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}
