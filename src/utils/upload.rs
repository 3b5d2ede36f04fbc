use axum::extract::multipart::Field;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

use crate::error::{Error, Result};
use crate::models::attachment::ResumeAttachment;
use crate::utils::{keys::sanitize, time};

pub const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const REJECTED_TYPE_MESSAGE: &str = "Only PDF, DOC, and DOCX files are allowed!";

/// Size ceiling and temp location for incoming resume files.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub temp_dir: PathBuf,
}

impl UploadPolicy {
    pub fn new(max_bytes: u64, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            max_bytes,
            temp_dir: temp_dir.into(),
        }
    }
}

/// Both the extension and the declared content type must name a resume format.
pub fn is_allowed_resume(filename: &str, content_type: &str) -> bool {
    let ext_ok = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "pdf" | "doc" | "docx"))
        .unwrap_or(false);
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ext_ok && ALLOWED_RESUME_TYPES.contains(&mime.as_str())
}

fn temp_name(original: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}", time::millis(time::now()), suffix, sanitize(original))
}

/// Streams a resume field to a temp file, enforcing the type filter and the
/// size ceiling. Returns `None` when the field carries no file.
pub async fn receive_resume(
    mut field: Field<'_>,
    policy: &UploadPolicy,
) -> Result<Option<ResumeAttachment>> {
    let original_name = match field.file_name() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => return Ok(None),
    };
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if !is_allowed_resume(&original_name, &content_type) {
        return Err(Error::UploadRejected(REJECTED_TYPE_MESSAGE.to_string()));
    }

    fs::create_dir_all(&policy.temp_dir).await?;
    let stored_name = temp_name(&original_name);
    let temp_path = policy.temp_dir.join(&stored_name);
    let mut file = fs::File::create(&temp_path).await?;
    let mut attachment = ResumeAttachment::new(
        original_name,
        stored_name,
        0,
        content_type,
        temp_path,
    );

    // From here on the attachment owns the temp file; dropping it on any
    // early return deletes the partial upload.
    while let Some(chunk) = field.chunk().await? {
        attachment.size += chunk.len() as u64;
        if attachment.size > policy.max_bytes {
            drop(file);
            attachment.discard().await;
            return Err(Error::UploadRejected(format!(
                "File too large (limit {} MB)",
                policy.max_bytes / (1024 * 1024)
            )));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    if attachment.size == 0 {
        attachment.discard().await;
        return Ok(None);
    }

    Ok(Some(attachment))
}
