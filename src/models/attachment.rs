use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;

/// An uploaded resume held in a temp file for the lifetime of one request.
///
/// The temp file is removed when the attachment is discarded or dropped,
/// unless it was moved somewhere durable with [`ResumeAttachment::persist_to`].
#[derive(Debug)]
pub struct ResumeAttachment {
    pub original_name: String,
    pub stored_name: String,
    pub size: u64,
    pub content_type: String,
    pub temp_path: PathBuf,
    released: bool,
}

impl ResumeAttachment {
    pub fn new(
        original_name: String,
        stored_name: String,
        size: u64,
        content_type: String,
        temp_path: PathBuf,
    ) -> Self {
        Self {
            original_name,
            stored_name,
            size,
            content_type,
            temp_path,
            released: false,
        }
    }

    pub async fn read(&self) -> Result<Bytes> {
        let data = fs::read(&self.temp_path).await?;
        Ok(Bytes::from(data))
    }

    pub async fn discard(mut self) {
        if let Err(e) = fs::remove_file(&self.temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!("Error deleting temp upload {}: {}", self.temp_path.display(), e);
            }
        }
        self.released = true;
    }

    /// Moves the temp file into `dir`, keeping its stored name.
    pub async fn persist_to(mut self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).await?;
        let dest = dir.join(&self.stored_name);
        if fs::rename(&self.temp_path, &dest).await.is_err() {
            // rename fails across filesystems
            fs::copy(&self.temp_path, &dest).await?;
            let _ = fs::remove_file(&self.temp_path).await;
        }
        self.released = true;
        Ok(dest)
    }
}

// Normal exits go through `discard` or `persist_to`; this only catches
// attachments dropped by an early `?` return or a panic.
impl Drop for ResumeAttachment {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}
