use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

use crate::error::{Error, Result};

pub const LOCAL_PREFIX: &str = "local:";

/// Local-disk storage used when the remote store is unreachable.
#[derive(Clone, Debug)]
pub struct LocalFallbackStore {
    base: PathBuf,
}

impl LocalFallbackStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.base.join("resumes")
    }

    pub fn applications_dir(&self) -> PathBuf {
        self.base.join("applications")
    }

    async fn write(dir: PathBuf, name: &str, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Persistence(format!("Cannot create {}: {}", dir.display(), e)))?;
        let path = dir.join(name);
        let write_err =
            |e: std::io::Error| Error::Persistence(format!("Cannot write {}: {}", path.display(), e));
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(write_err)?;
        file.write_all(data).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(local_location(&path))
    }

    pub async fn save_resume(&self, key: &str, data: &[u8]) -> Result<String> {
        Self::write(self.resumes_dir(), key, data).await
    }

    pub async fn save_application(&self, key: &str, snapshot: &[u8]) -> Result<String> {
        Self::write(self.applications_dir(), key, snapshot).await
    }
}

pub fn local_location(path: &Path) -> String {
    format!("{}{}", LOCAL_PREFIX, path.display())
}
