use async_trait::async_trait;
use std::path::PathBuf;
use tokio::{fs, sync::Mutex};

use crate::error::{Error, Result};
use crate::models::application::ApplicationRecord;

/// Ordered record of submitted applications and their review status.
#[async_trait]
pub trait ApplicationLedger: Send + Sync {
    async fn list(&self) -> Result<Vec<ApplicationRecord>>;
    async fn get(&self, id: &str) -> Result<Option<ApplicationRecord>>;
    async fn append(&self, record: ApplicationRecord) -> Result<()>;
    /// Replaces the record with the same id. `NotFound` when absent.
    async fn update(&self, record: ApplicationRecord) -> Result<()>;
    /// Removes and returns the record. `NotFound` when absent.
    async fn remove(&self, id: &str) -> Result<ApplicationRecord>;
}

/// Ledger kept as a single JSON array document.
///
/// Every read-modify-write holds `write_lock`, so writers inside this process
/// are serialised. Separate processes sharing the file can still lose updates.
pub struct JsonFileLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLedger {
    /// Opens the ledger, creating an empty document if none exists.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if fs::metadata(&path).await.is_err() {
            fs::write(&path, b"[]").await?;
            tracing::info!("Created empty application ledger at {}", path.display());
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_all(&self) -> Result<Vec<ApplicationRecord>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }

    async fn write_all(&self, records: &[ApplicationRecord]) -> Result<()> {
        let data = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ApplicationLedger for JsonFileLedger {
    async fn list(&self) -> Result<Vec<ApplicationRecord>> {
        self.read_all().await
    }

    async fn get(&self, id: &str) -> Result<Option<ApplicationRecord>> {
        Ok(self.read_all().await?.into_iter().find(|r| r.id == id))
    }

    async fn append(&self, record: ApplicationRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(Error::Internal(format!(
                "Application {} is already recorded",
                record.id
            )));
        }
        records.push(record);
        self.write_all(&records).await
    }

    async fn update(&self, record: ApplicationRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        *slot = record;
        self.write_all(&records).await
    }

    async fn remove(&self, id: &str) -> Result<ApplicationRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        let removed = records.remove(index);
        self.write_all(&records).await?;
        Ok(removed)
    }
}
