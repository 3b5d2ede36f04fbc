use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{fs, sync::Mutex};

use crate::dto::job_dto::CreateJobPayload;
use crate::error::{Error, Result};
use crate::models::job::Job;

const FIRST_JOB_ID: i64 = 1000;

/// Job listings kept as one JSON array document.
#[derive(Clone)]
pub struct JobService {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JobService {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if fs::metadata(&path).await.is_err() {
            fs::write(&path, b"[]").await?;
        }
        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    async fn read_jobs(&self) -> Result<Vec<Job>> {
        match fs::read(&self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_jobs(&self, jobs: &[Job]) -> Result<()> {
        let data = serde_json::to_vec_pretty(jobs)?;
        fs::write(&self.path, data).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Job>> {
        self.read_jobs().await
    }

    pub async fn create(&self, payload: CreateJobPayload) -> Result<Job> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_jobs().await?;
        let id = jobs
            .iter()
            .map(|j| j.id)
            .max()
            .map(|max| max + 1)
            .unwrap_or(FIRST_JOB_ID);

        let job = Job {
            id,
            title: payload.title,
            company: payload.company,
            location: payload.location,
            state: payload.state,
            job_type: payload.job_type,
            category: payload.category,
            salary: payload.salary,
            description: payload.description,
            tags: payload.tags,
            extra: Map::new(),
        };
        jobs.push(job.clone());
        self.write_jobs(&jobs).await?;
        tracing::info!("Added job {} ({})", job.id, job.title);
        Ok(job)
    }

    /// Shallow-merges `changes` into the stored job. The id never changes.
    pub async fn update(&self, id: i64, changes: JsonValue) -> Result<Job> {
        let JsonValue::Object(changes) = changes else {
            return Err(Error::BadRequest("Job update must be a JSON object".into()));
        };

        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_jobs().await?;
        let slot = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        let JsonValue::Object(mut merged) = serde_json::to_value(&*slot)? else {
            return Err(Error::Internal("Job did not serialize to an object".into()));
        };
        merged.extend(changes);
        merged.insert("id".into(), JsonValue::from(id));
        let updated: Job = serde_json::from_value(JsonValue::Object(merged))
            .map_err(|e| Error::BadRequest(format!("Invalid job fields: {}", e)))?;

        *slot = updated.clone();
        self.write_jobs(&jobs).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_jobs().await?;
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        if jobs.len() == before {
            return Err(Error::NotFound("Job not found".into()));
        }
        self.write_jobs(&jobs).await
    }
}
