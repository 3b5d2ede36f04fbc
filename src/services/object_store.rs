use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::info;

use crate::error::{Error, Result};

pub const RESUMES_BUCKET: &str = "resumes";
pub const APPLICATIONS_BUCKET: &str = "applications";

/// Remote object storage used as the primary home for resumes and
/// application snapshots.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the key the store recorded.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String>;
}

/// Supabase Storage over its REST API.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(client: Client, base_url: &str, service_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(&json!({ "id": bucket, "name": bucket, "public": false }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Created storage bucket '{}'", bucket);
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT || body.to_lowercase().contains("already exists") {
            return Ok(());
        }
        Err(Error::Internal(format!(
            "Bucket creation failed with status {}: {}",
            status, body
        )))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, key);
        let response = self
            .request(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        Ok(response)
    }
}

fn is_missing_bucket(status: StatusCode, body: &str) -> bool {
    let body = body.to_lowercase();
    status == StatusCode::NOT_FOUND || body.contains("bucket not found")
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String> {
        let mut response = self
            .put_object(bucket, key, bytes.clone(), content_type)
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !is_missing_bucket(status, &body) {
                return Err(Error::Internal(format!(
                    "Upload to {}/{} failed with status {}: {}",
                    bucket, key, status, body
                )));
            }
            self.create_bucket(bucket).await?;
            response = self.put_object(bucket, key, bytes, content_type).await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::Internal(format!(
                    "Upload to {}/{} failed with status {}: {}",
                    bucket, key, status, body
                )));
            }
        }

        Ok(key.to_string())
    }
}
