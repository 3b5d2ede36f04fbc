use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(Error::InvalidStatus(format!(
                "Status must be one of pending, accepted, rejected (got '{}')",
                s
            ))),
        }
    }
}

/// Where the resume and the metadata snapshot ended up. Each path is a
/// remote object key, a `local:`-prefixed filesystem path, or absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLocations {
    pub resume_path: Option<String>,
    pub application_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub job_id: Option<JsonValue>,
    pub job_title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    #[serde(default)]
    pub applicant_location: Option<String>,
    pub cover_letter: String,
    #[serde(default)]
    pub storage: StorageLocations,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
