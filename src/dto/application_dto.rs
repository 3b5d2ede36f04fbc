use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::models::application::{ApplicationRecord, StorageLocations};

/// Text fields of the application form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub job_id: Option<JsonValue>,
    #[validate(length(min = 1))]
    pub job_title: String,
    pub company_name: Option<String>,
    #[validate(length(min = 1))]
    pub applicant_name: String,
    #[validate(length(min = 1))]
    pub applicant_email: String,
    #[validate(length(min = 1))]
    pub applicant_phone: String,
    pub applicant_location: Option<String>,
    #[validate(length(min = 1))]
    pub cover_letter: String,
}

impl ApplicationForm {
    /// Assigns a multipart text field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let value = value.trim().to_string();
        let optional = |v: String| if v.is_empty() { None } else { Some(v) };
        match name {
            "jobId" => {
                self.job_id = optional(value).map(|v| {
                    v.parse::<i64>()
                        .map(JsonValue::from)
                        .unwrap_or(JsonValue::String(v))
                })
            }
            "jobTitle" => self.job_title = value,
            "companyName" => self.company_name = optional(value),
            "applicantName" => self.applicant_name = value,
            "applicantEmail" => self.applicant_email = value,
            "applicantPhone" => self.applicant_phone = value,
            "applicantLocation" => self.applicant_location = optional(value),
            "coverLetter" => self.cover_letter = value,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationResponse {
    pub message: String,
    pub success: bool,
    pub storage: StorageLocations,
    pub email_sent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationListQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub message: String,
    pub removed: bool,
    pub email_sent: bool,
    pub application: Option<ApplicationRecord>,
}
