use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::job::Job;

fn deserialize_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Option::<TagsOrCsv>::deserialize(deserializer)? {
        Some(TagsOrCsv::List(tags)) => tags,
        Some(TagsOrCsv::Csv(s)) if !s.is_empty() => s.split(',').map(|t| t.to_string()).collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub job_type: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub salary: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub message: String,
    pub job: Job,
}
