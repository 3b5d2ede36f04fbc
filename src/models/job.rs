use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub state: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub category: String,
    pub salary: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fields added through updates that have no dedicated column.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
