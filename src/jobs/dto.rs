use serde::{Deserialize, Serialize};

use super::repo_types::{Category, Job};

/// Query for the job list. Absent fields match everything; a category of
/// `all` is the same as no category.
#[derive(Debug, Default, Deserialize)]
pub struct JobFilters {
    pub category: Option<String>,
    pub search: Option<String>,
    /// 0-based; omit to get every match at once.
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub per_page: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub company: String,
    pub category: Category,
    #[serde(default)]
    pub rate: String,
    #[serde(default)]
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: i64,
}
