use crate::models::WorklogAuthor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    pub id: Value,
    pub issue_id: Option<Value>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub author: Option<WorklogAuthor>,
    pub update_author: Option<WorklogAuthor>,
    pub comment: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub started: Option<String>,
    pub time_spent: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

impl Worklog {
    /// Returns the work log id as a path segment, whether Jira sent it as a string or a number.
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(value) => value.clone(),
            other => other.to_string(),
        }
    }
}

/// One page of the `issue/{key}/worklog` listing.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub start_at: u64,
    pub max_results: Option<u64>,
    pub total: Option<u64>,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

/// Request body shared by work log creation and update.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPayload {
    pub comment: String,
    pub time_spent_seconds: i64,
    pub started: String,
}
