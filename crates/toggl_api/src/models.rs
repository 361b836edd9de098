//! Time entry records returned by the Toggl Track API.

use serde::Deserialize;

/// A tracked span of time. `stop` is absent and `duration` negative while the timer is still running.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimeEntry {
    pub id: u64,
    #[serde(alias = "wid", default)]
    pub workspace_id: u64,
    #[serde(default)]
    pub billable: bool,
    pub start: String,
    #[serde(default)]
    pub stop: Option<String>,
    pub duration: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub at: Option<String>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl TimeEntry {
    pub fn is_running(&self) -> bool {
        self.duration < 1 || self.stop.is_none()
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
