//! Errors that end a sync run.

use jira_api::JiraError;
use thiserror::Error;
use toggl_api::TogglError;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid project key pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("failed to fetch time entries: {0}")]
    Fetch(#[from] TogglError),
    #[error("failed to set up jira client: {0}")]
    Client(#[from] JiraError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
