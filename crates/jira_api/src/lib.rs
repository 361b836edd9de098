//! Typed Jira work log client used by the sync job.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::JiraClient;
pub use config::JiraConfig;
pub use error::{JiraError, Result};
pub use models::{Worklog, WorklogAuthor, WorklogPage, WorklogPayload};
