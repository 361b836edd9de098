//! Process settings read once at startup from the environment.

use std::env;
use std::time::Duration;

use jira_api::JiraConfig;
use thiserror::Error;
use toggl_api::TogglConfig;

const DEFAULT_LOOKBACK_HOURS: i64 = 24;
/// Upper bound for `SYNC_LOOKBACK_HOURS`: one year.
pub const MAX_LOOKBACK_HOURS: i64 = 24 * 366;
const DEFAULT_JIRA_COOLDOWN_MS: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Everything the sync run needs from the outside world. Built once, then only borrowed.
#[derive(Clone, Debug)]
pub struct Settings {
    pub project_keys: Vec<String>,
    pub toggl_token: String,
    pub toggl_api_base: Option<String>,
    pub jira_base_uri: String,
    pub jira_user: String,
    pub jira_token: String,
    pub jira_cooldown: Duration,
    pub lookback_hours: i64,
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let lookback_hours = match optional("SYNC_LOOKBACK_HOURS") {
            Some(raw) => parse_in_range("SYNC_LOOKBACK_HOURS", &raw, 1, MAX_LOOKBACK_HOURS)?,
            None => DEFAULT_LOOKBACK_HOURS,
        };
        let cooldown_ms = match optional("JIRA_COOLDOWN_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "JIRA_COOLDOWN_MS",
                value: raw,
            })?,
            None => DEFAULT_JIRA_COOLDOWN_MS,
        };

        Ok(Self {
            project_keys: parse_project_keys(lookup("JIRA_PROJECTS").as_deref().unwrap_or("")),
            toggl_token: required("TOGGL_TOKEN")?,
            toggl_api_base: optional("TOGGL_API_BASE"),
            jira_base_uri: required("JIRA_BASE_URI")?,
            jira_user: required("JIRA_USER")?,
            jira_token: required("JIRA_TOKEN")?,
            jira_cooldown: Duration::from_millis(cooldown_ms),
            lookback_hours,
        })
    }

    pub fn toggl_config(&self) -> TogglConfig {
        let config = TogglConfig::new(self.toggl_token.clone());
        match &self.toggl_api_base {
            Some(base) => config.with_base_url(base.clone()),
            None => config,
        }
    }

    pub fn jira_config(&self) -> JiraConfig {
        JiraConfig::new(
            self.jira_base_uri.clone(),
            self.jira_user.clone(),
            self.jira_token.clone(),
        )
        .with_cooldown(self.jira_cooldown)
    }
}

/// Splits a comma-separated prefix list, trimming each entry and dropping empty ones.
pub fn parse_project_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_in_range(
    name: &'static str,
    raw: &str,
    min: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    match raw.parse::<i64>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}
