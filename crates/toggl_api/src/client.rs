use crate::config::{TogglConfig, API_TOKEN_PASSWORD};
use crate::error::{Result, TogglError};
use crate::models::TimeEntry;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use tracing::{debug, info};

#[derive(Clone)]
pub struct TogglClient {
    http: HttpClient,
    config: TogglConfig,
}

impl TogglClient {
    pub fn new(config: TogglConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    /// Returns the current user's time entries with `start <= entry < end`.
    ///
    /// Any non-success status is returned as an error; there is no retry and no partial result.
    pub async fn get_time_entries(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>> {
        let start_date = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end_date = end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = format!("{}me/time_entries", self.config.api_root());

        info!(%start_date, %end_date, "fetching toggl time entries");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.token, Some(API_TOKEN_PASSWORD))
            .query(&[("start_date", start_date.as_str()), ("end_date", end_date.as_str())])
            .send()
            .await?;
        let entries: Vec<TimeEntry> = Self::parse_json(response).await?;

        debug!(count = entries.len(), "received toggl time entries");
        Ok(entries)
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(TogglError::from);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(TogglError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            Err(TogglError::Http {
                status,
                message: body,
            })
        }
    }
}

fn build_http_client(config: &TogglConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| TogglError::Other(err.to_string()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| TogglError::Other(err.to_string()))
}
