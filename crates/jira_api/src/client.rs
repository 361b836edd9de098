use crate::auth::basic_auth_header;
use crate::config::JiraConfig;
use crate::error::{JiraError, Result};
use crate::models::{Worklog, WorklogPage, WorklogPayload};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const NOTIFY_USERS_OFF: [(&str, &str); 1] = [("notifyUsers", "false")];

#[derive(Clone)]
pub struct JiraClient {
    http: HttpClient,
    config: JiraConfig,
    limiter: RateLimiter,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    async fn get_with_query<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(Method::GET, path, query, Option::<&Value>::None)
            .await?;
        Self::parse_json(response).await
    }

    async fn send_expect_empty<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, query, body).await?;
        Self::ensure_success(response).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.limiter.hit().await;
        let url = self.url_for(path);
        debug!(%method, %url, "jira request");
        let mut request = self.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(payload) = body {
            request = request.json(payload);
        }
        Ok(request.send().await?)
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(JiraError::from)
        } else {
            Err(Self::error_from(status, response).await)
        }
    }

    async fn ensure_success(response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::error_from(status, response).await)
        }
    }

    async fn error_from(status: StatusCode, response: Response) -> JiraError {
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            JiraError::Authentication(format!("Access denied ({}) - {}", status, body))
        } else {
            JiraError::http(status, body)
        }
    }

    /// Fetches every work log attached to an issue, following `startAt` paging until `total` is reached.
    pub async fn get_issue_worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>> {
        let path = format!("issue/{}/worklog", issue_key);
        let page_size = self.config.page_size.to_string();
        let mut collected: Vec<Worklog> = Vec::new();

        loop {
            let start_at = collected.len().to_string();
            let page: WorklogPage = self
                .get_with_query(
                    &path,
                    &[("startAt", start_at.as_str()), ("maxResults", page_size.as_str())],
                )
                .await?;
            let fetched = page.worklogs.len();
            collected.extend(page.worklogs);

            match page.total {
                Some(total) if fetched > 0 && (collected.len() as u64) < total => continue,
                _ => break,
            }
        }

        debug!(issue_key, count = collected.len(), "loaded work logs");
        Ok(collected)
    }

    pub async fn create_worklog(&self, issue_key: &str, payload: &WorklogPayload) -> Result<()> {
        let path = format!("issue/{}/worklog", issue_key);
        self.send_expect_empty(Method::POST, &path, &NOTIFY_USERS_OFF, Some(payload))
            .await
    }

    pub async fn update_worklog(
        &self,
        issue_key: &str,
        worklog_id: &str,
        payload: &WorklogPayload,
    ) -> Result<()> {
        let path = format!("issue/{}/worklog/{}", issue_key, worklog_id);
        self.send_expect_empty(Method::PUT, &path, &NOTIFY_USERS_OFF, Some(payload))
            .await
    }
}

fn build_http_client(config: &JiraConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        basic_auth_header(&config.username, &config.token)?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(&config.user_agent)?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| JiraError::Other(err.to_string()))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| JiraError::Other(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::JiraClient;
    use crate::config::JiraConfig;
    use crate::error::JiraError;
    use crate::models::WorklogPayload;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &Server) -> JiraClient {
        let config =
            JiraConfig::new(server.url(), "email", "token").with_cooldown(Duration::ZERO);
        JiraClient::new(config).expect("client should build")
    }

    fn payload() -> WorklogPayload {
        WorklogPayload {
            comment: "TogglID: 123 doing work".to_string(),
            time_spent_seconds: 2700,
            started: "2021-04-01T12:26:22.000+0000".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_worklogs_with_basic_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/latest/issue/ISSUE-1/worklog")
            .match_query(Matcher::Any)
            .match_header("authorization", "Basic ZW1haWw6dG9rZW4=")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "worklogs": [
                        { "id": "1", "comment": "TogglID: 123 doing work", "timeSpentSeconds": 900 },
                        { "id": "2", "comment": "TogglID: 456 other work", "timeSpentSeconds": 1800 }
                    ]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let worklogs = client_for(&server)
            .get_issue_worklogs("ISSUE-1")
            .await
            .expect("worklogs should load");

        mock.assert_async().await;
        assert_eq!(worklogs.len(), 2);
        assert_eq!(worklogs[1].id_string(), "2");
        assert_eq!(worklogs[1].time_spent_seconds, 1800);
    }

    #[tokio::test]
    async fn follows_pages_until_total_is_reached() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/rest/api/latest/issue/ISSUE-1/worklog")
            .match_query(Matcher::UrlEncoded("startAt".into(), "0".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "startAt": 0, "maxResults": 1, "total": 2,
                    "worklogs": [{ "id": "1", "comment": "first", "timeSpentSeconds": 900 }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/latest/issue/ISSUE-1/worklog")
            .match_query(Matcher::UrlEncoded("startAt".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "startAt": 1, "maxResults": 1, "total": 2,
                    "worklogs": [{ "id": "2", "comment": "second", "timeSpentSeconds": 900 }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let worklogs = client_for(&server)
            .get_issue_worklogs("ISSUE-1")
            .await
            .expect("worklogs should load");

        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<String> = worklogs.iter().map(|w| w.id_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn create_posts_payload_without_notifying_users() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/api/latest/issue/ISSUE-52/worklog")
            .match_query(Matcher::UrlEncoded("notifyUsers".into(), "false".into()))
            .match_body(Matcher::Json(json!({
                "comment": "TogglID: 123 doing work",
                "timeSpentSeconds": 2700,
                "started": "2021-04-01T12:26:22.000+0000"
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client_for(&server)
            .create_worklog("ISSUE-52", &payload())
            .await
            .expect("create should succeed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_puts_to_the_worklog_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/rest/api/latest/issue/ISSUE-52/worklog/77")
            .match_query(Matcher::UrlEncoded("notifyUsers".into(), "false".into()))
            .match_body(Matcher::PartialJson(json!({ "timeSpentSeconds": 2700 })))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        client_for(&server)
            .update_worklog("ISSUE-52", "77", &payload())
            .await
            .expect("update should succeed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn maps_rejected_credentials_to_authentication_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/api/latest/issue/ISSUE-1/worklog")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("nope")
            .create_async()
            .await;

        let err = client_for(&server)
            .get_issue_worklogs("ISSUE-1")
            .await
            .expect_err("401 must fail");

        assert!(matches!(err, JiraError::Authentication(_)));
    }

    #[tokio::test]
    async fn maps_server_failures_to_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/rest/api/latest/issue/ISSUE-52/worklog")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = client_for(&server)
            .create_worklog("ISSUE-52", &payload())
            .await
            .expect_err("500 must fail");

        match err {
            JiraError::Http { status, message } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
