//! Decides, per time entry and issue, whether a Jira work log must be created, updated or left alone.

use jira_api::{JiraClient, Worklog, WorklogPayload};
use log::{error, info};
use toggl_api::TimeEntry;

use crate::issue_keys::IssueKeyMatcher;
use crate::worklog::{build_payload, comment_references_entry};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueOutcome {
    Created,
    Updated,
    UpToDate,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The timer is still running; nothing was sent.
    SkippedRunning,
    /// No configured project key appears in the description.
    NoIssues,
    /// The entry start could not be parsed, so no body could be built.
    InvalidStart(String),
    Processed(Vec<(String, IssueOutcome)>),
}

/// Returns the first work log on `issue_key` whose comment carries the entry's correlation marker.
pub async fn find_existing_worklog(
    client: &JiraClient,
    issue_key: &str,
    entry: &TimeEntry,
) -> jira_api::Result<Option<Worklog>> {
    let worklogs = client.get_issue_worklogs(issue_key).await?;
    Ok(worklogs.into_iter().find(|worklog| {
        worklog
            .comment
            .as_deref()
            .map(|comment| comment_references_entry(comment, entry.id))
            .unwrap_or(false)
    }))
}

pub struct Reconciler<'a> {
    client: &'a JiraClient,
    matcher: &'a IssueKeyMatcher,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a JiraClient, matcher: &'a IssueKeyMatcher) -> Self {
        Self { client, matcher }
    }

    /// Reconciles one entry against every issue it mentions.
    ///
    /// Issues are handled one after another and each receives the full rounded duration. A failure on
    /// one issue is logged and recorded; it never stops the remaining issues.
    pub async fn reconcile_entry(&self, entry: &TimeEntry) -> EntryOutcome {
        let description = entry.description_or_empty();

        if entry.is_running() {
            info!("{}: Skipped running timer", description);
            return EntryOutcome::SkippedRunning;
        }

        let issue_keys = self.matcher.extract(entry.description.as_deref());
        if issue_keys.is_empty() {
            info!("{}: No supported issue found", description);
            return EntryOutcome::NoIssues;
        }

        let payload = match build_payload(entry) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "{}: Unable to read start time {:?}: {}",
                    description, entry.start, err
                );
                return EntryOutcome::InvalidStart(err.to_string());
            }
        };

        let mut outcomes = Vec::with_capacity(issue_keys.len());
        for issue_key in issue_keys {
            let outcome = match self.reconcile_issue(&issue_key, entry, &payload).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("{}: Unable to sync work log: {}", issue_key, err);
                    IssueOutcome::Failed(err.to_string())
                }
            };
            outcomes.push((issue_key, outcome));
        }
        EntryOutcome::Processed(outcomes)
    }

    async fn reconcile_issue(
        &self,
        issue_key: &str,
        entry: &TimeEntry,
        payload: &WorklogPayload,
    ) -> jira_api::Result<IssueOutcome> {
        let description = entry.description_or_empty();

        match find_existing_worklog(self.client, issue_key, entry).await? {
            Some(existing) if existing.time_spent_seconds == payload.time_spent_seconds => {
                info!("{}: up to date on {}", description, issue_key);
                Ok(IssueOutcome::UpToDate)
            }
            Some(existing) => {
                let owner = existing
                    .author
                    .as_ref()
                    .and_then(|author| author.label())
                    .unwrap_or("unknown author");
                info!(
                    "{}: updating existing worklog {} on {} (logged by {})",
                    description,
                    existing.id_string(),
                    issue_key,
                    owner
                );
                self.client
                    .update_worklog(issue_key, &existing.id_string(), payload)
                    .await?;
                Ok(IssueOutcome::Updated)
            }
            None => {
                info!("{}: creating worklog on {}", description, issue_key);
                self.client.create_worklog(issue_key, payload).await?;
                Ok(IssueOutcome::Created)
            }
        }
    }
}
