//! One sync run: fetch the lookback window from Toggl, then reconcile entry by entry.

use chrono::{DateTime, Duration, Utc};
use jira_api::JiraClient;
use log::info;
use toggl_api::TogglClient;

use crate::config::Settings;
use crate::error::Result;
use crate::issue_keys::IssueKeyMatcher;
use crate::reconcile::{EntryOutcome, IssueOutcome, Reconciler};

/// Tally of what a run did, logged once at the end.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub skipped_running: usize,
    pub without_issue: usize,
    pub invalid_start: usize,
    pub created: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::SkippedRunning => self.skipped_running += 1,
            EntryOutcome::NoIssues => self.without_issue += 1,
            EntryOutcome::InvalidStart(_) => self.invalid_start += 1,
            EntryOutcome::Processed(issues) => {
                for (_, issue) in issues {
                    match issue {
                        IssueOutcome::Created => self.created += 1,
                        IssueOutcome::Updated => self.updated += 1,
                        IssueOutcome::UpToDate => self.up_to_date += 1,
                        IssueOutcome::Failed(_) => self.failed += 1,
                    }
                }
            }
        }
    }
}

/// `[now - hours, now)`, with the start clamped to the earliest representable instant.
pub fn lookback_window(now: DateTime<Utc>, hours: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Duration::try_hours(hours)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    (start, now)
}

/// Fetches the window and reconciles every entry in order. Only a failed fetch is an error.
pub async fn sync_window(
    toggl: &TogglClient,
    jira: &JiraClient,
    matcher: &IssueKeyMatcher,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<SyncReport> {
    let entries = toggl.get_time_entries(start, end).await?;
    let mut report = SyncReport {
        fetched: entries.len(),
        ..SyncReport::default()
    };
    if entries.is_empty() {
        return Ok(report);
    }

    info!("Processing {} time entries", entries.len());
    let reconciler = Reconciler::new(jira, matcher);
    for entry in &entries {
        let outcome = reconciler.reconcile_entry(entry).await;
        report.record(&outcome);
    }
    Ok(report)
}

/// Builds the clients from `settings` and runs one sync over the configured lookback window.
pub async fn run_sync(settings: &Settings, now: DateTime<Utc>) -> Result<SyncReport> {
    let toggl = TogglClient::new(settings.toggl_config())?;
    let jira = JiraClient::new(settings.jira_config())?;
    let matcher = IssueKeyMatcher::new(settings.project_keys.as_slice())?;
    if matcher.is_empty() {
        info!("No JIRA_PROJECTS configured, no entry will match an issue");
    } else {
        info!("Supported Jira projects: {}", settings.project_keys.join(", "));
    }

    let (start, end) = lookback_window(now, settings.lookback_hours);
    let report = sync_window(&toggl, &jira, &matcher, start, end).await?;
    if report.fetched == 0 {
        info!(
            "No time entries found in the last {} hours",
            settings.lookback_hours
        );
    }
    Ok(report)
}
