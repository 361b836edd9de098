use std::process::ExitCode;

use chrono::Utc;
use log::{error, info, warn};

pub mod config;
pub mod error;
pub mod issue_keys;
pub mod reconcile;
pub mod sync;
pub mod worklog;

use config::Settings;
use error::SyncError;
use sync::{run_sync, SyncReport};

/// Process entry point: one sync run, exit status non-zero only when the run could not happen.
pub fn run() -> ExitCode {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .try_init();

    info!("Starting Toggl to Jira sync");

    match execute() {
        Ok(report) => {
            log_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Sync aborted: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute() -> Result<SyncReport, SyncError> {
    let settings = Settings::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_sync(&settings, Utc::now()))
}

fn log_report(report: &SyncReport) {
    info!(
        "Sync finished: {} fetched, {} created, {} updated, {} up to date, {} running, {} without issue",
        report.fetched,
        report.created,
        report.updated,
        report.up_to_date,
        report.skipped_running,
        report.without_issue
    );
    if report.failed > 0 || report.invalid_start > 0 {
        warn!(
            "{} work log updates failed and {} entries had an unreadable start time",
            report.failed, report.invalid_start
        );
    }
}
