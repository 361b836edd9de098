use std::process::ExitCode;

fn main() -> ExitCode {
    toggl_jira_sync_lib::run()
}
