//! Translation of a time entry into the work log body Jira receives.

use chrono::DateTime;
use jira_api::WorklogPayload;
use toggl_api::TimeEntry;

pub const ROUNDING_STEP_SECS: i64 = 900;
const JIRA_STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Rounds up to the next quarter hour. Always adds between 1 and 900 seconds, so an exact
/// multiple moves on to the following one (900 becomes 1800).
pub fn round_up_to_quarter_hour(duration_secs: i64) -> i64 {
    duration_secs + (ROUNDING_STEP_SECS - duration_secs.rem_euclid(ROUNDING_STEP_SECS))
}

/// Renders an ISO-8601 timestamp as `YYYY-MM-DDTHH:mm:ss.SSS±HHMM`, keeping the source offset.
pub fn format_started(timestamp: &str) -> Result<String, chrono::ParseError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp.trim())
        .or_else(|_| DateTime::parse_from_str(timestamp.trim(), "%Y-%m-%dT%H:%M:%S%.f%z"))?;
    Ok(parsed.format(JIRA_STARTED_FORMAT).to_string())
}

/// The `TogglID: <id>` marker that ties a work log back to its entry.
pub fn correlation_marker(entry_id: u64) -> String {
    format!("TogglID: {}", entry_id)
}

/// True when `comment` carries the marker for `entry_id` and not merely a longer id starting with it.
pub fn comment_references_entry(comment: &str, entry_id: u64) -> bool {
    let marker = correlation_marker(entry_id);
    comment.match_indices(&marker).any(|(index, _)| {
        !comment[index + marker.len()..]
            .starts_with(|c: char| c.is_ascii_digit())
    })
}

pub fn worklog_comment(entry: &TimeEntry) -> String {
    format!(
        "{} {}",
        correlation_marker(entry.id),
        entry.description_or_empty()
    )
}

/// Builds the create/update body for a finished entry.
pub fn build_payload(entry: &TimeEntry) -> Result<WorklogPayload, chrono::ParseError> {
    Ok(WorklogPayload {
        comment: worklog_comment(entry),
        time_spent_seconds: round_up_to_quarter_hour(entry.duration),
        started: format_started(&entry.start)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(duration: i64, description: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: 1951596187,
            workspace_id: 1391549,
            billable: false,
            start: "2021-04-01T12:26:22+00:00".to_string(),
            stop: Some("2021-04-01T13:00:22+00:00".to_string()),
            duration,
            description: description.map(str::to_string),
            at: None,
            project_id: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn rounding_examples() {
        assert_eq!(round_up_to_quarter_hour(2040), 2700);
        assert_eq!(round_up_to_quarter_hour(900), 1800);
        assert_eq!(round_up_to_quarter_hour(1), 900);
        assert_eq!(round_up_to_quarter_hour(0), 900);
    }

    #[test]
    fn rounding_always_moves_up_to_a_multiple() {
        for duration in (0..5_000).chain([86_399, 86_400, 1_000_000]) {
            let rounded = round_up_to_quarter_hour(duration);
            assert_eq!(rounded % ROUNDING_STEP_SECS, 0, "duration {duration}");
            assert!(rounded > duration, "duration {duration}");
            assert!(rounded - duration <= ROUNDING_STEP_SECS, "duration {duration}");
        }
    }

    #[test]
    fn started_uses_millis_and_colonless_offset() {
        assert_eq!(
            format_started("2021-04-01T12:26:22+00:00").unwrap(),
            "2021-04-01T12:26:22.000+0000"
        );
        assert_eq!(
            format_started("2021-04-01T12:26:22Z").unwrap(),
            "2021-04-01T12:26:22.000+0000"
        );
        assert_eq!(
            format_started("2021-04-01T14:26:22.5+02:00").unwrap(),
            "2021-04-01T14:26:22.500+0200"
        );
        assert_eq!(
            format_started("2021-04-01T07:26:22.123-0500").unwrap(),
            "2021-04-01T07:26:22.123-0500"
        );
        assert!(format_started("yesterday").is_err());
    }

    #[test]
    fn marker_matching_respects_id_boundaries() {
        assert!(comment_references_entry("TogglID: 123 doing work", 123));
        assert!(comment_references_entry("TogglID: 123", 123));
        assert!(!comment_references_entry("TogglID: 1234 doing work", 123));
        assert!(!comment_references_entry("TogglID: 456 other work", 123));
        assert!(!comment_references_entry("logged 123 minutes", 123));
    }

    #[test]
    fn payload_carries_marker_rounded_duration_and_start() {
        let payload = build_payload(&entry(2040, Some("ISSUE-52 doing work"))).unwrap();
        assert_eq!(payload.comment, "TogglID: 1951596187 ISSUE-52 doing work");
        assert_eq!(payload.time_spent_seconds, 2700);
        assert_eq!(payload.started, "2021-04-01T12:26:22.000+0000");
    }

    #[test]
    fn payload_without_description_still_has_marker() {
        let payload = build_payload(&entry(60, None)).unwrap();
        assert!(payload.comment.starts_with("TogglID: 1951596187"));
        assert_eq!(payload.time_spent_seconds, 900);
    }
}
