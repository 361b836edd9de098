//! User models embedded in work log payloads.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Represents the author or last editor of a work log as returned by Jira.
pub struct WorklogAuthor {
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub account_id: Option<String>,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub active: bool,
    pub time_zone: Option<String>,
    pub account_type: Option<String>,
}

impl WorklogAuthor {
    /// Returns the most readable identifier available for log output.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .or(self.email_address.as_deref())
            .or(self.account_id.as_deref())
    }
}
