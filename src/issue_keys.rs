//! Finds Jira issue keys such as `ISSUE-52` in free-text descriptions.

use regex::Regex;

/// Matches `<PREFIX>-<digits>` for a fixed set of project prefixes.
///
/// The pattern is compiled once from the configured prefixes. Longer prefixes are tried first so
/// that `ABC-1` is never reported as `BC-1` when both are configured, and a match directly preceded
/// by a letter or underscore is rejected, which keeps matching prefix-exact. Digits may precede a
/// match, so `ISSUE-52ISSUE-55` still splits into two keys.
#[derive(Clone, Debug)]
pub struct IssueKeyMatcher {
    pattern: Option<Regex>,
}

impl IssueKeyMatcher {
    pub fn new<S: AsRef<str>>(project_keys: &[S]) -> Result<Self, regex::Error> {
        let mut keys: Vec<&str> = project_keys
            .iter()
            .map(|key| key.as_ref().trim())
            .filter(|key| !key.is_empty())
            .collect();
        if keys.is_empty() {
            return Ok(Self { pattern: None });
        }
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        keys.dedup();

        let alternatives = keys
            .iter()
            .map(|key| regex::escape(key))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?:{})-[0-9]+", alternatives))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Returns the distinct issue keys in order of first appearance.
    pub fn extract(&self, description: Option<&str>) -> Vec<String> {
        let (Some(pattern), Some(text)) = (&self.pattern, description) else {
            return Vec::new();
        };

        let mut found: Vec<String> = Vec::new();
        let mut position = 0;
        while let Some(candidate) = pattern.find_at(text, position) {
            if is_glued_to_word(text, candidate.start()) {
                position = next_char_boundary(text, candidate.start());
                continue;
            }
            let key = candidate.as_str();
            if !found.iter().any(|existing| existing == key) {
                found.push(key.to_string());
            }
            position = candidate.end();
        }
        found
    }
}

fn is_glued_to_word(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false)
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(text.len())
}
