use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;

use crate::error::{JiraError, Result};

/// Builds a `Basic` authorization header value, marked sensitive so it never shows up in debug output.
pub fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
        .map_err(|err| JiraError::Other(err.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
