//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Remove every whitespace character, including newlines
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extract the bare domain from a displayed or absolute URL
///
/// Displayed result URLs are usually scheme-less and may carry breadcrumb
/// segments (`example.com › catalog`). The host is lowercased and a leading
/// `www.` is dropped so that it can be compared against the sites of interest.
pub fn extract_domain(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        let host_part: String = trimmed
            .chars()
            .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '›')
            .collect();
        format!("http://{host_part}")
    };

    let parsed = Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Normalize a site-of-interest name so it compares equal to [`extract_domain`] output
pub fn normalize_site(name: &str) -> Option<String> {
    extract_domain(name)
}
