//! Search engine detection and phrase/URL conversion
//!
//! A phrase travels as the `text` query parameter of a search URL in both
//! directions: contributors receive URLs built by [`url_from_query`] and submit
//! captures whose phrase is recovered with [`query_from_url`].

use std::fmt;

use url::Url;

use crate::utils::normalize_whitespace;

/// Query parameter carrying the search phrase
pub const QUERY_PARAM: &str = "text";

/// Search engines captures can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEngine {
    Yandex,
    Google,
    Unknown,
}

impl SearchEngine {
    /// Infer the engine from the capture's source URL host
    pub fn from_url(url: &str) -> Self {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return Self::Unknown;
        };

        let labels: Vec<&str> = host.split('.').collect();
        if labels.contains(&"yandex") || labels.contains(&"ya") {
            Self::Yandex
        } else if labels.contains(&"google") {
            Self::Google
        } else {
            Self::Unknown
        }
    }

    /// Whether the extractor understands this engine's markup
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Yandex)
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEngine::Yandex => write!(f, "Yandex"),
            SearchEngine::Google => write!(f, "Google"),
            SearchEngine::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Extract the search phrase from a result page URL
///
/// Returns the first value of the `text` query parameter exactly as decoded,
/// or an empty string when the URL does not parse or carries no such
/// parameter. Use [`phrase_key`] to compare it against tracked phrases.
pub fn query_from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(key, _)| key == QUERY_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// Comparison key for a phrase: whitespace runs collapsed, ends trimmed
///
/// Tracked phrases are stored in this form, and captured phrases are mapped
/// through it whenever they are matched against the tracked set.
pub fn phrase_key(phrase: &str) -> String {
    normalize_whitespace(phrase)
}

/// Render a phrase back into a search URL under `base`
pub fn url_from_query(base: &Url, phrase: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut().clear().append_pair(QUERY_PARAM, phrase);
    url.to_string()
}
