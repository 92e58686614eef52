// Core data structures for rankwatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of an extracted result listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Displayed URL with whitespace removed
    pub url: String,
    /// Sponsored placement
    #[serde(rename = "ad")]
    pub is_ad: bool,
}

impl ListingEntry {
    pub fn organic(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_ad: false,
        }
    }

    pub fn ad(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_ad: true,
        }
    }
}

/// A stored result page capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub id: i64,
    /// Source URL the contributor fetched
    pub url: String,
    /// Phrase derived from the URL's `text` parameter
    pub phrase: String,
    /// Base64-encoded page text
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Submitter address
    pub contributor: String,
    /// Extracted listing, absent until a parse attempt succeeds
    pub positions: Option<Vec<ListingEntry>>,
    pub captcha: bool,
    /// Reason recorded when the page could not be parsed
    pub parse_error: Option<String>,
}

impl Capture {
    /// Successfully parsed and not a captcha page
    pub fn is_resolved(&self) -> bool {
        self.positions.is_some() && !self.captcha
    }

    /// Still eligible for a batch parse attempt
    pub fn is_pending(&self) -> bool {
        self.positions.is_none() && !self.captcha && self.parse_error.is_none()
    }
}

/// Capture fields supplied at insertion time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCapture {
    pub url: String,
    pub phrase: String,
    pub text: String,
    pub contributor: String,
}

/// A tracked search phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub name: String,
    pub last_parsed_at: Option<DateTime<Utc>>,
}

impl Phrase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_parsed_at: None,
        }
    }
}

/// One contributor work request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub at: DateTime<Utc>,
    pub address: String,
}

/// One row of the position report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultRow {
    pub site: String,
    pub phrase: String,
    pub timestamp: DateTime<Utc>,
    /// Organic entries seen before this sponsored entry
    pub position: u32,
    /// At least one organic entry preceded this sponsored entry
    pub guarantee: bool,
}

/// Phrases handed to a contributor and how long to wait before asking again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkAssignment {
    /// Milliseconds to wait before the next request
    pub delay: u64,
    /// Search URLs to fetch
    pub donors: Vec<String>,
}
