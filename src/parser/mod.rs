//! Result page parsing
//!
//! This module handles parsing captured search result pages and extracting
//! the ranked organic and sponsored listing.

pub mod selectors;
pub mod serp;

pub use selectors::YandexSelectors;
pub use serp::{ExtractOutcome, SerpParser};
