//! Result page extractor
//!
//! Turns the decoded text of one capture into an ordered listing of
//! `{url, ad}` entries, or classifies why that is impossible.

use scraper::{ElementRef, Html, Selector};

use crate::engine::SearchEngine;
use crate::models::ListingEntry;
use crate::parser::selectors::YandexSelectors;
use crate::utils::error::ExtractError;
use crate::utils::strip_whitespace;

/// Outcome of one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Results in rank order; may be empty for a genuine zero-result page
    Listing(Vec<ListingEntry>),
    /// The capture comes from an engine whose markup is not implemented
    Unsupported(SearchEngine),
    /// The engine served a captcha instead of results
    Captcha,
    /// The markup could not be understood
    Unparseable,
}

impl ExtractOutcome {
    /// Listing to persist; unsupported engines yield an empty one
    pub fn listing(&self) -> Option<&[ListingEntry]> {
        match self {
            Self::Listing(entries) => Some(entries),
            Self::Unsupported(_) => Some(&[]),
            Self::Captcha | Self::Unparseable => None,
        }
    }

    /// Short outcome label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing(entries) if entries.is_empty() => "empty",
            Self::Listing(_) => "parsed",
            Self::Unsupported(_) => "unsupported",
            Self::Captcha => "captcha",
            Self::Unparseable => "unparseable",
        }
    }
}

impl From<Result<Vec<ListingEntry>, ExtractError>> for ExtractOutcome {
    fn from(result: Result<Vec<ListingEntry>, ExtractError>) -> Self {
        match result {
            Ok(entries) => Self::Listing(entries),
            Err(ExtractError::CaptchaDetected) => Self::Captcha,
            Err(ExtractError::UnparseableStructure) => Self::Unparseable,
        }
    }
}

/// Search result page parser
pub struct SerpParser {
    yandex: YandexSelectors,
}

impl SerpParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            yandex: YandexSelectors::new(),
        }
    }

    /// Parse a capture, inferring the engine from its source URL
    pub fn parse(&self, source_url: &str, html: &str) -> ExtractOutcome {
        let engine = SearchEngine::from_url(source_url);
        if !engine.is_supported() {
            tracing::debug!(%engine, url = source_url, "Engine markup not supported");
            return ExtractOutcome::Unsupported(engine);
        }

        self.extract_yandex(html).into()
    }

    /// Extract the ranked listing from a Yandex result page
    ///
    /// # Errors
    /// Returns `ExtractError::CaptchaDetected` when no results are present and the
    /// page carries a captcha form, `ExtractError::UnparseableStructure` when
    /// neither results nor a known marker are found.
    pub fn extract_yandex(&self, html: &str) -> Result<Vec<ListingEntry>, ExtractError> {
        let document = Html::parse_document(html);

        let containers: Vec<ElementRef<'_>> = Self::select_all(&document, self.yandex.container)
            .into_iter()
            .filter(|container| Self::contains_any(*container, self.yandex.organic))
            .collect();

        if containers.is_empty() {
            if Self::has_any(&document, self.yandex.no_results) {
                return Ok(Vec::new());
            }
            if Self::has_any(&document, self.yandex.captcha) {
                return Err(ExtractError::CaptchaDetected);
            }
            return Err(ExtractError::UnparseableStructure);
        }

        let mut entries = Vec::with_capacity(containers.len());
        for (index, container) in containers.into_iter().enumerate() {
            let Some(url) = self.extract_url(container) else {
                tracing::warn!(index, "Result block without displayed URL, skipping");
                continue;
            };

            let is_ad = Self::contains_any(container, self.yandex.ad_marker);

            entries.push(ListingEntry { url, is_ad });
        }

        Ok(entries)
    }

    fn extract_url(&self, container: ElementRef<'_>) -> Option<String> {
        self.yandex.url.iter().find_map(|sel| {
            container
                .select(sel)
                .next()
                .map(|el| strip_whitespace(&el.text().collect::<String>()))
                .filter(|url| !url.is_empty())
        })
    }

    /// Elements matched by the first selector that matches anything, in document order
    fn select_all<'a>(document: &'a Html, selectors: &[Selector]) -> Vec<ElementRef<'a>> {
        selectors
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    fn has_any(document: &Html, selectors: &[Selector]) -> bool {
        selectors.iter().any(|sel| document.select(sel).next().is_some())
    }

    fn contains_any(element: ElementRef<'_>, selectors: &[Selector]) -> bool {
        selectors.iter().any(|sel| element.select(sel).next().is_some())
    }
}

impl Default for SerpParser {
    fn default() -> Self {
        Self::new()
    }
}
