//! Parser integration tests using HTML fixture files

mod common;

use common::load_fixture;
use rankwatch::engine::SearchEngine;
use rankwatch::models::ListingEntry;
use rankwatch::parser::{ExtractOutcome, SerpParser};
use rankwatch::utils::error::ExtractError;

const YANDEX_URL: &str = "https://yandex.ru/search/?text=%D0%BA%D1%80%D0%BE%D1%81%D1%81%D0%BE%D0%B2%D0%BA%D0%B8";

// ============================================================================
// Listing Extraction
// ============================================================================

#[test]
fn test_listing_in_document_order() {
    let parser = SerpParser::new();
    let entries = parser
        .extract_yandex(&load_fixture("yandex_results.html"))
        .unwrap();

    assert_eq!(
        entries,
        vec![
            ListingEntry::ad("sportmarket.ru›krossovki"),
            ListingEntry::organic("www.lamoda.ru›shoes-krossovki"),
            ListingEntry::ad("runlab.ru"),
            ListingEntry::organic("market.yandex.ru›catalog"),
            ListingEntry::organic("wildberries.ru›catalog›obuv"),
            ListingEntry::ad("www.Sportmarket.ru›sale"),
        ]
    );
}

#[test]
fn test_both_ad_markers_recognised() {
    let parser = SerpParser::new();
    let entries = parser
        .extract_yandex(&load_fixture("yandex_results.html"))
        .unwrap();

    let ads = entries.iter().filter(|e| e.is_ad).count();
    assert_eq!(ads, 3);
}

#[test]
fn test_parse_dispatches_on_engine() {
    let parser = SerpParser::new();
    let outcome = parser.parse(YANDEX_URL, &load_fixture("yandex_results.html"));

    assert_eq!(outcome.as_str(), "parsed");
    assert_eq!(outcome.listing().map(<[ListingEntry]>::len), Some(6));
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_captcha_page() {
    let parser = SerpParser::new();
    let html = load_fixture("yandex_captcha.html");

    assert_eq!(
        parser.extract_yandex(&html),
        Err(ExtractError::CaptchaDetected)
    );
    let outcome = parser.parse(YANDEX_URL, &html);
    assert_eq!(outcome, ExtractOutcome::Captcha);
    assert!(outcome.listing().is_none());
}

#[test]
fn test_zero_result_page_is_empty_listing() {
    let parser = SerpParser::new();
    let outcome = parser.parse(YANDEX_URL, &load_fixture("yandex_no_results.html"));

    assert_eq!(outcome, ExtractOutcome::Listing(vec![]));
    assert_eq!(outcome.as_str(), "empty");
}

#[test]
fn test_unknown_layout_is_unparseable() {
    let parser = SerpParser::new();
    let outcome = parser.parse(YANDEX_URL, &load_fixture("yandex_unknown_layout.html"));

    assert_eq!(outcome, ExtractOutcome::Unparseable);
    assert!(outcome.listing().is_none());
}

#[test]
fn test_unsupported_engine_yields_empty_listing() {
    let parser = SerpParser::new();
    let outcome = parser.parse(
        "https://www.google.com/search?q=running+shoes",
        &load_fixture("google_results.html"),
    );

    assert_eq!(outcome, ExtractOutcome::Unsupported(SearchEngine::Google));
    assert_eq!(outcome.listing(), Some(&[][..]));
}
