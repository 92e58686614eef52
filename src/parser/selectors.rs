//! CSS selectors for search engine result pages
//!
//! Only Yandex markup is recognised. Selector lists are tried in order and the
//! first one that matches wins.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors; the strings are constants so a failure is a programming error
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // One element per ranked result block
    static ref YANDEX_CONTAINER: Vec<Selector> = vec![
        parse_selector!("li.serp-item"),
    ];

    // Organic block a container must hold to count as a result; wizards lack it
    static ref YANDEX_ORGANIC: Vec<Selector> = vec![
        parse_selector!(".organic"),
    ];

    // Displayed URL inside a result block
    static ref YANDEX_URL: Vec<Selector> = vec![
        parse_selector!(".organic__path"),
        parse_selector!(".path"),
    ];

    // Sponsored label inside a result block
    static ref YANDEX_AD_MARKER: Vec<Selector> = vec![
        parse_selector!(".label_theme_direct"),
        parse_selector!(".organic__advlabel"),
    ];

    // Valid page with zero results
    static ref YANDEX_NO_RESULTS: Vec<Selector> = vec![
        parse_selector!(".misspell__message"),
        parse_selector!(".serp-list_empty"),
        parse_selector!(".no-results"),
    ];

    // Interstitial shown instead of results
    static ref YANDEX_CAPTCHA: Vec<Selector> = vec![
        parse_selector!("form[action*='checkcaptcha']"),
        parse_selector!(".captcha__image"),
        parse_selector!(".form_captcha"),
    ];
}

/// Selectors for Yandex result pages
pub struct YandexSelectors {
    pub container: &'static [Selector],
    pub organic: &'static [Selector],
    pub url: &'static [Selector],
    pub ad_marker: &'static [Selector],
    pub no_results: &'static [Selector],
    pub captcha: &'static [Selector],
}

impl YandexSelectors {
    pub fn new() -> Self {
        Self {
            container: &YANDEX_CONTAINER,
            organic: &YANDEX_ORGANIC,
            url: &YANDEX_URL,
            ad_marker: &YANDEX_AD_MARKER,
            no_results: &YANDEX_NO_RESULTS,
            captcha: &YANDEX_CAPTCHA,
        }
    }
}

impl Default for YandexSelectors {
    fn default() -> Self {
        Self::new()
    }
}
