//! Common test utilities

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rankwatch::storage::{MockRankRepository, SharedRankRepository, SqliteRankRepository};

/// Test fixture paths
pub const FIXTURES_DIR: &str = "tests/fixtures/html";

#[allow(dead_code)]
pub fn load_fixture(filename: &str) -> String {
    let path = format!("{FIXTURES_DIR}/{filename}");
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {path}"))
}

/// Fixture page encoded the way contributors submit it
#[allow(dead_code)]
pub fn encoded_fixture(filename: &str) -> String {
    STANDARD.encode(load_fixture(filename))
}

/// Yandex search URL for a phrase
#[allow(dead_code)]
pub fn yandex_url(phrase: &str) -> String {
    let mut url = url::Url::parse("https://yandex.ru/search/").unwrap();
    url.query_pairs_mut().append_pair("text", phrase);
    url.to_string()
}

/// One repository of each backend
#[allow(dead_code)]
pub fn repositories() -> Vec<(&'static str, SharedRankRepository)> {
    vec![
        ("mock", Arc::new(MockRankRepository::new())),
        ("sqlite", Arc::new(SqliteRankRepository::in_memory().unwrap())),
    ]
}
