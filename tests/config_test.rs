//! Tests for configuration loading

use std::io::Write;

use rankwatch::config::Config;
use serial_test::serial;

const RANK_VARS: &[&str] = &[
    "RANKWATCH_CYCLE_SECS",
    "RANKWATCH_MIN_DELAY_SECS",
    "RANKWATCH_MAX_AMOUNT",
    "RANKWATCH_SQLITE_PATH",
    "RANKWATCH_BIND_ADDRESS",
    "RANKWATCH_LOG_FORMAT",
];

fn clear_env() {
    for var in RANK_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();

    assert_eq!(config.rank.cycle_secs, 2700);
    assert_eq!(config.rank.min_delay_secs, 600);
    assert_eq!(config.rank.default_amount, 5);
    assert_eq!(config.database.sqlite_path.to_str(), Some("data/rank.db"));
    assert_eq!(config.server.bind_address.port(), 8080);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("RANKWATCH_CYCLE_SECS", "3600");
    std::env::set_var("RANKWATCH_MIN_DELAY_SECS", "120");
    std::env::set_var("RANKWATCH_MAX_AMOUNT", "20");
    std::env::set_var("RANKWATCH_SQLITE_PATH", "/tmp/rankwatch-test.db");
    std::env::set_var("RANKWATCH_BIND_ADDRESS", "127.0.0.1:9000");
    std::env::set_var("RANKWATCH_LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.rank.cycle_secs, 3600);
    assert_eq!(config.rank.min_delay_secs, 120);
    assert_eq!(config.rank.max_amount, 20);
    assert_eq!(
        config.database.sqlite_path.to_str(),
        Some("/tmp/rankwatch-test.db")
    );
    assert_eq!(config.server.bind_address.to_string(), "127.0.0.1:9000");
    assert_eq!(config.logging.format, "json");
}

#[test]
#[serial]
fn test_from_env_rejects_bad_bind_address() {
    clear_env();
    std::env::set_var("RANKWATCH_BIND_ADDRESS", "not-an-address");
    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
fn test_from_file_partial() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[rank]
cycle_secs = 1800
min_delay_secs = 300

[database]
sqlite_path = "/var/lib/rankwatch/rank.db"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.rank.cycle_secs, 1800);
    assert_eq!(config.rank.min_delay_secs, 300);
    assert_eq!(config.rank.recency_window_secs, 6 * 60 * 60);
    assert_eq!(
        config.database.sqlite_path.to_str(),
        Some("/var/lib/rankwatch/rank.db")
    );
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[rank\ncycle_secs = ").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
}
