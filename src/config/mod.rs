//! Configuration management for rankwatch
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Every component receives the sections it needs
//! explicitly instead of reading global state.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// Longest accepted recency or activity window, in seconds (one year)
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

/// Main configuration structure
///
/// Missing sections and fields in a TOML file fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ranking policy (scheduler, delay, aggregation, batch job)
    pub rank: RankConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Ranking policy values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Target time to cover every phrase once, in seconds
    pub cycle_secs: u64,

    /// Floor for the contributor polling delay, in seconds
    pub min_delay_secs: u64,

    /// Phrases handed out when the caller does not ask for a count
    pub default_amount: usize,

    /// Upper clamp on the requested phrase count
    pub max_amount: usize,

    /// Only captures newer than this are reported, in seconds
    pub recency_window_secs: u64,

    /// Window for counting distinct active contributors, in seconds
    pub activity_window_secs: u64,

    /// Stale candidate pool size as a multiple of the remaining count
    pub stale_pool_factor: usize,

    /// Maximum captures processed per batch run
    pub parse_batch_limit: usize,

    /// Background batch period while serving, in seconds (0 disables)
    pub parse_interval_secs: u64,

    /// Base URL used to render phrases back into search URLs
    pub search_base_url: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable permissive CORS (contributors post from browser extensions)
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Take the contributor address from the first `X-Forwarded-For` hop
    /// instead of the socket peer; only safe behind a trusted proxy
    pub trust_forwarded_for: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            cycle_secs: 45 * 60,
            min_delay_secs: 10 * 60,
            default_amount: 5,
            max_amount: 50,
            recency_window_secs: 6 * 60 * 60,
            activity_window_secs: 60 * 60,
            stale_pool_factor: 5,
            parse_batch_limit: 500,
            parse_interval_secs: 60,
            search_base_url: String::from("https://yandex.ru/search/"),
        }
    }
}

/// Start of the trailing window of `secs` seconds ending at `now`
///
/// # Errors
/// Returns `Error::Config` when the window cannot be represented or reaches
/// before the earliest representable timestamp.
pub fn window_start(now: DateTime<Utc>, secs: u64) -> crate::error::Result<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::config(format!("window of {secs}s is out of range")))
}

impl RankConfig {

    /// Clamp a requested phrase count into `1..=max_amount`
    #[must_use]
    pub fn clamp_amount(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_amount)
            .clamp(1, self.max_amount.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            enable_cors: true,
            enable_request_logging: true,
            trust_forwarded_for: false,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = RankConfig::default();

        let rank = RankConfig {
            cycle_secs: env_parse("RANKWATCH_CYCLE_SECS").unwrap_or(defaults.cycle_secs),
            min_delay_secs: env_parse("RANKWATCH_MIN_DELAY_SECS")
                .unwrap_or(defaults.min_delay_secs),
            default_amount: env_parse("RANKWATCH_DEFAULT_AMOUNT")
                .unwrap_or(defaults.default_amount),
            max_amount: env_parse("RANKWATCH_MAX_AMOUNT").unwrap_or(defaults.max_amount),
            recency_window_secs: env_parse("RANKWATCH_RECENCY_WINDOW_SECS")
                .unwrap_or(defaults.recency_window_secs),
            activity_window_secs: env_parse("RANKWATCH_ACTIVITY_WINDOW_SECS")
                .unwrap_or(defaults.activity_window_secs),
            stale_pool_factor: env_parse("RANKWATCH_STALE_POOL_FACTOR")
                .unwrap_or(defaults.stale_pool_factor),
            parse_batch_limit: env_parse("RANKWATCH_PARSE_BATCH_LIMIT")
                .unwrap_or(defaults.parse_batch_limit),
            parse_interval_secs: env_parse("RANKWATCH_PARSE_INTERVAL_SECS")
                .unwrap_or(defaults.parse_interval_secs),
            search_base_url: std::env::var("RANKWATCH_SEARCH_BASE_URL")
                .unwrap_or(defaults.search_base_url),
        };

        let sqlite_path = std::env::var("RANKWATCH_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/rank.db"))
            .into();

        let bind_address = match std::env::var("RANKWATCH_BIND_ADDRESS") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("Invalid RANKWATCH_BIND_ADDRESS: {addr}"))?,
            Err(_) => ServerConfig::default().bind_address,
        };

        let log_level =
            std::env::var("RANKWATCH_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));
        let log_format =
            std::env::var("RANKWATCH_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            rank,
            database: DatabaseConfig { sqlite_path },
            server: ServerConfig {
                bind_address,
                enable_cors: env_parse("RANKWATCH_ENABLE_CORS").unwrap_or(true),
                enable_request_logging: env_parse("RANKWATCH_REQUEST_LOGGING").unwrap_or(true),
                trust_forwarded_for: env_parse("RANKWATCH_TRUST_FORWARDED_FOR").unwrap_or(false),
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.rank.cycle_secs == 0 {
            anyhow::bail!("cycle_secs must be greater than 0");
        }

        if self.rank.max_amount == 0 {
            anyhow::bail!("max_amount must be greater than 0");
        }

        if self.rank.stale_pool_factor == 0 {
            anyhow::bail!("stale_pool_factor must be greater than 0");
        }

        if self.rank.recency_window_secs == 0 || self.rank.activity_window_secs == 0 {
            anyhow::bail!("recency and activity windows must be greater than 0");
        }

        if self.rank.recency_window_secs > MAX_WINDOW_SECS
            || self.rank.activity_window_secs > MAX_WINDOW_SECS
        {
            anyhow::bail!("recency and activity windows must not exceed {MAX_WINDOW_SECS} seconds");
        }

        if self.rank.parse_batch_limit == 0 {
            anyhow::bail!("parse_batch_limit must be greater than 0");
        }

        url::Url::parse(&self.rank.search_base_url)
            .with_context(|| format!("Invalid search_base_url: {}", self.rank.search_base_url))?;

        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/rank.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rank: RankConfig::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
