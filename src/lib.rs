//! rankwatch - crowd-sourced search ranking tracker
//!
//! Contributors fetch search result pages on the service's behalf and post
//! them back. The service parses each capture into a ranked listing, keeps a
//! fair rotation of phrases to fetch, throttles contributors, and reports where
//! sponsored results for tracked sites appear relative to organic ones.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`engine`] - Search engine detection and search URL helpers
//! - [`parser`] - Result page extraction with captcha detection
//! - [`models`] - Core data structures and types
//! - [`storage`] - Record store trait with SQLite and in-memory backends
//! - [`scheduler`] - Phrase rotation, polling delay and offset counter
//! - [`aggregator`] - Latest-capture position report
//! - [`pipeline`] - Batch parsing of pending captures
//! - [`service`] - Contributor-facing operations
//! - [`server`] - HTTP API
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use rankwatch::prelude::*;
//!
//! fn main() -> rankwatch::Result<()> {
//!     let repo = rankwatch::storage::create_sqlite_repository("data/rank.db")?;
//!     let service = RankService::new(repo.clone(), RankConfig::default())?;
//!     let stats = ParsePipeline::new(repo, 500).run_once(chrono::Utc::now())?;
//!     println!("parsed {} captures", stats.parsed);
//!     println!("{} report rows", service.results(chrono::Utc::now())?.len());
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod scheduler;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregator::Aggregator;
    pub use crate::config::{Config, RankConfig};
    pub use crate::error::{Error, ErrorCategory, RankErrorTrait, Result};
    pub use crate::models::{Capture, ListingEntry, Phrase, ResultRow, WorkAssignment};
    pub use crate::parser::{ExtractOutcome, SerpParser};
    pub use crate::pipeline::{ParsePipeline, PipelineStats};
    pub use crate::scheduler::{DelayEstimator, OffsetCounter, PhraseRotation};
    pub use crate::service::{RankService, Submission};
    pub use crate::storage::{RankRepository, SharedRankRepository};
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use models::{Capture, ListingEntry, ResultRow};
