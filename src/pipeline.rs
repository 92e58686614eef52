//! Batch parsing of pending captures
//!
//! ```text
//! pending captures ──▶ base64 decode ──▶ SerpParser ──▶ outcome
//!                            │                            │
//!                       undecodable          listing ─────┼──▶ positions + phrase parsed
//!                            │               captcha ─────┼──▶ captcha flag
//!                            └──▶ parse error ◀───────────┴─── unparseable
//! ```
//!
//! Every pending capture leaves the batch resolved, flagged as captcha, or
//! carrying a parse error, so a batch never picks up the same capture twice.
//! A failure on one capture is logged and does not stop the batch.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::phrase_key;
use crate::error::Result;
use crate::models::Capture;
use crate::parser::{ExtractOutcome, SerpParser};
use crate::storage::SharedRankRepository;
use crate::utils::error::IntakeError;

/// Reason stored on captures whose text is not valid base64
pub const UNDECODABLE_REASON: &str = "invalid base64";

/// Reason stored on captures whose markup could not be understood
pub const UNPARSEABLE_REASON: &str = "unparseable structure";

/// Decode captured page text
///
/// Line breaks and other ASCII whitespace are ignored; invalid UTF-8 is
/// replaced rather than rejected.
pub fn decode_page_text(encoded: &str) -> std::result::Result<String, IntakeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| IntakeError::InvalidBase64(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Per-batch counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub processed: usize,
    pub parsed: usize,
    pub empty: usize,
    pub unsupported: usize,
    pub captcha: usize,
    pub unparseable: usize,
    pub undecodable: usize,
    /// Captures skipped because the record store failed
    pub failed: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &str) {
        match outcome {
            "parsed" => self.parsed += 1,
            "empty" => self.empty += 1,
            "unsupported" => self.unsupported += 1,
            "captcha" => self.captcha += 1,
            "unparseable" => self.unparseable += 1,
            "undecodable" => self.undecodable += 1,
            _ => self.failed += 1,
        }
        crate::metrics::record_parse_outcome(outcome);
    }

    /// Captures that ended with a stored listing
    pub fn resolved(&self) -> usize {
        self.parsed + self.empty + self.unsupported
    }

    /// Add another batch's counters to these
    pub fn merge(&mut self, other: &PipelineStats) {
        self.processed += other.processed;
        self.parsed += other.parsed;
        self.empty += other.empty;
        self.unsupported += other.unsupported;
        self.captcha += other.captcha;
        self.unparseable += other.unparseable;
        self.undecodable += other.undecodable;
        self.failed += other.failed;
    }
}

/// Parse pipeline over the record store
pub struct ParsePipeline {
    repo: SharedRankRepository,
    parser: SerpParser,
    batch_limit: usize,
}

impl ParsePipeline {
    pub fn new(repo: SharedRankRepository, batch_limit: usize) -> Self {
        Self {
            repo,
            parser: SerpParser::new(),
            batch_limit: batch_limit.max(1),
        }
    }

    /// Parse up to one batch of pending captures
    ///
    /// Successfully resolved captures stamp their phrase as parsed at `now`.
    pub fn run_once(&self, now: DateTime<Utc>) -> Result<PipelineStats> {
        let _timer = crate::metrics::start_parse_batch_timer();
        let pending = self.repo.pending_captures(self.batch_limit)?;
        let mut stats = PipelineStats::default();

        for capture in &pending {
            stats.processed += 1;
            match self.process(capture, now) {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    tracing::error!(capture_id = capture.id, error = %e, "Failed to store parse outcome");
                    stats.record("failed");
                }
            }
        }

        if stats.processed > 0 {
            tracing::info!(
                processed = stats.processed,
                parsed = stats.parsed,
                empty = stats.empty,
                unsupported = stats.unsupported,
                captcha = stats.captcha,
                unparseable = stats.unparseable,
                undecodable = stats.undecodable,
                failed = stats.failed,
                "Parse batch complete"
            );
        }

        Ok(stats)
    }

    fn process(&self, capture: &Capture, now: DateTime<Utc>) -> Result<&'static str> {
        let html = match decode_page_text(&capture.text) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(capture_id = capture.id, error = %e, "Undecodable capture");
                self.repo.mark_parse_failed(capture.id, UNDECODABLE_REASON)?;
                return Ok("undecodable");
            }
        };

        let outcome = self.parser.parse(&capture.url, &html);
        match &outcome {
            ExtractOutcome::Listing(_) | ExtractOutcome::Unsupported(_) => {
                let listing = outcome.listing().unwrap_or_default();
                let phrase = phrase_key(&capture.phrase);
                if !self.repo.resolve_capture(capture.id, listing, &phrase, now)? {
                    tracing::debug!(
                        capture_id = capture.id,
                        phrase = %capture.phrase,
                        "Capture phrase is no longer tracked"
                    );
                }
            }
            ExtractOutcome::Captcha => {
                tracing::info!(capture_id = capture.id, contributor = %capture.contributor, "Captcha page captured");
                self.repo.mark_captcha(capture.id)?;
            }
            ExtractOutcome::Unparseable => {
                tracing::warn!(capture_id = capture.id, url = %capture.url, "Unparseable result page");
                self.repo.mark_parse_failed(capture.id, UNPARSEABLE_REASON)?;
            }
        }

        Ok(outcome.as_str())
    }
}
