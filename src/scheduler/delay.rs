//! Contributor polling delay
//!
//! The delay is sized so that, across every contributor seen in the activity
//! window, the whole phrase set is fetched roughly once per cycle:
//!
//! ```text
//! delay = max(cycle × active_workers × n / total_phrases, min_delay)
//! ```
//!
//! Estimating also records the caller's activity row, so the estimator
//! doubles as the contributor heartbeat. Rows that fell out of the activity
//! window are pruned on the way.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::{window_start, RankConfig};
use crate::error::Result;
use crate::storage::SharedRankRepository;

/// Pure delay formula in whole seconds
pub fn compute_delay_secs(
    cycle_secs: u64,
    active_workers: usize,
    n: usize,
    total_phrases: usize,
    min_delay_secs: u64,
) -> u64 {
    let proposed = if total_phrases == 0 {
        0
    } else {
        (cycle_secs as u128)
            .checked_mul(active_workers as u128)
            .and_then(|v| v.checked_mul(n as u128))
            .and_then(|numerator| u64::try_from(numerator / total_phrases as u128).ok())
            .unwrap_or(u64::MAX)
    };
    proposed.max(min_delay_secs)
}

/// Delay estimator backed by the record store
#[derive(Clone)]
pub struct DelayEstimator {
    repo: SharedRankRepository,
    cycle_secs: u64,
    min_delay_secs: u64,
    activity_window_secs: u64,
}

impl DelayEstimator {
    pub fn new(repo: SharedRankRepository, config: &RankConfig) -> Self {
        Self {
            repo,
            cycle_secs: config.cycle_secs,
            min_delay_secs: config.min_delay_secs,
            activity_window_secs: config.activity_window_secs,
        }
    }

    /// Delay before `address` should ask for work again after receiving `n` phrases
    ///
    /// Active contributors are counted before this request's own activity row
    /// is recorded.
    pub fn estimate(&self, n: usize, address: &str, now: DateTime<Utc>) -> Result<Duration> {
        let since = window_start(now, self.activity_window_secs)?;
        let pruned = self.repo.prune_activity(since)?;
        let active_workers = self.repo.count_active_contributors(since)?;
        let total_phrases = self.repo.phrase_count()?;

        let delay_secs = compute_delay_secs(
            self.cycle_secs,
            active_workers,
            n,
            total_phrases,
            self.min_delay_secs,
        );

        self.repo.record_activity(address, now)?;
        crate::metrics::set_active_workers(active_workers);

        tracing::debug!(
            address,
            active_workers,
            total_phrases,
            n,
            delay_secs,
            pruned,
            "Estimated contributor delay"
        );

        Ok(Duration::from_secs(delay_secs))
    }
}
