//! Position report aggregation
//!
//! For every tracked phrase, the newest resolved capture inside the recency
//! window is walked in rank order. Each sponsored entry whose domain is a site
//! of interest produces one [`ResultRow`] carrying:
//! - `position`: organic entries seen so far in that capture (sponsored entries
//!   never consume an organic rank)
//! - `guarantee`: whether any organic entry came before it
//!
//! The report is a pure function of the stored state, so rebuilding it over
//! the same captures, phrases and sites yields the same rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::{window_start, RankConfig};
use crate::engine::phrase_key;
use crate::error::Result;
use crate::models::{Capture, ResultRow};
use crate::storage::SharedRankRepository;
use crate::utils::{extract_domain, normalize_site};

/// Report builder backed by the record store
#[derive(Clone)]
pub struct Aggregator {
    repo: SharedRankRepository,
    recency_window_secs: u64,
}

impl Aggregator {
    pub fn new(repo: SharedRankRepository, config: &RankConfig) -> Self {
        Self {
            repo,
            recency_window_secs: config.recency_window_secs,
        }
    }

    /// Build the current report as of `now`
    pub fn report(&self, now: DateTime<Utc>) -> Result<Vec<ResultRow>> {
        let phrases: HashSet<String> = self
            .repo
            .phrases()?
            .into_iter()
            .map(|p| p.name)
            .collect();
        let sites: HashSet<String> = self
            .repo
            .sites()?
            .iter()
            .filter_map(|s| normalize_site(s))
            .collect();

        let since = window_start(now, self.recency_window_secs)?;
        let captures = self.repo.resolved_captures_since(since)?;
        let rows = build_report(&captures, &phrases, &sites);

        tracing::debug!(
            captures = captures.len(),
            phrases = phrases.len(),
            sites = sites.len(),
            rows = rows.len(),
            "Built position report"
        );
        Ok(rows)
    }
}

/// Report rows for a set of resolved captures
///
/// `sites` must hold normalised domains (see [`normalize_site`]).
pub fn build_report(
    captures: &[Capture],
    phrases: &HashSet<String>,
    sites: &HashSet<String>,
) -> Vec<ResultRow> {
    latest_per_phrase(captures, phrases)
        .into_iter()
        .flat_map(|capture| rows_for_capture(capture, sites))
        .collect()
}

/// Newest resolved capture for each tracked phrase, ordered by phrase
///
/// Captured phrases are matched on their [`phrase_key`]. Ties on creation
/// time go to the higher id, so the choice does not depend on input order.
pub fn latest_per_phrase<'a>(
    captures: &'a [Capture],
    phrases: &HashSet<String>,
) -> Vec<&'a Capture> {
    let mut latest: HashMap<String, &Capture> = HashMap::new();

    for capture in captures.iter().filter(|c| c.is_resolved()) {
        let key = phrase_key(&capture.phrase);
        if !phrases.contains(&key) {
            continue;
        }
        latest
            .entry(key)
            .and_modify(|current| {
                if (capture.created_at, capture.id) > (current.created_at, current.id) {
                    *current = capture;
                }
            })
            .or_insert(capture);
    }

    let mut selected: Vec<(String, &Capture)> = latest.into_iter().collect();
    selected.sort_by(|a, b| a.0.cmp(&b.0));
    selected.into_iter().map(|(_, capture)| capture).collect()
}

/// Walk one capture's listing and emit rows for sponsored entries of interest
///
/// Rows name the phrase by its [`phrase_key`].
pub fn rows_for_capture(capture: &Capture, sites: &HashSet<String>) -> Vec<ResultRow> {
    let Some(positions) = capture.positions.as_deref() else {
        return Vec::new();
    };
    let phrase = phrase_key(&capture.phrase);

    let mut organic_rank: u32 = 0;
    let mut preceded_by_organic = false;
    let mut rows = Vec::new();

    for entry in positions {
        if !entry.is_ad {
            organic_rank += 1;
            preceded_by_organic = true;
            continue;
        }

        let Some(domain) = extract_domain(&entry.url) else {
            continue;
        };
        if sites.contains(&domain) {
            rows.push(ResultRow {
                site: domain,
                phrase: phrase.clone(),
                timestamp: capture.created_at,
                position: organic_rank,
                guarantee: preceded_by_organic,
            });
        }
    }

    rows
}
