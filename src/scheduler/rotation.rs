//! Phrase rotation
//!
//! Decides which phrases a contributor should fetch next:
//! - phrases that were never parsed are always handed out first, in random order
//! - the remainder comes from a random sample of the least recently parsed
//!   phrases, drawn from a pool `stale_pool_factor` times larger than needed
//!
//! Scheduling does not touch `last_parsed_at`; only a successful parse does.
//! Two concurrent callers may receive the same phrase.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::storage::SharedRankRepository;

/// Default stale pool multiplier
pub const DEFAULT_STALE_POOL_FACTOR: usize = 5;

/// Phrase rotation scheduler backed by the record store
#[derive(Clone)]
pub struct PhraseRotation {
    repo: SharedRankRepository,
    stale_pool_factor: usize,
}

impl PhraseRotation {
    pub fn new(repo: SharedRankRepository) -> Self {
        Self::with_pool_factor(repo, DEFAULT_STALE_POOL_FACTOR)
    }

    pub fn with_pool_factor(repo: SharedRankRepository, stale_pool_factor: usize) -> Self {
        Self {
            repo,
            stale_pool_factor: stale_pool_factor.max(1),
        }
    }

    /// Pick up to `n` phrase names to hand to a contributor
    pub fn rotate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let never_parsed = self.repo.never_parsed_phrases()?;
        let remainder = n.saturating_sub(never_parsed.len());
        let stale_pool = if remainder > 0 {
            self.repo
                .stalest_phrases(remainder.saturating_mul(self.stale_pool_factor))?
        } else {
            Vec::new()
        };

        let picked = select_phrases(never_parsed, stale_pool, n, rng);
        tracing::debug!(requested = n, picked = picked.len(), "Rotated phrases");
        Ok(picked)
    }
}

/// Pure selection step: never-parsed first, then a sample of the stale pool
///
/// `stale_pool` must already be ordered oldest first and bounded; it is
/// sampled uniformly.
pub fn select_phrases<R: Rng + ?Sized>(
    never_parsed: Vec<String>,
    stale_pool: Vec<String>,
    n: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut picked = sample(never_parsed, n, rng);
    let remainder = n - picked.len();
    if remainder > 0 {
        picked.extend(sample(stale_pool, remainder, rng));
    }
    picked
}

/// Uniform random sample of up to `amount` items, in random order
fn sample<R: Rng + ?Sized>(mut items: Vec<String>, amount: usize, rng: &mut R) -> Vec<String> {
    let amount = amount.min(items.len());
    let (chosen, _) = items.partial_shuffle(rng, amount);
    chosen.to_vec()
}
