//! Work scheduling for contributors
//!
//! # Overview
//!
//! Contributors repeatedly ask what to fetch. Each answer is a batch of
//! phrases plus a delay before the next request:
//!
//! ```text
//!   work request (n, address)
//!          │
//!          ├──▶ PhraseRotation ──▶ never-parsed first, then stalest sample
//!          │
//!          └──▶ DelayEstimator ──▶ cycle × workers × n / phrases, floored
//!                     │
//!                     └──▶ activity row (heartbeat)
//! ```
//!
//! # Modules
//!
//! - [`rotation`] - staleness-based phrase selection
//! - [`delay`] - polling delay estimation
//! - [`offset`] - atomic named counter (round-robin windows)
//!
//! Concurrent callers may receive overlapping phrase batches; no per-phrase
//! lock is taken.

pub mod delay;
pub mod offset;
pub mod rotation;

pub use delay::{compute_delay_secs, DelayEstimator};
pub use offset::{OffsetCounter, PHRASE_OFFSET};
pub use rotation::{select_phrases, PhraseRotation, DEFAULT_STALE_POOL_FACTOR};
