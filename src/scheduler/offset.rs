//! Named offset counter
//!
//! A durable integer with atomic "add delta, return previous value"
//! semantics. It predates staleness-based rotation, when phrases were handed
//! out round-robin by sliding a window over the ordered phrase list; the
//! contract is kept for that use.

use crate::error::Result;
use crate::storage::SharedRankRepository;

/// Counter name used for round-robin phrase windows
pub const PHRASE_OFFSET: &str = "phrases";

/// Handle to one named counter in the record store
#[derive(Clone)]
pub struct OffsetCounter {
    repo: SharedRankRepository,
    name: String,
}

impl OffsetCounter {
    pub fn new(repo: SharedRankRepository, name: impl Into<String>) -> Self {
        Self {
            repo,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add `delta` and return the value before the addition
    pub fn increment(&self, delta: i64) -> Result<i64> {
        let previous = self.repo.increment_offset(&self.name, delta)?;
        tracing::debug!(counter = %self.name, previous, delta, "Offset incremented");
        Ok(previous)
    }

    /// Current value, 0 for a counter that was never incremented
    pub fn value(&self) -> Result<i64> {
        Ok(self.repo.offset_value(&self.name)?.unwrap_or(0))
    }

    /// Take the next `n` items of `ordered` round-robin, advancing the counter by `n`
    pub fn next_window<T: Clone>(&self, ordered: &[T], n: usize) -> Result<Vec<T>> {
        if ordered.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        let step = i64::try_from(n)
            .map_err(|_| crate::error::Error::other(format!("window of {n} items is out of range")))?;
        let start = self.increment(step)?.rem_euclid(ordered.len() as i64) as usize;
        Ok(ordered
            .iter()
            .cycle()
            .skip(start)
            .take(n.min(ordered.len()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MockRankRepository, SqliteRankRepository};
    use std::sync::Arc;

    fn counters() -> Vec<OffsetCounter> {
        vec![
            OffsetCounter::new(Arc::new(MockRankRepository::new()), PHRASE_OFFSET),
            OffsetCounter::new(
                Arc::new(SqliteRankRepository::in_memory().unwrap()),
                PHRASE_OFFSET,
            ),
        ]
    }

    #[test]
    fn test_increment_returns_previous_value() {
        for counter in counters() {
            assert_eq!(counter.increment(3).unwrap(), 0);
            assert_eq!(counter.increment(4).unwrap(), 3);
            assert_eq!(counter.value().unwrap(), 7);
        }
    }

    #[test]
    fn test_fresh_counter_value() {
        for counter in counters() {
            assert_eq!(counter.value().unwrap(), 0);
            assert_eq!(counter.name(), "phrases");
        }
    }

    #[test]
    fn test_next_window_wraps() {
        for counter in counters() {
            let items = ["a", "b", "c", "d", "e"];
            assert_eq!(counter.next_window(&items, 2).unwrap(), vec!["a", "b"]);
            assert_eq!(counter.next_window(&items, 2).unwrap(), vec!["c", "d"]);
            assert_eq!(counter.next_window(&items, 2).unwrap(), vec!["e", "a"]);
            assert_eq!(counter.value().unwrap(), 6);
        }
    }

    #[test]
    fn test_increment_past_max_fails_without_change() {
        for counter in counters() {
            counter.increment(i64::MAX - 1).unwrap();
            assert!(counter.increment(2).is_err());
            assert_eq!(counter.value().unwrap(), i64::MAX - 1);
            assert_eq!(counter.increment(1).unwrap(), i64::MAX - 1);
        }
    }

    #[test]
    fn test_next_window_empty() {
        for counter in counters() {
            let items: [&str; 0] = [];
            assert!(counter.next_window(&items, 3).unwrap().is_empty());
            assert_eq!(counter.value().unwrap(), 0);
        }
    }
}
