//! Repository Pattern for Database Abstraction
//!
//! This module provides the record store the ranking core runs against,
//! decoupling the algorithms from the storage engine:
//! - `SqliteRankRepository` for production
//! - `MockRankRepository` (in-memory) for tests and throwaway runs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │    Pipeline / Scheduler / Aggregator / RankService          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     RankRepository                          │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                           │
//!                  ▼                           ▼
//!        ┌─────────────────┐         ┌─────────────────┐
//!        │     SQLite      │         │      Mock       │
//!        └─────────────────┘         └─────────────────┘
//! ```
//!
//! Timestamps are persisted as microseconds since the Unix epoch so that
//! range filters and ordering are plain integer comparisons.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::engine::phrase_key;
use crate::error::{Error, Result};
use crate::models::{ActivityRecord, Capture, ListingEntry, NewCapture, Phrase};

fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

/// Normalise to phrase keys, drop blanks and duplicates while keeping first-seen order
fn dedup_names(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .map(|n| phrase_key(n))
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

// ============================================================================
// Repository Trait
// ============================================================================

/// Record store for captures, phrases, sites, contributor activity and offsets
pub trait RankRepository: Send + Sync {
    /// Store a new capture and return its id
    fn insert_capture(&self, capture: &NewCapture, created_at: DateTime<Utc>) -> Result<i64>;

    /// Get capture by id
    fn get_capture(&self, id: i64) -> Result<Option<Capture>>;

    /// Captures never attempted, oldest first
    fn pending_captures(&self, limit: usize) -> Result<Vec<Capture>>;

    /// Store a successful parse and stamp `phrase` as parsed at `at` in one write
    ///
    /// Returns false if `phrase` is not tracked; the listing is stored either way.
    fn resolve_capture(
        &self,
        id: i64,
        positions: &[ListingEntry],
        phrase: &str,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Flag a capture as a captcha page
    fn mark_captcha(&self, id: i64) -> Result<()>;

    /// Record why a capture could not be parsed; it stays unresolved
    fn mark_parse_failed(&self, id: i64, reason: &str) -> Result<()>;

    /// Clear recorded parse failures so the next batch run attempts them again
    fn reset_parse_failures(&self) -> Result<usize>;

    /// Resolved captures created after `since`, newest first
    ///
    /// The page text is not loaded; `text` is left empty.
    fn resolved_captures_since(&self, since: DateTime<Utc>) -> Result<Vec<Capture>>;

    /// Replace the phrase set wholesale
    fn replace_phrases(&self, names: &[String]) -> Result<usize>;

    /// All phrases
    fn phrases(&self) -> Result<Vec<Phrase>>;

    /// Number of phrases
    fn phrase_count(&self) -> Result<usize>;

    /// Names of phrases with no successful parse yet
    fn never_parsed_phrases(&self) -> Result<Vec<String>>;

    /// Names of previously parsed phrases, least recently parsed first
    fn stalest_phrases(&self, limit: usize) -> Result<Vec<String>>;

    /// Stamp a phrase as parsed; returns false if the phrase no longer exists
    fn mark_phrase_parsed(&self, name: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Replace the site-of-interest set wholesale
    fn replace_sites(&self, names: &[String]) -> Result<usize>;

    /// All sites of interest
    fn sites(&self) -> Result<Vec<String>>;

    /// Record one work request from `address`
    fn record_activity(&self, address: &str, at: DateTime<Utc>) -> Result<()>;

    /// Delete activity rows at or before `before`, returning how many were removed
    fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize>;

    /// Count distinct addresses with activity after `since`
    fn count_active_contributors(&self, since: DateTime<Utc>) -> Result<usize>;

    /// Atomically add `delta` to a named counter and return the previous value
    ///
    /// Fails without changing the counter if the sum overflows.
    fn increment_offset(&self, name: &str, delta: i64) -> Result<i64>;

    /// Current value of a named counter
    fn offset_value(&self, name: &str) -> Result<Option<i64>>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite implementation of RankRepository
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteRankRepository {
    conn: Mutex<Connection>,
}

impl SqliteRankRepository {
    /// Open (or create) a SQLite repository at `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS captures (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    url TEXT NOT NULL,
                    phrase TEXT NOT NULL,
                    text TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    contributor TEXT NOT NULL,
                    positions TEXT,
                    captcha INTEGER NOT NULL DEFAULT 0,
                    parse_error TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_captures_created_at
                    ON captures(created_at);

                CREATE INDEX IF NOT EXISTS idx_captures_phrase
                    ON captures(phrase);

                CREATE TABLE IF NOT EXISTS phrases (
                    name TEXT PRIMARY KEY,
                    last_parsed_at INTEGER
                );

                CREATE TABLE IF NOT EXISTS sites (
                    name TEXT PRIMARY KEY
                );

                CREATE TABLE IF NOT EXISTS activity (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    at INTEGER NOT NULL,
                    address TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_activity_at
                    ON activity(at);

                CREATE TABLE IF NOT EXISTS offsets (
                    name TEXT PRIMARY KEY,
                    value INTEGER NOT NULL,
                    changed_at INTEGER NOT NULL
                );
                "#,
        )?;

        Ok(())
    }

    fn row_to_capture(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Capture, Option<String>)> {
        let capture = Capture {
            id: row.get(0)?,
            url: row.get(1)?,
            phrase: row.get(2)?,
            text: row.get(3)?,
            created_at: from_micros(row.get(4)?),
            contributor: row.get(5)?,
            positions: None,
            captcha: row.get(7)?,
            parse_error: row.get(8)?,
        };
        Ok((capture, row.get(6)?))
    }

    fn query_captures(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Capture>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, Self::row_to_capture)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(mut capture, positions)| -> Result<Capture> {
                capture.positions = positions
                    .map(|json| serde_json::from_str::<Vec<ListingEntry>>(&json))
                    .transpose()?;
                Ok(capture)
            })
            .collect()
    }

    fn replace_names(&self, table: &str, names: &[String]) -> Result<usize> {
        let names = dedup_names(names);
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(&format!("DELETE FROM {table}"), [])?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {table} (name) VALUES (?1)"))?;
            for name in &names {
                stmt.execute(params![name])?;
            }
        }
        tx.commit()?;
        Ok(names.len())
    }
}

const CAPTURE_COLUMNS: &str =
    "id, url, phrase, text, created_at, contributor, positions, captcha, parse_error";

// Same shape as CAPTURE_COLUMNS without reading the page text
const REPORT_COLUMNS: &str =
    "id, url, phrase, '' AS text, created_at, contributor, positions, captcha, parse_error";

fn stamp_phrase(conn: &Connection, name: &str, at: DateTime<Utc>) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE phrases SET last_parsed_at = ?1 WHERE name = ?2",
        params![to_micros(at), name],
    )?;
    Ok(changed > 0)
}

fn offset_overflow(name: &str, previous: i64, delta: i64) -> Error {
    Error::other(format!(
        "offset counter {name} overflows: {previous} + {delta}"
    ))
}

impl RankRepository for SqliteRankRepository {
    fn insert_capture(&self, capture: &NewCapture, created_at: DateTime<Utc>) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO captures (url, phrase, text, created_at, contributor)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                capture.url,
                capture.phrase,
                capture.text,
                to_micros(created_at),
                capture.contributor
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_capture(&self, id: i64) -> Result<Option<Capture>> {
        let sql = format!("SELECT {CAPTURE_COLUMNS} FROM captures WHERE id = ?1");
        Ok(self.query_captures(&sql, params![id])?.into_iter().next())
    }

    fn pending_captures(&self, limit: usize) -> Result<Vec<Capture>> {
        let sql = format!(
            "SELECT {CAPTURE_COLUMNS} FROM captures
             WHERE positions IS NULL AND captcha = 0 AND parse_error IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT ?1"
        );
        self.query_captures(&sql, params![limit as i64])
    }

    fn resolve_capture(
        &self,
        id: i64,
        positions: &[ListingEntry],
        phrase: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let json = serde_json::to_string(positions)?;
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "UPDATE captures SET positions = ?1, parse_error = NULL WHERE id = ?2",
            params![json, id],
        )?;
        let tracked = stamp_phrase(&tx, phrase, at)?;
        tx.commit()?;
        Ok(tracked)
    }

    fn mark_captcha(&self, id: i64) -> Result<()> {
        self.conn()
            .execute("UPDATE captures SET captcha = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn mark_parse_failed(&self, id: i64, reason: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE captures SET parse_error = ?1 WHERE id = ?2",
            params![reason, id],
        )?;
        Ok(())
    }

    fn reset_parse_failures(&self) -> Result<usize> {
        let changed = self.conn().execute(
            "UPDATE captures SET parse_error = NULL
             WHERE parse_error IS NOT NULL AND positions IS NULL AND captcha = 0",
            [],
        )?;
        Ok(changed)
    }

    fn resolved_captures_since(&self, since: DateTime<Utc>) -> Result<Vec<Capture>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM captures
             WHERE positions IS NOT NULL AND captcha = 0 AND created_at > ?1
             ORDER BY created_at DESC, id DESC"
        );
        self.query_captures(&sql, params![to_micros(since)])
    }

    fn replace_phrases(&self, names: &[String]) -> Result<usize> {
        self.replace_names("phrases", names)
    }

    fn phrases(&self) -> Result<Vec<Phrase>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name, last_parsed_at FROM phrases ORDER BY name")?;
        let phrases = stmt
            .query_map([], |row| {
                Ok(Phrase {
                    name: row.get(0)?,
                    last_parsed_at: row.get::<_, Option<i64>>(1)?.map(from_micros),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(phrases)
    }

    fn phrase_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM phrases", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn never_parsed_phrases(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT name FROM phrases WHERE last_parsed_at IS NULL ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn stalest_phrases(&self, limit: usize) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name FROM phrases WHERE last_parsed_at IS NOT NULL
             ORDER BY last_parsed_at ASC, name ASC LIMIT ?1",
        )?;
        let names = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn mark_phrase_parsed(&self, name: &str, at: DateTime<Utc>) -> Result<bool> {
        stamp_phrase(&self.conn(), name, at)
    }

    fn replace_sites(&self, names: &[String]) -> Result<usize> {
        self.replace_names("sites", names)
    }

    fn sites(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM sites ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn record_activity(&self, address: &str, at: DateTime<Utc>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO activity (at, address) VALUES (?1, ?2)",
            params![to_micros(at), address],
        )?;
        Ok(())
    }

    fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM activity WHERE at <= ?1",
            params![to_micros(before)],
        )?;
        Ok(removed)
    }

    fn count_active_contributors(&self, since: DateTime<Utc>) -> Result<usize> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(DISTINCT address) FROM activity WHERE at > ?1",
            params![to_micros(since)],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn increment_offset(&self, name: &str, delta: i64) -> Result<i64> {
        let mut conn = self.conn();
        // IMMEDIATE takes the write lock up front so other processes cannot interleave
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous: i64 = tx
            .query_row(
                "SELECT value FROM offsets WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);
        let next = previous
            .checked_add(delta)
            .ok_or_else(|| offset_overflow(name, previous, delta))?;

        tx.execute(
            r#"
                INSERT INTO offsets (name, value, changed_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    value = excluded.value,
                    changed_at = excluded.changed_at
                "#,
            params![name, next, to_micros(Utc::now())],
        )?;
        tx.commit()?;

        Ok(previous)
    }

    fn offset_value(&self, name: &str) -> Result<Option<i64>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM offsets WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

// ============================================================================
// Mock Implementation (for testing)
// ============================================================================

#[derive(Default)]
struct MockState {
    captures: Vec<Capture>,
    phrases: BTreeMap<String, Option<DateTime<Utc>>>,
    sites: BTreeSet<String>,
    activity: Vec<ActivityRecord>,
    offsets: HashMap<String, i64>,
}

/// In-memory implementation of RankRepository
///
/// Useful for testing without database dependencies. A single lock guards
/// all tables, so every operation is atomic.
#[derive(Default)]
pub struct MockRankRepository {
    state: RwLock<MockState>,
}

impl MockRankRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored captures
    pub fn len(&self) -> usize {
        self.read().captures.len()
    }

    /// Check if no captures are stored
    pub fn is_empty(&self) -> bool {
        self.read().captures.is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_capture(&self, id: i64, f: impl FnOnce(&mut Capture)) {
        if let Some(capture) = self.write().captures.iter_mut().find(|c| c.id == id) {
            f(capture);
        }
    }
}

impl RankRepository for MockRankRepository {
    fn insert_capture(&self, capture: &NewCapture, created_at: DateTime<Utc>) -> Result<i64> {
        let mut state = self.write();
        let id = state.captures.last().map_or(1, |c| c.id + 1);
        state.captures.push(Capture {
            id,
            url: capture.url.clone(),
            phrase: capture.phrase.clone(),
            text: capture.text.clone(),
            created_at,
            contributor: capture.contributor.clone(),
            positions: None,
            captcha: false,
            parse_error: None,
        });
        Ok(id)
    }

    fn get_capture(&self, id: i64) -> Result<Option<Capture>> {
        Ok(self.read().captures.iter().find(|c| c.id == id).cloned())
    }

    fn pending_captures(&self, limit: usize) -> Result<Vec<Capture>> {
        let mut pending: Vec<Capture> = self
            .read()
            .captures
            .iter()
            .filter(|c| c.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|c| (c.created_at, c.id));
        pending.truncate(limit);
        Ok(pending)
    }

    fn resolve_capture(
        &self,
        id: i64,
        positions: &[ListingEntry],
        phrase: &str,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut state = self.write();
        if let Some(capture) = state.captures.iter_mut().find(|c| c.id == id) {
            capture.positions = Some(positions.to_vec());
            capture.parse_error = None;
        }
        Ok(match state.phrases.get_mut(phrase) {
            Some(slot) => {
                *slot = Some(at);
                true
            }
            None => false,
        })
    }

    fn mark_captcha(&self, id: i64) -> Result<()> {
        self.update_capture(id, |c| c.captcha = true);
        Ok(())
    }

    fn mark_parse_failed(&self, id: i64, reason: &str) -> Result<()> {
        self.update_capture(id, |c| c.parse_error = Some(reason.to_string()));
        Ok(())
    }

    fn reset_parse_failures(&self) -> Result<usize> {
        let mut state = self.write();
        let mut changed = 0;
        for capture in state
            .captures
            .iter_mut()
            .filter(|c| c.parse_error.is_some() && c.positions.is_none() && !c.captcha)
        {
            capture.parse_error = None;
            changed += 1;
        }
        Ok(changed)
    }

    fn resolved_captures_since(&self, since: DateTime<Utc>) -> Result<Vec<Capture>> {
        let mut resolved: Vec<Capture> = self
            .read()
            .captures
            .iter()
            .filter(|c| c.is_resolved() && c.created_at > since)
            .map(|c| Capture {
                text: String::new(),
                ..c.clone()
            })
            .collect();
        resolved.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(resolved)
    }

    fn replace_phrases(&self, names: &[String]) -> Result<usize> {
        let names = dedup_names(names);
        let mut state = self.write();
        state.phrases = names.iter().map(|n| (n.clone(), None)).collect();
        Ok(names.len())
    }

    fn phrases(&self) -> Result<Vec<Phrase>> {
        Ok(self
            .read()
            .phrases
            .iter()
            .map(|(name, at)| Phrase {
                name: name.clone(),
                last_parsed_at: *at,
            })
            .collect())
    }

    fn phrase_count(&self) -> Result<usize> {
        Ok(self.read().phrases.len())
    }

    fn never_parsed_phrases(&self) -> Result<Vec<String>> {
        Ok(self
            .read()
            .phrases
            .iter()
            .filter(|(_, at)| at.is_none())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn stalest_phrases(&self, limit: usize) -> Result<Vec<String>> {
        let state = self.read();
        let mut parsed: Vec<(DateTime<Utc>, &String)> = state
            .phrases
            .iter()
            .filter_map(|(name, at)| at.map(|at| (at, name)))
            .collect();
        parsed.sort();
        Ok(parsed
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn mark_phrase_parsed(&self, name: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.write();
        match state.phrases.get_mut(name) {
            Some(slot) => {
                *slot = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn replace_sites(&self, names: &[String]) -> Result<usize> {
        let names = dedup_names(names);
        self.write().sites = names.iter().cloned().collect();
        Ok(names.len())
    }

    fn sites(&self) -> Result<Vec<String>> {
        Ok(self.read().sites.iter().cloned().collect())
    }

    fn record_activity(&self, address: &str, at: DateTime<Utc>) -> Result<()> {
        self.write().activity.push(ActivityRecord {
            at,
            address: address.to_string(),
        });
        Ok(())
    }

    fn prune_activity(&self, before: DateTime<Utc>) -> Result<usize> {
        let mut state = self.write();
        let kept_before = state.activity.len();
        state.activity.retain(|r| r.at > before);
        Ok(kept_before - state.activity.len())
    }

    fn count_active_contributors(&self, since: DateTime<Utc>) -> Result<usize> {
        let state = self.read();
        let distinct: BTreeSet<&str> = state
            .activity
            .iter()
            .filter(|r| r.at > since)
            .map(|r| r.address.as_str())
            .collect();
        Ok(distinct.len())
    }

    fn increment_offset(&self, name: &str, delta: i64) -> Result<i64> {
        let mut state = self.write();
        let value = state.offsets.entry(name.to_string()).or_insert(0);
        let previous = *value;
        *value = previous
            .checked_add(delta)
            .ok_or_else(|| offset_overflow(name, previous, delta))?;
        Ok(previous)
    }

    fn offset_value(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.read().offsets.get(name).copied())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared repository wrapper
pub type SharedRankRepository = Arc<dyn RankRepository>;

/// Create a shared SQLite repository
pub fn create_sqlite_repository(path: impl AsRef<Path>) -> Result<SharedRankRepository> {
    let repo = SqliteRankRepository::new(path)?;
    Ok(Arc::new(repo))
}

/// Create a shared mock repository
pub fn create_mock_repository() -> SharedRankRepository {
    Arc::new(MockRankRepository::new())
}

// ============================================================================
// Tests
// ============================================================================
