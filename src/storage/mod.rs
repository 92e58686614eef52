//! Persistence for captures, phrases, sites, contributor activity and counters
//!
//! The ranking core only sees the [`RankRepository`] trait; SQLite is the
//! production backend.

pub mod repository;

pub use repository::{
    create_mock_repository, create_sqlite_repository, MockRankRepository, RankRepository,
    SharedRankRepository, SqliteRankRepository,
};
