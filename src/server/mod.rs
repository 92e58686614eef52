//! HTTP surface for contributors and operators
//!
//! - [`api`] - routes, handlers and wire types
//! - [`app`] - shared state, server lifecycle and the background parse task

pub mod api;
pub mod app;

pub use api::{create_router, ContributorAddress};
pub use app::{build_router, AppState, RankServer, ServerError, ServerInfo};
