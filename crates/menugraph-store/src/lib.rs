//! MenuGraph Store - SQLite persistence for the object store
//!
//! Provides:
//! - Connection management and embedded, checksummed migrations
//! - [`SqliteBackend`], a commit backend writing each change set in one
//!   SQLite transaction
//! - Hydration of an [`ObjectStore`](menugraph_core::ObjectStore) from disk

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::{hydrate, open_store, SqliteBackend};
