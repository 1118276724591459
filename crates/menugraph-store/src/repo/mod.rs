//! Repository layer bridging the in-memory object store and SQLite

pub mod hydration;
pub mod sqlite_backend;

pub use hydration::{hydrate, load_objects, open_store};
pub use sqlite_backend::SqliteBackend;
