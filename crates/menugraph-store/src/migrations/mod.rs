//! Migration framework
//!
//! Migrations are embedded SQL files applied in order, each inside its own
//! transaction and recorded in `schema_version` with a SHA-256 checksum.
//! Re-running is a no-op; an applied migration whose text changed is refused.

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
