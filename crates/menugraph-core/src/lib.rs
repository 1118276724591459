//! MenuGraph Core - persistent object graph engine for a food catalog
//!
//! Objects live in a transactional [`ObjectStore`] and are described by a
//! [`Schema`] that marks which relationship fields are owned. On top of that:
//! - [`cascade_delete`] removes an object and everything it owns
//! - [`deep_copy`] copies an owned subgraph into a standalone [`DetachedGraph`]
//! - [`ObjectStore::perform_write`] opens at most one write transaction
//! - [`catalog`] models dishes, variants and money, plus refresh policy

pub mod catalog;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod graph;
pub mod identity;
pub mod logging_facility;
pub mod object;
pub mod schema;
pub mod store;

pub use menugraph_core_types;

pub use config::EngineConfig;
pub use decimal::{Decimal, RoundingMode};
pub use errors::{ExError, ExErrorKind, GraphError, Result};
pub use graph::{cascade_delete, cascade_delete_one, deep_copy, CascadeReport, DetachedGraph};
pub use identity::{CopyId, Handle, ObjectRef};
pub use object::{FieldValue, GraphView, Object, ScalarValue};
pub use schema::{FieldShape, Schema, SchemaBuilder};
pub use store::{ChangeSet, CommitBackend, NullBackend, ObjectStore};
