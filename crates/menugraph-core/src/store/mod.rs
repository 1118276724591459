//! Transactional object store with write elision

pub mod backend;
pub mod object_store;

pub use backend::{ChangeSet, CommitBackend, NullBackend};
pub use object_store::ObjectStore;
