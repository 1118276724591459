//! Commit backend seam
//!
//! The in-memory [`ObjectStore`](super::ObjectStore) is authoritative while
//! the process runs. A [`CommitBackend`] receives the net effect of each
//! write transaction so it can be made durable.

use crate::errors::Result;
use crate::identity::Handle;
use crate::object::Object;

/// Net effect of one write transaction
///
/// `upserts` holds the final state of every created or modified object,
/// `deletes` every object that existed before the transaction and is gone
/// after it. Both are in first-touch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub upserts: Vec<(Handle, Object)>,
    pub deletes: Vec<Handle>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Durable side of a write transaction
///
/// `begin` is called before the action runs, then exactly one of `commit`
/// or `rollback`. Failures should be reported as
/// `GraphError::TransactionFailure`.
pub trait CommitBackend: Send {
    /// # Errors
    ///
    /// Returns an error if the durable transaction cannot be opened.
    fn begin(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the change set cannot be made durable; the caller
    /// rolls back its in-memory state.
    fn commit(&mut self, changes: &ChangeSet) -> Result<()>;

    fn rollback(&mut self);
}

/// Backend for purely in-memory stores
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl CommitBackend for NullBackend {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self, _changes: &ChangeSet) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) {}
}
