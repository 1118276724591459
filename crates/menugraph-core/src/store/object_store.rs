use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::errors::{GraphError, Result};
use crate::identity::{Handle, ObjectRef};
use crate::object::{FieldValue, GraphView, Object};
use crate::schema::Schema;

use super::backend::{ChangeSet, CommitBackend, NullBackend};

/// Objects plus the reverse index of forward references
#[derive(Debug, Default)]
struct StoreState {
    objects: HashMap<Handle, Object>,
    /// target -> {(source, field)}
    incoming: HashMap<Handle, BTreeSet<(Handle, String)>>,
}

impl StoreState {
    fn link(&mut self, source: Handle, object: &Object) {
        for (field, r) in object.references() {
            if let Some(target) = r.handle() {
                self.incoming
                    .entry(target)
                    .or_default()
                    .insert((source, field.to_string()));
            }
        }
    }

    fn unlink(&mut self, source: Handle, object: &Object) {
        for (field, r) in object.references() {
            let Some(target) = r.handle() else { continue };
            if let Some(sources) = self.incoming.get_mut(&target) {
                sources.remove(&(source, field.to_string()));
                if sources.is_empty() {
                    self.incoming.remove(&target);
                }
            }
        }
    }
}

fn ref_targets(object: &Object) -> impl Iterator<Item = Handle> + '_ {
    object.references().into_iter().filter_map(|(_, r)| r.handle())
}

/// Undo log of an open write transaction
///
/// Holds the pre-transaction value of every object and reverse index entry
/// the transaction has modified. Only the first modification of a key is
/// recorded.
#[derive(Default)]
struct WriteTxn {
    /// Handles in first-touch order
    touched: Vec<Handle>,
    objects_before: HashMap<Handle, Option<Object>>,
    incoming_before: HashMap<Handle, Option<BTreeSet<(Handle, String)>>>,
}

impl WriteTxn {
    /// Record `handle` and the reverse index entries of `targets` before
    /// they are modified
    fn save(
        &mut self,
        state: &StoreState,
        handle: Handle,
        targets: impl IntoIterator<Item = Handle>,
    ) {
        if let Entry::Vacant(slot) = self.objects_before.entry(handle) {
            slot.insert(state.objects.get(&handle).cloned());
            self.touched.push(handle);
        }
        for target in targets {
            self.incoming_before
                .entry(target)
                .or_insert_with(|| state.incoming.get(&target).cloned());
        }
    }

    fn existed_before(&self, handle: &Handle) -> bool {
        matches!(self.objects_before.get(handle), Some(Some(_)))
    }
}

/// Transactional in-memory object store
///
/// Holds every live persisted object keyed by [`Handle`], the [`Schema`]
/// the engines consult, and a [`CommitBackend`] that receives each
/// committed [`ChangeSet`]. Mutations are only legal inside
/// [`perform_write`](Self::perform_write).
///
/// Deleting an object does not rewrite references to it held by other
/// objects; such references simply stop resolving.
pub struct ObjectStore {
    state: StoreState,
    schema: Schema,
    backend: Box<dyn CommitBackend>,
    txn: Option<WriteTxn>,
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("objects", &self.state.objects.len())
            .field("in_write_transaction", &self.txn.is_some())
            .finish()
    }
}

impl ObjectStore {
    /// Empty in-memory store
    pub fn new(schema: Schema) -> Self {
        Self::with_backend(schema, NullBackend)
    }

    /// Empty store committing through `backend`
    pub fn with_backend(schema: Schema, backend: impl CommitBackend + 'static) -> Self {
        Self {
            state: StoreState::default(),
            schema,
            backend: Box::new(backend),
            txn: None,
        }
    }

    /// Rebuild a store from previously committed objects
    ///
    /// No transaction is opened and nothing is sent to `backend`.
    pub fn restore(
        schema: Schema,
        objects: impl IntoIterator<Item = (Handle, Object)>,
        backend: impl CommitBackend + 'static,
    ) -> Self {
        let mut state = StoreState::default();
        for (handle, object) in objects {
            state.link(handle, &object);
            state.objects.insert(handle, object);
        }
        Self {
            state,
            schema,
            backend: Box::new(backend),
            txn: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ===== Write transactions =====

    pub fn is_in_write_transaction(&self) -> bool {
        self.txn.is_some()
    }

    /// Run `action` inside a write transaction
    ///
    /// When a transaction is already open the action runs directly inside
    /// it. Otherwise a new transaction is begun, the action runs once, and
    /// its net effect is committed to the backend. If the action fails or
    /// the backend refuses the commit, the in-memory state is restored to
    /// what it was before the transaction.
    ///
    /// # Errors
    ///
    /// Returns the action's own error, or `TransactionFailure` if the
    /// backend cannot begin or commit.
    pub fn perform_write<T, F>(&mut self, action: F) -> Result<T>
    where
        F: FnOnce(&mut ObjectStore) -> Result<T>,
    {
        if self.txn.is_some() {
            return action(self);
        }

        self.backend
            .begin()
            .map_err(|e| as_transaction_failure("begin", e))?;
        self.txn = Some(WriteTxn::default());

        let result = action(self);
        let Some(txn) = self.txn.take() else {
            return Err(GraphError::Internal {
                message: "write transaction vanished during action".to_string(),
            });
        };

        let value = match result {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "write transaction rolled back");
                self.abort(txn);
                return Err(err);
            }
        };

        let changes = self.change_set(&txn);
        match self.backend.commit(&changes) {
            Ok(()) => {
                tracing::debug!(
                    upserts = changes.upserts.len(),
                    deletes = changes.deletes.len(),
                    "write transaction committed"
                );
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "commit failed, rolling back");
                self.abort(txn);
                Err(as_transaction_failure("commit", err))
            }
        }
    }

    fn abort(&mut self, txn: WriteTxn) {
        for (handle, prior) in txn.objects_before {
            match prior {
                Some(object) => self.state.objects.insert(handle, object),
                None => self.state.objects.remove(&handle),
            };
        }
        for (target, prior) in txn.incoming_before {
            match prior {
                Some(sources) => self.state.incoming.insert(target, sources),
                None => self.state.incoming.remove(&target),
            };
        }
        self.backend.rollback();
    }

    fn change_set(&self, txn: &WriteTxn) -> ChangeSet {
        let mut changes = ChangeSet::default();
        for handle in &txn.touched {
            match self.state.objects.get(handle) {
                Some(object) => changes.upserts.push((*handle, object.clone())),
                None if txn.existed_before(handle) => changes.deletes.push(*handle),
                None => {}
            }
        }
        changes
    }

    fn require_txn(&mut self, op: &str) -> Result<&mut WriteTxn> {
        self.txn
            .as_mut()
            .ok_or_else(|| GraphError::NotInWriteTransaction { op: op.to_string() })
    }

    fn save_before_write(
        &mut self,
        op: &str,
        handle: Handle,
        targets: impl IntoIterator<Item = Handle>,
    ) -> Result<()> {
        let txn = self
            .txn
            .as_mut()
            .ok_or_else(|| GraphError::NotInWriteTransaction { op: op.to_string() })?;
        txn.save(&self.state, handle, targets);
        Ok(())
    }

    fn check_refs(&self, field: &str, value: &FieldValue) -> Result<()> {
        for r in value.refs() {
            let live = r.handle().is_some_and(|h| self.state.objects.contains_key(&h));
            if !live {
                return Err(GraphError::DanglingReference {
                    field: field.to_string(),
                    target: r.to_string(),
                });
            }
        }
        Ok(())
    }

    // ===== Mutations =====

    /// Persist a new object and return its handle
    ///
    /// # Errors
    ///
    /// - `NotInWriteTransaction` outside [`perform_write`](Self::perform_write)
    /// - `FieldShapeMismatch` if a declared field holds the wrong shape
    /// - `DanglingReference` if a reference is not a live persisted object
    pub fn add(&mut self, object: Object) -> Result<Handle> {
        self.require_txn("add")?;
        self.schema.validate_object(&object)?;
        for (field, value) in object.fields() {
            self.check_refs(field, value)?;
        }

        let handle = Handle::new();
        self.save_before_write("add", handle, ref_targets(&object))?;
        self.state.link(handle, &object);
        self.state.objects.insert(handle, object);
        Ok(handle)
    }

    /// Replace one field of a live object
    ///
    /// # Errors
    ///
    /// - `NotInWriteTransaction` outside a write transaction
    /// - `NotFound` if `handle` is detached
    /// - `FieldShapeMismatch` / `DanglingReference` as for [`add`](Self::add)
    pub fn set_field(&mut self, handle: Handle, field: &str, value: FieldValue) -> Result<()> {
        self.require_txn("set_field")?;
        let current = self
            .state
            .objects
            .get(&handle)
            .ok_or(GraphError::NotFound { handle })?;

        let mut updated = current.clone();
        updated.set(field, value);
        self.schema.validate_object(&updated)?;
        if let Some(value) = updated.field(field) {
            self.check_refs(field, value)?;
        }

        let previous = current.clone();
        let targets: Vec<Handle> = ref_targets(&previous).chain(ref_targets(&updated)).collect();
        self.save_before_write("set_field", handle, targets)?;
        self.state.unlink(handle, &previous);
        self.state.link(handle, &updated);
        self.state.objects.insert(handle, updated);
        Ok(())
    }

    /// Remove a live object
    ///
    /// Only this object is removed; owned children are the business of
    /// [`cascade_delete`](crate::graph::cascade_delete).
    ///
    /// # Errors
    ///
    /// - `NotInWriteTransaction` outside a write transaction
    /// - `NotFound` if `handle` is already detached
    pub fn delete(&mut self, handle: Handle) -> Result<()> {
        self.require_txn("delete")?;
        let object = self.get_or_err(handle)?;
        let targets: Vec<Handle> = ref_targets(object).chain(std::iter::once(handle)).collect();
        self.save_before_write("delete", handle, targets)?;

        if let Some(object) = self.state.objects.remove(&handle) {
            self.state.unlink(handle, &object);
        }
        self.state.incoming.remove(&handle);
        Ok(())
    }

    // ===== Reads =====

    /// True when `handle` does not name a live object
    pub fn is_detached(&self, handle: Handle) -> bool {
        !self.state.objects.contains_key(&handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&Object> {
        self.state.objects.get(&handle)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if `handle` is detached.
    pub fn get_or_err(&self, handle: Handle) -> Result<&Object> {
        self.get(handle).ok_or(GraphError::NotFound { handle })
    }

    /// Live object of the given kind
    ///
    /// # Errors
    ///
    /// `NotFound` if detached, `KindMismatch` if the object has another kind.
    pub fn get_of_kind(&self, handle: Handle, kind: &str) -> Result<&Object> {
        let object = self.get_or_err(handle)?;
        if object.kind() != kind {
            return Err(GraphError::KindMismatch {
                object: handle.to_string(),
                expected: kind.to_string(),
                found: object.kind().to_string(),
            });
        }
        Ok(object)
    }

    pub fn len(&self) -> usize {
        self.state.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.objects.is_empty()
    }

    /// All live handles in ascending order
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.state.objects.keys().copied().collect();
        handles.sort();
        handles
    }

    /// Live objects of one kind, ordered by handle
    pub fn objects_of_kind(&self, kind: &str) -> Vec<(Handle, &Object)> {
        let mut found: Vec<(Handle, &Object)> = self
            .state
            .objects
            .iter()
            .filter(|(_, o)| o.kind() == kind)
            .map(|(h, o)| (*h, o))
            .collect();
        found.sort_by_key(|(h, _)| *h);
        found
    }

    /// Live objects referencing `target`, as `(source, field)` pairs
    pub fn back_references(&self, target: Handle) -> Vec<(Handle, &str)> {
        self.state
            .incoming
            .get(&target)
            .map(|sources| {
                sources
                    .iter()
                    .filter(|(source, _)| self.state.objects.contains_key(source))
                    .map(|(source, field)| (*source, field.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl GraphView for ObjectStore {
    fn resolve(&self, r: &ObjectRef) -> Option<&Object> {
        match r {
            ObjectRef::Persisted(handle) => self.state.objects.get(handle),
            ObjectRef::Standalone(_) => None,
        }
    }
}

fn as_transaction_failure(op: &str, err: GraphError) -> GraphError {
    match err {
        GraphError::TransactionFailure { .. } => err,
        other => GraphError::transaction(op, other.to_string()),
    }
}
