//! Cascade delete through owned relationships
//!
//! The deletion closure of a set of roots is every live object reachable
//! from them over owned fields, in depth-first pre-order. Referenced
//! objects are never part of it, and each object appears once no matter how
//! many owned paths reach it.

use std::collections::HashSet;

use crate::errors::Result;
use crate::identity::Handle;
use crate::store::ObjectStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Handles removed by one cascade, in deletion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub deleted: Vec<Handle>,
}

impl CascadeReport {
    pub fn len(&self) -> usize {
        self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty()
    }
}

/// Compute the deletion closure of `roots` without mutating anything
///
/// Detached roots and detached children are skipped.
pub fn deletion_closure(store: &ObjectStore, roots: &[Handle]) -> Vec<Handle> {
    let mut to_delete = Vec::new();
    let mut visited = HashSet::new();

    for root in roots {
        let mut stack = vec![*root];
        while let Some(handle) = stack.pop() {
            let Some(object) = store.get(handle) else {
                continue;
            };
            if !visited.insert(handle) {
                continue;
            }
            to_delete.push(handle);

            let mut children = Vec::new();
            for field in store.schema().owned_fields(object.kind()) {
                if let Some(value) = object.field(field) {
                    children.extend(value.refs().into_iter().filter_map(|r| r.handle()));
                }
            }
            // reversed so the first declared child is visited first
            stack.extend(children.into_iter().rev());
        }
    }

    to_delete
}

/// Delete `roots` and everything they own in one write transaction
///
/// Runs inside the caller's transaction when one is open. An empty closure
/// (no roots, or only detached ones) opens no transaction.
///
/// # Errors
///
/// Returns `TransactionFailure` if the backend cannot begin or commit; in
/// that case no object of the closure is deleted.
pub fn cascade_delete(store: &mut ObjectStore, roots: &[Handle]) -> Result<CascadeReport> {
    log_op_start!("cascade_delete", root_count = roots.len());
    let start = std::time::Instant::now();

    let result = cascade_delete_impl(store, roots).map_err(|e| {
        log_op_error!(
            "cascade_delete",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "cascade_delete",
        duration_ms = start.elapsed().as_millis() as u64,
        closure_len = result.len()
    );

    Ok(result)
}

fn cascade_delete_impl(store: &mut ObjectStore, roots: &[Handle]) -> Result<CascadeReport> {
    let closure = deletion_closure(store, roots);
    if closure.is_empty() {
        return Ok(CascadeReport::default());
    }

    store.perform_write(|s| {
        for handle in &closure {
            s.delete(*handle)?;
        }
        Ok(())
    })?;

    Ok(CascadeReport { deleted: closure })
}

/// [`cascade_delete`] for a single root
///
/// # Errors
///
/// Same as [`cascade_delete`].
pub fn cascade_delete_one(store: &mut ObjectStore, root: Handle) -> Result<CascadeReport> {
    cascade_delete(store, &[root])
}
