//! Deep copy of an owned subgraph into a standalone graph
//!
//! Owned edges are followed and copied; referenced edges are cut. Copies are
//! memoised by original handle, so two owned paths reaching the same
//! original end at the same copy and cycles terminate.

use std::collections::HashMap;

use crate::identity::{CopyId, Handle, ObjectRef};
use crate::object::{FieldValue, GraphView, Object};
use crate::store::ObjectStore;
use crate::{log_op_end, log_op_start};

/// Arena of standalone objects produced by [`deep_copy`]
///
/// Shares nothing with the store it was copied from. Copy identity is
/// [`CopyId`] equality.
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedGraph {
    nodes: Vec<Object>,
    origins: Vec<Handle>,
    root: CopyId,
}

impl DetachedGraph {
    pub fn root(&self) -> CopyId {
        self.root
    }

    pub fn root_object(&self) -> Option<&Object> {
        self.get(self.root)
    }

    pub fn get(&self, id: CopyId) -> Option<&Object> {
        self.nodes.get(id.index())
    }

    /// Handle of the persisted object `id` was copied from
    pub fn origin(&self, id: CopyId) -> Option<Handle> {
        self.origins.get(id.index()).copied()
    }

    /// Copy made of `original`, if it is part of this graph
    pub fn copy_of(&self, original: Handle) -> Option<CopyId> {
        self.origins
            .iter()
            .position(|h| *h == original)
            .map(CopyId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CopyId, &Object)> {
        self.nodes.iter().enumerate().map(|(i, o)| (CopyId(i), o))
    }
}

impl GraphView for DetachedGraph {
    fn resolve(&self, r: &ObjectRef) -> Option<&Object> {
        match r {
            ObjectRef::Standalone(id) => self.get(*id),
            ObjectRef::Persisted(_) => None,
        }
    }
}

struct Copier<'a> {
    store: &'a ObjectStore,
    table: HashMap<Handle, CopyId>,
    nodes: Vec<Object>,
    origins: Vec<Handle>,
}

impl Copier<'_> {
    /// Assign a copy id to every live object owned from `root`, in
    /// depth-first pre-order
    ///
    /// Every node is in the table before any field is copied, so shared
    /// children and cycles resolve to one copy.
    fn discover(&mut self, root: Handle) {
        let store = self.store;
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if self.table.contains_key(&handle) {
                continue;
            }
            let Some(original) = store.get(handle) else {
                continue;
            };
            self.table.insert(handle, CopyId(self.nodes.len()));
            self.nodes.push(Object::new(original.kind()));
            self.origins.push(handle);

            let mut children = Vec::new();
            for (name, value) in original.fields() {
                if store.schema().is_owned(original.kind(), name) {
                    children.extend(value.refs().into_iter().filter_map(|r| r.handle()));
                }
            }
            // reversed so the first field's targets are numbered first
            stack.extend(children.into_iter().rev());
        }
    }

    fn fill(&mut self) {
        let store = self.store;
        let schema = store.schema();
        for index in 0..self.nodes.len() {
            let Some(original) = store.get(self.origins[index]) else {
                continue;
            };
            for (name, value) in original.fields() {
                let owned = schema.is_owned(original.kind(), name);
                let copied = match value {
                    FieldValue::Scalar(v) => FieldValue::Scalar(v.clone()),
                    FieldValue::One(target) if owned => {
                        FieldValue::One(target.and_then(|r| self.copy_ref(r)))
                    }
                    FieldValue::Many(targets) if owned => FieldValue::Many(
                        targets.iter().filter_map(|r| self.copy_ref(*r)).collect(),
                    ),
                    FieldValue::One(_) => FieldValue::One(None),
                    FieldValue::Many(_) => FieldValue::Many(Vec::new()),
                };
                self.nodes[index].set(name, copied);
            }
        }
    }

    /// Copy standing in for `r`; `None` when its target is detached
    fn copy_ref(&self, r: ObjectRef) -> Option<ObjectRef> {
        r.handle()
            .and_then(|h| self.table.get(&h).copied())
            .map(ObjectRef::Standalone)
    }
}

/// Copy `root` and everything it owns out of the store
///
/// Returns `None` only when `root` is detached. Detached owned children are
/// left out (single fields unset, sequence entries skipped). Referenced
/// fields are unset in the copy.
pub fn deep_copy(store: &ObjectStore, root: Handle) -> Option<DetachedGraph> {
    log_op_start!("deep_copy", handle = %root);
    let start = std::time::Instant::now();

    let mut copier = Copier {
        store,
        table: HashMap::new(),
        nodes: Vec::new(),
        origins: Vec::new(),
    };
    copier.discover(root);
    copier.fill();
    let root_copy = copier.table.get(&root).copied();

    log_op_end!(
        "deep_copy",
        duration_ms = start.elapsed().as_millis() as u64,
        copy_len = copier.nodes.len()
    );

    root_copy.map(|root| DetachedGraph {
        nodes: copier.nodes,
        origins: copier.origins,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_owned_cycle_terminates() {
        let schema = Schema::builder().entity("Node").owns_one("next").build();
        let mut store = ObjectStore::new(schema);
        let (a, b) = store
            .perform_write(|s| {
                let a = s.add(Object::new("Node"))?;
                let b = s.add(Object::new("Node").with_one("next", Some(a.into())))?;
                s.set_field(a, "next", FieldValue::One(Some(b.into())))?;
                Ok((a, b))
            })
            .unwrap();

        let graph = deep_copy(&store, a).unwrap();
        assert_eq!(graph.len(), 2);

        let a_copy = graph.root();
        let b_copy = graph.copy_of(b).unwrap();
        let a_obj = graph.get(a_copy).unwrap();
        let b_obj = graph.get(b_copy).unwrap();
        assert_eq!(a_obj.one("next"), Some(ObjectRef::Standalone(b_copy)));
        assert_eq!(b_obj.one("next"), Some(ObjectRef::Standalone(a_copy)));
        assert_eq!(graph.origin(a_copy), Some(a));
    }

    #[test]
    fn test_shared_child_is_copied_once() {
        let schema = Schema::builder()
            .entity("Node")
            .owns_one("left")
            .owns_one("right")
            .build();
        let mut store = ObjectStore::new(schema);
        let (root, shared) = store
            .perform_write(|s| {
                let shared = s.add(Object::new("Node"))?;
                let root = s.add(
                    Object::new("Node")
                        .with_one("left", Some(shared.into()))
                        .with_one("right", Some(shared.into())),
                )?;
                Ok((root, shared))
            })
            .unwrap();

        let graph = deep_copy(&store, root).unwrap();
        assert_eq!(graph.len(), 2);
        let copy = graph.copy_of(shared).unwrap();
        let root_obj = graph.root_object().unwrap();
        assert_eq!(root_obj.one("left"), Some(ObjectRef::Standalone(copy)));
        assert_eq!(root_obj.one("right"), Some(ObjectRef::Standalone(copy)));
    }

    #[test]
    fn test_persisted_refs_do_not_resolve_in_copy() {
        let schema = Schema::builder().entity("Leaf").scalar("v").build();
        let mut store = ObjectStore::new(schema);
        let leaf = store
            .perform_write(|s| s.add(Object::new("Leaf").with_scalar("v", 1i64)))
            .unwrap();

        let graph = deep_copy(&store, leaf).unwrap();
        assert!(graph.resolve(&ObjectRef::Persisted(leaf)).is_none());
        assert!(store.resolve(&ObjectRef::Standalone(graph.root())).is_none());
    }
}
