//! Identity and reference layer
//!
//! Every persisted object is addressed by a [`Handle`] that stays valid for
//! comparison after the object has been deleted. Objects living outside the
//! store (deep copies) are addressed by a [`CopyId`] inside their
//! [`DetachedGraph`](crate::graph::DetachedGraph). [`ObjectRef`] covers both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::GraphError;

/// Stable identity token of a persisted object
///
/// Backed by a UUIDv7, so handle order roughly follows allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(Uuid);

impl Handle {
    /// Allocate a fresh handle
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID (used when hydrating from durable storage)
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Handle {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| GraphError::MalformedValue {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Position of a standalone object inside a detached graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CopyId(pub(crate) usize);

impl CopyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CopyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "copy#{}", self.0)
    }
}

/// Reference to either a persisted object or a standalone copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ref", content = "id", rename_all = "snake_case")]
pub enum ObjectRef {
    Persisted(Handle),
    Standalone(CopyId),
}

impl ObjectRef {
    /// The handle, if this reference points into the store
    pub fn handle(&self) -> Option<Handle> {
        match self {
            ObjectRef::Persisted(h) => Some(*h),
            ObjectRef::Standalone(_) => None,
        }
    }

    /// The copy id, if this reference points into a detached graph
    pub fn copy_id(&self) -> Option<CopyId> {
        match self {
            ObjectRef::Persisted(_) => None,
            ObjectRef::Standalone(id) => Some(*id),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, ObjectRef::Persisted(_))
    }
}

impl From<Handle> for ObjectRef {
    fn from(handle: Handle) -> Self {
        ObjectRef::Persisted(handle)
    }
}

impl From<CopyId> for ObjectRef {
    fn from(id: CopyId) -> Self {
        ObjectRef::Standalone(id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectRef::Persisted(h) => write!(f, "{}", h),
            ObjectRef::Standalone(id) => write!(f, "{}", id),
        }
    }
}
