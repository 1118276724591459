//! Type-erased objects and field values
//!
//! Engines see every entity as an [`Object`]: an entity kind plus a map of
//! named [`FieldValue`]s. Typed catalog views are built on top in
//! [`crate::catalog`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Decimal;
use crate::identity::ObjectRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
    Null,
}

impl ScalarValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ScalarValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ScalarValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(d: Decimal) -> Self {
        ScalarValue::Decimal(d)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ScalarValue::Null, Into::into)
    }
}

/// Value of one field: a scalar, a single reference or an ordered sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Scalar(ScalarValue),
    One(Option<ObjectRef>),
    Many(Vec<ObjectRef>),
}

impl FieldValue {
    pub fn shape_name(&self) -> &'static str {
        match self {
            FieldValue::Scalar(_) => "scalar",
            FieldValue::One(_) => "single reference",
            FieldValue::Many(_) => "reference sequence",
        }
    }

    /// References held by this value, in order
    pub fn refs(&self) -> Vec<ObjectRef> {
        match self {
            FieldValue::Scalar(_) | FieldValue::One(None) => Vec::new(),
            FieldValue::One(Some(r)) => vec![*r],
            FieldValue::Many(rs) => rs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    kind: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Object {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_scalar(self, name: &str, value: impl Into<ScalarValue>) -> Self {
        self.with_field(name, FieldValue::Scalar(value.into()))
    }

    pub fn with_one(self, name: &str, target: Option<ObjectRef>) -> Self {
        self.with_field(name, FieldValue::One(target))
    }

    pub fn with_many(self, name: &str, targets: Vec<ObjectRef>) -> Self {
        self.with_field(name, FieldValue::Many(targets))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn set(&mut self, name: &str, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.to_string(), value)
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarValue> {
        match self.fields.get(name) {
            Some(FieldValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.scalar(name).and_then(ScalarValue::as_text)
    }

    /// Single reference held by `name`; `None` when unset or not a `One`
    pub fn one(&self, name: &str) -> Option<ObjectRef> {
        match self.fields.get(name) {
            Some(FieldValue::One(r)) => *r,
            _ => None,
        }
    }

    /// Reference sequence held by `name`; empty when unset or not a `Many`
    pub fn many(&self, name: &str) -> &[ObjectRef] {
        match self.fields.get(name) {
            Some(FieldValue::Many(rs)) => rs,
            _ => &[],
        }
    }

    /// Every outgoing reference as `(field, target)`
    pub fn references(&self) -> Vec<(&str, ObjectRef)> {
        self.fields
            .iter()
            .flat_map(|(name, value)| value.refs().into_iter().map(move |r| (name.as_str(), r)))
            .collect()
    }
}

/// Read access to objects by reference
///
/// Implemented by the persistent store and by detached copy graphs. A
/// reference that cannot be resolved (deleted, or belonging to the other
/// world) yields `None`.
pub trait GraphView {
    fn resolve(&self, r: &ObjectRef) -> Option<&Object>;

    fn resolve_one(&self, object: &Object, field: &str) -> Option<&Object> {
        object.one(field).and_then(|r| self.resolve(&r))
    }

    /// Live targets of a sequence field, dangling entries skipped
    fn resolve_many<'a>(&'a self, object: &'a Object, field: &str) -> Vec<(ObjectRef, &'a Object)> {
        object
            .many(field)
            .iter()
            .filter_map(|r| self.resolve(r).map(|o| (*r, o)))
            .collect()
    }
}
