//! Graph schema descriptor
//!
//! Declares, per entity kind, which fields exist and which relationship
//! fields are *owned*. Owned edges are followed by cascade delete and deep
//! copy; every other relationship is a plain reference.

use std::collections::HashMap;

use crate::errors::{GraphError, Result};
use crate::object::{FieldValue, Object};

/// Closed set of field shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    One { owned: bool },
    Many { owned: bool },
}

impl FieldShape {
    pub fn is_owned(&self) -> bool {
        matches!(
            self,
            FieldShape::One { owned: true } | FieldShape::Many { owned: true }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldShape::Scalar => "scalar",
            FieldShape::One { .. } => "single reference",
            FieldShape::Many { .. } => "reference sequence",
        }
    }

    fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldShape::Scalar, FieldValue::Scalar(_))
                | (FieldShape::One { .. }, FieldValue::One(_))
                | (FieldShape::Many { .. }, FieldValue::Many(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub shape: FieldShape,
}

/// Ordered field declarations of one entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySchema {
    fields: Vec<FieldDecl>,
}

impl EntitySchema {
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn declare(&mut self, name: &str, shape: FieldShape) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.shape = shape,
            None => self.fields.push(FieldDecl {
                name: name.to_string(),
                shape,
            }),
        }
    }
}

/// Schema table keyed by entity kind
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: HashMap<String, EntitySchema>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn entity(&self, kind: &str) -> Option<&EntitySchema> {
        self.entities.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Owned relationship fields of `kind` in declaration order
    ///
    /// Unknown kinds own nothing.
    pub fn owned_fields(&self, kind: &str) -> Vec<&str> {
        self.entities
            .get(kind)
            .map(|e| {
                e.fields
                    .iter()
                    .filter(|f| f.shape.is_owned())
                    .map(|f| f.name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_owned(&self, kind: &str, field: &str) -> bool {
        self.entities
            .get(kind)
            .and_then(|e| e.field(field))
            .is_some_and(|f| f.shape.is_owned())
    }

    /// Check every declared field of `object` holds a value of its shape
    ///
    /// Undeclared fields and unknown kinds pass.
    pub fn validate_object(&self, object: &Object) -> Result<()> {
        let Some(entity) = self.entities.get(object.kind()) else {
            return Ok(());
        };
        for (name, value) in object.fields() {
            if let Some(decl) = entity.field(name) {
                if !decl.shape.accepts(value) {
                    return Err(GraphError::FieldShapeMismatch {
                        kind: object.kind().to_string(),
                        field: name.clone(),
                        expected: decl.shape.name().to_string(),
                        found: value.shape_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Fluent schema declaration
///
/// ```
/// use menugraph_core::schema::Schema;
///
/// let schema = Schema::builder()
///     .entity("Dish")
///     .scalar("name")
///     .owns_many("variants")
///     .entity("DishVariant")
///     .refers_one("cheese_border")
///     .build();
/// assert_eq!(schema.owned_fields("Dish"), vec!["variants"]);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: HashMap<String, EntitySchema>,
    current: Option<String>,
}

impl SchemaBuilder {
    /// Start (or resume) declaring `kind`
    pub fn entity(mut self, kind: &str) -> Self {
        self.entities.entry(kind.to_string()).or_default();
        self.current = Some(kind.to_string());
        self
    }

    pub fn scalar(self, name: &str) -> Self {
        self.field(name, FieldShape::Scalar)
    }

    pub fn owns_one(self, name: &str) -> Self {
        self.field(name, FieldShape::One { owned: true })
    }

    pub fn owns_many(self, name: &str) -> Self {
        self.field(name, FieldShape::Many { owned: true })
    }

    pub fn refers_one(self, name: &str) -> Self {
        self.field(name, FieldShape::One { owned: false })
    }

    pub fn refers_many(self, name: &str) -> Self {
        self.field(name, FieldShape::Many { owned: false })
    }

    /// Fields declared before any `entity` call are dropped.
    pub fn field(mut self, name: &str, shape: FieldShape) -> Self {
        if let Some(entity) = self
            .current
            .as_ref()
            .and_then(|kind| self.entities.get_mut(kind))
        {
            entity.declare(name, shape);
        }
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            entities: self.entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;
    use crate::object::ScalarValue;

    fn sample() -> Schema {
        Schema::builder()
            .entity("Dish")
            .scalar("name")
            .owns_many("variants")
            .owns_one("price")
            .owns_one("old_price")
            .entity("DishVariant")
            .owns_one("price")
            .refers_one("cheese_border")
            .entity("Money")
            .scalar("amount")
            .build()
    }

    #[test]
    fn test_owned_fields_in_declaration_order() {
        let schema = sample();
        assert_eq!(
            schema.owned_fields("Dish"),
            vec!["variants", "price", "old_price"]
        );
        assert_eq!(schema.owned_fields("DishVariant"), vec!["price"]);
    }

    #[test]
    fn test_unknown_kind_owns_nothing() {
        let schema = sample();
        assert!(schema.owned_fields("Nope").is_empty());
        assert!(!schema.is_owned("Nope", "price"));
    }

    #[test]
    fn test_referenced_field_is_not_owned() {
        let schema = sample();
        assert!(!schema.is_owned("DishVariant", "cheese_border"));
        assert!(schema.is_owned("DishVariant", "price"));
    }

    #[test]
    fn test_redeclaring_field_replaces_shape() {
        let schema = Schema::builder()
            .entity("A")
            .refers_one("x")
            .owns_one("x")
            .build();
        assert_eq!(schema.owned_fields("A"), vec!["x"]);
        assert_eq!(schema.entity("A").map(|e| e.fields().len()), Some(1));
    }

    #[test]
    fn test_validate_object_rejects_shape_mismatch() {
        let schema = sample();
        let money = Object::new("Money").with_scalar("amount", ScalarValue::Decimal(Decimal::ZERO));
        assert!(schema.validate_object(&money).is_ok());

        let bad = Object::new("Money").with_field("amount", FieldValue::Many(vec![]));
        let err = schema.validate_object(&bad).unwrap_err();
        assert!(matches!(err, GraphError::FieldShapeMismatch { ref field, .. } if field == "amount"));
    }

    #[test]
    fn test_validate_object_allows_undeclared_fields() {
        let schema = sample();
        let obj = Object::new("Money").with_scalar("currency", ScalarValue::Text("RUB".into()));
        assert!(schema.validate_object(&obj).is_ok());
    }
}
