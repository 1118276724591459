//! Typed catalog entities
//!
//! The same structs describe the payload delivered by a catalog source and
//! the typed view read back out of a [`GraphView`]. Writing goes through
//! `install_*` (inside a write transaction), reading through `load_*`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::schema::{CHEESE_BORDER, DISH, DISH_VARIANT, DOUGH_OPTION, MONEY, TOPPING};
use crate::decimal::Decimal;
use crate::errors::{GraphError, Result};
use crate::identity::{Handle, ObjectRef};
use crate::object::{GraphView, Object, ScalarValue};
use crate::store::ObjectStore;

/// Money amount
///
/// Serialized as the canonical decimal string. Deserialization accepts a
/// string or a JSON number and is lenient: a malformed amount becomes zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Money {
    pub amount: Decimal,
}

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(i64),
            Float(f64),
            Text(String),
        }

        let amount = match Wire::deserialize(deserializer)? {
            Wire::Int(i) => Decimal::from_int(i),
            Wire::Float(f) => Decimal::from_f64(f),
            Wire::Text(s) => Decimal::parse(&s),
        };
        Ok(Money { amount })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoughOption {
    pub external_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheeseBorder {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishVariant {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub doughs: Vec<DoughOption>,
    /// External id of a shared cheese border
    #[serde(default)]
    pub cheese_border_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub external_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub old_price: Option<Money>,
    #[serde(default)]
    pub variants: Vec<DishVariant>,
    #[serde(default)]
    pub toppings: Vec<Topping>,
}

/// Full catalog as delivered by a [`CatalogSource`](super::CatalogSource)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub dishes: Vec<Dish>,
    #[serde(default)]
    pub cheese_borders: Vec<CheeseBorder>,
}

// ===== Install =====

fn install_money(store: &mut ObjectStore, money: Option<&Money>) -> Result<Option<ObjectRef>> {
    let Some(money) = money else {
        return Ok(None);
    };
    let handle = store.add(Object::new(MONEY).with_scalar("amount", money.amount))?;
    Ok(Some(handle.into()))
}

/// # Errors
///
/// Fails outside a write transaction.
pub fn install_cheese_border(store: &mut ObjectStore, border: &CheeseBorder) -> Result<Handle> {
    let price = install_money(store, border.price.as_ref())?;
    store.add(
        Object::new(CHEESE_BORDER)
            .with_scalar("external_id", border.external_id.as_str())
            .with_scalar("name", border.name.as_str())
            .with_one("price", price),
    )
}

fn install_variant(
    store: &mut ObjectStore,
    variant: &DishVariant,
    borders: &HashMap<String, Handle>,
) -> Result<Handle> {
    let mut doughs = Vec::with_capacity(variant.doughs.len());
    for dough in &variant.doughs {
        let handle = store.add(
            Object::new(DOUGH_OPTION)
                .with_scalar("external_id", dough.external_id.as_str())
                .with_scalar("name", dough.name.as_str()),
        )?;
        doughs.push(handle.into());
    }
    let price = install_money(store, variant.price.as_ref())?;

    let cheese_border = match &variant.cheese_border_id {
        Some(id) => {
            let found = borders.get(id).map(|h| ObjectRef::from(*h));
            if found.is_none() {
                tracing::warn!(
                    variant = %variant.external_id,
                    cheese_border = %id,
                    "unknown cheese border, leaving unset"
                );
            }
            found
        }
        None => None,
    };

    store.add(
        Object::new(DISH_VARIANT)
            .with_scalar("external_id", variant.external_id.as_str())
            .with_scalar("name", variant.name.as_str())
            .with_scalar("weight", variant.weight.clone())
            .with_many("doughs", doughs)
            .with_one("price", price)
            .with_one("cheese_border", cheese_border),
    )
}

/// Persist a dish with its whole owned subgraph
///
/// `borders` maps cheese border external ids to their handles.
///
/// # Errors
///
/// Fails outside a write transaction.
pub fn install_dish(
    store: &mut ObjectStore,
    dish: &Dish,
    borders: &HashMap<String, Handle>,
) -> Result<Handle> {
    let mut variants = Vec::with_capacity(dish.variants.len());
    for variant in &dish.variants {
        variants.push(install_variant(store, variant, borders)?.into());
    }
    let mut toppings = Vec::with_capacity(dish.toppings.len());
    for topping in &dish.toppings {
        let price = install_money(store, topping.price.as_ref())?;
        let handle = store.add(
            Object::new(TOPPING)
                .with_scalar("external_id", topping.external_id.as_str())
                .with_scalar("name", topping.name.as_str())
                .with_one("price", price),
        )?;
        toppings.push(handle.into());
    }
    let price = install_money(store, dish.price.as_ref())?;
    let old_price = install_money(store, dish.old_price.as_ref())?;

    store.add(
        Object::new(DISH)
            .with_scalar("external_id", dish.external_id.as_str())
            .with_scalar("name", dish.name.as_str())
            .with_scalar("description", dish.description.as_str())
            .with_scalar("category", dish.category.as_str())
            .with_scalar("sort_order", dish.sort_order)
            .with_many("variants", variants)
            .with_one("price", price)
            .with_one("old_price", old_price)
            .with_many("toppings", toppings),
    )
}

// ===== Load =====

fn unresolved(r: ObjectRef) -> GraphError {
    match r {
        ObjectRef::Persisted(handle) => GraphError::NotFound { handle },
        ObjectRef::Standalone(id) => GraphError::Internal {
            message: format!("{} is not part of this graph", id),
        },
    }
}

fn resolve_kind<'v, V>(view: &'v V, r: ObjectRef, kind: &str) -> Result<&'v Object>
where
    V: GraphView + ?Sized,
{
    let object = view.resolve(&r).ok_or_else(|| unresolved(r))?;
    if object.kind() != kind {
        return Err(GraphError::KindMismatch {
            object: r.to_string(),
            expected: kind.to_string(),
            found: object.kind().to_string(),
        });
    }
    Ok(object)
}

fn required_text(object: &Object, r: ObjectRef, field: &str) -> Result<String> {
    object
        .text(field)
        .map(str::to_string)
        .ok_or_else(|| GraphError::MissingField {
            kind: object.kind().to_string(),
            handle: r.to_string(),
            field: field.to_string(),
        })
}

fn load_money<V: GraphView + ?Sized>(view: &V, owner: &Object, field: &str) -> Option<Money> {
    view.resolve_one(owner, field).map(|m| {
        Money::new(
            m.scalar("amount")
                .and_then(ScalarValue::as_decimal)
                .unwrap_or(Decimal::ZERO),
        )
    })
}

/// # Errors
///
/// `NotFound`/`KindMismatch` if `r` is not a live cheese border,
/// `MissingField` if a required text field is absent.
pub fn load_cheese_border<V: GraphView + ?Sized>(view: &V, r: ObjectRef) -> Result<CheeseBorder> {
    let object = resolve_kind(view, r, CHEESE_BORDER)?;
    Ok(CheeseBorder {
        external_id: required_text(object, r, "external_id")?,
        name: required_text(object, r, "name")?,
        price: load_money(view, object, "price"),
    })
}

/// # Errors
///
/// As for [`load_cheese_border`].
pub fn load_variant<V: GraphView + ?Sized>(view: &V, r: ObjectRef) -> Result<DishVariant> {
    let object = resolve_kind(view, r, DISH_VARIANT)?;

    let mut doughs = Vec::new();
    for (dough_ref, dough) in view.resolve_many(object, "doughs") {
        doughs.push(DoughOption {
            external_id: required_text(dough, dough_ref, "external_id")?,
            name: required_text(dough, dough_ref, "name")?,
        });
    }

    Ok(DishVariant {
        external_id: required_text(object, r, "external_id")?,
        name: required_text(object, r, "name")?,
        weight: object.text("weight").map(str::to_string),
        price: load_money(view, object, "price"),
        doughs,
        cheese_border_id: view
            .resolve_one(object, "cheese_border")
            .and_then(|b| b.text("external_id"))
            .map(str::to_string),
    })
}

/// Read a dish and its owned subgraph back as a typed value
///
/// Owned children that no longer resolve are left out.
///
/// # Errors
///
/// As for [`load_cheese_border`].
pub fn load_dish<V: GraphView + ?Sized>(view: &V, r: ObjectRef) -> Result<Dish> {
    let object = resolve_kind(view, r, DISH)?;

    let mut variants = Vec::new();
    for variant_ref in object.many("variants") {
        if view.resolve(variant_ref).is_some() {
            variants.push(load_variant(view, *variant_ref)?);
        }
    }

    let mut toppings = Vec::new();
    for (topping_ref, topping) in view.resolve_many(object, "toppings") {
        toppings.push(Topping {
            external_id: required_text(topping, topping_ref, "external_id")?,
            name: required_text(topping, topping_ref, "name")?,
            price: load_money(view, topping, "price"),
        });
    }

    Ok(Dish {
        external_id: required_text(object, r, "external_id")?,
        name: required_text(object, r, "name")?,
        description: object.text("description").unwrap_or_default().to_string(),
        category: object.text("category").unwrap_or_default().to_string(),
        sort_order: object
            .scalar("sort_order")
            .and_then(ScalarValue::as_int)
            .unwrap_or_default(),
        price: load_money(view, object, "price"),
        old_price: load_money(view, object, "old_price"),
        variants,
        toppings,
    })
}
