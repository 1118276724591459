//! Catalog read accessors

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::model::{load_dish, Dish};
use super::schema::{CATALOG_STATE, CHEESE_BORDER, DISH, DISH_VARIANT};
use crate::errors::Result;
use crate::graph::deep_copy;
use crate::identity::{Handle, ObjectRef};
use crate::object::ScalarValue;
use crate::store::ObjectStore;

/// Bookkeeping of the last successful refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    pub last_update: Option<DateTime<Utc>>,
    pub content_hash: Option<String>,
}

/// Handle of the `CatalogState` singleton, if one was ever written
pub fn catalog_state_handle(store: &ObjectStore) -> Option<Handle> {
    store
        .objects_of_kind(CATALOG_STATE)
        .first()
        .map(|(handle, _)| *handle)
}

pub fn catalog_state(store: &ObjectStore) -> CatalogState {
    let Some(object) = catalog_state_handle(store).and_then(|h| store.get(h)) else {
        return CatalogState::default();
    };
    CatalogState {
        last_update: object
            .scalar("last_update")
            .and_then(ScalarValue::as_timestamp),
        content_hash: object.text("content_hash").map(str::to_string),
    }
}

pub fn dish_handles(store: &ObjectStore) -> Vec<Handle> {
    store
        .objects_of_kind(DISH)
        .into_iter()
        .map(|(handle, _)| handle)
        .collect()
}

pub fn cheese_border_handles(store: &ObjectStore) -> Vec<Handle> {
    store
        .objects_of_kind(CHEESE_BORDER)
        .into_iter()
        .map(|(handle, _)| handle)
        .collect()
}

/// Distinct dish categories, sorted
pub fn categories(store: &ObjectStore) -> Vec<String> {
    store
        .objects_of_kind(DISH)
        .into_iter()
        .filter_map(|(_, dish)| dish.text("category").map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Dishes of one category ordered by `sort_order`, then name
///
/// # Errors
///
/// Returns `MissingField` if a stored dish lacks its id or name.
pub fn dishes_in_category(store: &ObjectStore, category: &str) -> Result<Vec<(Handle, Dish)>> {
    let mut dishes = Vec::new();
    for (handle, object) in store.objects_of_kind(DISH) {
        if object.text("category") == Some(category) {
            dishes.push((handle, load_dish(store, handle.into())?));
        }
    }
    dishes.sort_by(|(_, a), (_, b)| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(dishes)
}

/// Dish with the given external id
pub fn find_dish(store: &ObjectStore, external_id: &str) -> Option<Handle> {
    store
        .objects_of_kind(DISH)
        .into_iter()
        .find(|(_, dish)| dish.text("external_id") == Some(external_id))
        .map(|(handle, _)| handle)
}

/// Dish owning `variant`, read from the reverse index
pub fn owning_dish(store: &ObjectStore, variant: Handle) -> Option<Handle> {
    if store.get(variant).map(|v| v.kind()) != Some(DISH_VARIANT) {
        return None;
    }
    store
        .back_references(variant)
        .into_iter()
        .find(|(source, field)| {
            *field == "variants" && store.get(*source).map(|o| o.kind()) == Some(DISH)
        })
        .map(|(source, _)| source)
}

/// Typed deep copy of a dish, independent of later catalog changes
///
/// Referenced cheese borders are cut by the copy, so every variant's
/// `cheese_border_id` is `None`. Returns `Ok(None)` for a detached dish.
///
/// # Errors
///
/// `KindMismatch` if `dish` is not a dish, `MissingField` for incomplete data.
pub fn snapshot_dish(store: &ObjectStore, dish: Handle) -> Result<Option<Dish>> {
    let Some(graph) = deep_copy(store, dish) else {
        return Ok(None);
    };
    load_dish(&graph, ObjectRef::Standalone(graph.root())).map(Some)
}
