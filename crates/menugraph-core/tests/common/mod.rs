//! Shared fixtures for menugraph-core integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use menugraph_core::catalog::{
    catalog_schema, install_cheese_border, install_dish, CatalogPayload, CatalogSource,
    CheeseBorder, Dish, DishVariant, DoughOption, Money, RefreshError, Topping,
};
use menugraph_core::errors::{GraphError, Result};
use menugraph_core::{ChangeSet, CommitBackend, Handle, Object, ObjectStore, Schema};

// ===== Backends =====

#[derive(Debug, Default)]
pub struct BackendLog {
    pub begins: usize,
    pub commits: Vec<ChangeSet>,
    pub rollbacks: usize,
}

/// Backend that records every call and can be told to fail
#[derive(Clone, Default)]
pub struct RecordingBackend {
    pub log: Arc<Mutex<BackendLog>>,
    pub fail_begin: Arc<Mutex<bool>>,
    pub fail_commit: Arc<Mutex<bool>>,
}

impl RecordingBackend {
    pub fn begins(&self) -> usize {
        self.log.lock().unwrap().begins
    }

    pub fn commits(&self) -> Vec<ChangeSet> {
        self.log.lock().unwrap().commits.clone()
    }

    pub fn rollbacks(&self) -> usize {
        self.log.lock().unwrap().rollbacks
    }

    pub fn set_fail_commit(&self, fail: bool) {
        *self.fail_commit.lock().unwrap() = fail;
    }

    pub fn set_fail_begin(&self, fail: bool) {
        *self.fail_begin.lock().unwrap() = fail;
    }
}

impl CommitBackend for RecordingBackend {
    fn begin(&mut self) -> Result<()> {
        if *self.fail_begin.lock().unwrap() {
            return Err(GraphError::transaction("begin", "backend unavailable"));
        }
        self.log.lock().unwrap().begins += 1;
        Ok(())
    }

    fn commit(&mut self, changes: &ChangeSet) -> Result<()> {
        if *self.fail_commit.lock().unwrap() {
            return Err(GraphError::transaction("commit", "disk full"));
        }
        self.log.lock().unwrap().commits.push(changes.clone());
        Ok(())
    }

    fn rollback(&mut self) {
        self.log.lock().unwrap().rollbacks += 1;
    }
}

// ===== Sources =====

/// Source returning a fixed payload and counting fetches
pub struct StaticSource {
    pub payload: CatalogPayload,
    pub calls: usize,
}

impl StaticSource {
    pub fn new(payload: CatalogPayload) -> Self {
        Self { payload, calls: 0 }
    }
}

impl CatalogSource for StaticSource {
    fn fetch(&mut self) -> std::result::Result<CatalogPayload, RefreshError> {
        self.calls += 1;
        Ok(self.payload.clone())
    }
}

/// Source that always fails like a dropped connection
pub struct FailingSource;

impl CatalogSource for FailingSource {
    fn fetch(&mut self) -> std::result::Result<CatalogPayload, RefreshError> {
        Err(RefreshError::unavailable("connection reset by peer"))
    }
}

// ===== Stores =====

pub fn catalog_store() -> ObjectStore {
    ObjectStore::new(catalog_schema())
}

pub fn recorded_catalog_store() -> (ObjectStore, RecordingBackend) {
    let backend = RecordingBackend::default();
    (
        ObjectStore::with_backend(catalog_schema(), backend.clone()),
        backend,
    )
}

/// `Node` owns `children` (sequence) and `child` (single), refers to `link`
pub fn node_schema() -> Schema {
    Schema::builder()
        .entity("Node")
        .scalar("label")
        .owns_many("children")
        .owns_one("child")
        .refers_one("link")
        .build()
}

/// Diamond: root owns a and b, both own `shared`
pub struct Diamond {
    pub root: Handle,
    pub a: Handle,
    pub b: Handle,
    pub shared: Handle,
}

pub fn build_diamond(store: &mut ObjectStore) -> Diamond {
    store
        .perform_write(|s| {
            let shared = s.add(Object::new("Node").with_scalar("label", "shared"))?;
            let a = s.add(
                Object::new("Node")
                    .with_scalar("label", "a")
                    .with_one("child", Some(shared.into())),
            )?;
            let b = s.add(
                Object::new("Node")
                    .with_scalar("label", "b")
                    .with_one("child", Some(shared.into())),
            )?;
            let root = s.add(
                Object::new("Node")
                    .with_scalar("label", "root")
                    .with_many("children", vec![a.into(), b.into()]),
            )?;
            Ok(Diamond { root, a, b, shared })
        })
        .unwrap()
}

/// Linear chain of `len` nodes, each owning the next through `child`
///
/// Returns the handles head first.
pub fn build_chain(store: &mut ObjectStore, len: usize) -> Vec<Handle> {
    store
        .perform_write(|s| {
            let mut handles = Vec::with_capacity(len);
            let mut next = None;
            for _ in 0..len {
                let handle = s.add(Object::new("Node").with_one("child", next))?;
                handles.push(handle);
                next = Some(handle.into());
            }
            handles.reverse();
            Ok(handles)
        })
        .unwrap()
}

// ===== Catalog payloads =====

pub fn money(amount: &str) -> Option<Money> {
    Some(Money::new(amount.parse().unwrap()))
}

fn dough(id: &str, name: &str) -> DoughOption {
    DoughOption {
        external_id: id.to_string(),
        name: name.to_string(),
    }
}

fn variant(id: &str, name: &str, price: &str, doughs: Vec<DoughOption>) -> DishVariant {
    DishVariant {
        external_id: id.to_string(),
        name: name.to_string(),
        weight: None,
        price: money(price),
        doughs,
        cheese_border_id: Some("cb-classic".to_string()),
    }
}

pub fn margherita() -> Dish {
    Dish {
        external_id: "d-margherita".to_string(),
        name: "Margherita".to_string(),
        description: "Tomato sauce, mozzarella, basil".to_string(),
        category: "pizza".to_string(),
        sort_order: 2,
        price: money("450"),
        old_price: money("500"),
        variants: vec![
            variant(
                "v-m-30",
                "30 cm",
                "450",
                vec![dough("thin", "Thin"), dough("classic", "Classic")],
            ),
            variant("v-m-35", "35 cm", "590", vec![dough("thin", "Thin")]),
        ],
        toppings: vec![Topping {
            external_id: "t-basil".to_string(),
            name: "Basil".to_string(),
            price: money("40"),
        }],
    }
}

pub fn sample_payload() -> CatalogPayload {
    CatalogPayload {
        dishes: vec![
            margherita(),
            Dish {
                external_id: "d-pepperoni".to_string(),
                name: "Pepperoni".to_string(),
                description: String::new(),
                category: "pizza".to_string(),
                sort_order: 1,
                price: money("520"),
                old_price: None,
                variants: vec![variant("v-p-30", "30 cm", "520", vec![])],
                toppings: vec![],
            },
            Dish {
                external_id: "d-cola".to_string(),
                name: "Cola".to_string(),
                description: String::new(),
                category: "drinks".to_string(),
                sort_order: 1,
                price: money("120"),
                old_price: None,
                variants: vec![],
                toppings: vec![],
            },
        ],
        cheese_borders: vec![CheeseBorder {
            external_id: "cb-classic".to_string(),
            name: "Cheese border".to_string(),
            price: money("90"),
        }],
    }
}

/// Install `payload` directly, returning dish handles by external id
pub fn install_payload(store: &mut ObjectStore, payload: &CatalogPayload) -> HashMap<String, Handle> {
    store
        .perform_write(|s| {
            let mut borders = HashMap::new();
            for border in &payload.cheese_borders {
                borders.insert(border.external_id.clone(), install_cheese_border(s, border)?);
            }
            let mut dishes = HashMap::new();
            for dish in &payload.dishes {
                dishes.insert(dish.external_id.clone(), install_dish(s, dish, &borders)?);
            }
            Ok(dishes)
        })
        .unwrap()
}

pub fn count_kind(store: &ObjectStore, kind: &str) -> usize {
    store.objects_of_kind(kind).len()
}
