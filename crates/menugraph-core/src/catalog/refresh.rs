//! Catalog refresh
//!
//! A refresh fetches a full [`CatalogPayload`] from a [`CatalogSource`] and
//! swaps it in as one write transaction: old dishes and cheese borders are
//! cascade-deleted, the new ones installed and the bookkeeping updated
//! together. A failing source leaves the cached catalog untouched.
//!
//! The stored content hash always describes the installed catalog: a dish
//! removed outside a refresh clears it, so the next fetch reinstalls.

use chrono::{DateTime, Utc};
use menugraph_core_types::RequestId;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::model::{install_cheese_border, install_dish, CatalogPayload};
use super::queries::{
    catalog_state, catalog_state_handle, cheese_border_handles, dish_handles,
};
use super::schema::CATALOG_STATE;
use super::staleness::StalenessPolicy;
use crate::errors::{ExError, GraphError};
use crate::graph::{cascade_delete, CascadeReport};
use crate::identity::Handle;
use crate::object::{FieldValue, Object, ScalarValue};
use crate::store::ObjectStore;
use crate::{log_op_end, log_op_error, log_op_start};

/// Result of a refresh that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Catalog still fresh, source not contacted
    Skipped,
    /// Payload identical to the cached one; only the timestamp moved.
    /// Never reported for a forced refresh.
    Unchanged,
    /// New catalog installed
    Refreshed { dishes: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefreshError {
    /// The source could not deliver a payload
    #[error("{message}")]
    Source { message: String },

    /// The store rejected the new catalog
    #[error(transparent)]
    Store(#[from] GraphError),
}

impl RefreshError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        RefreshError::Source {
            message: message.into(),
        }
    }

    /// Human-readable description for the failure callback
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<RefreshError> for GraphError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::Source { message } => GraphError::RefreshFailure { message },
            RefreshError::Store(inner) => inner,
        }
    }
}

impl From<RefreshError> for ExError {
    fn from(err: RefreshError) -> Self {
        GraphError::from(err).into()
    }
}

/// Supplier of complete catalog payloads
pub trait CatalogSource {
    /// # Errors
    ///
    /// Returns `RefreshError::Source` describing why no payload is available.
    fn fetch(&mut self) -> Result<CatalogPayload, RefreshError>;
}

/// Reads a JSON payload file on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileSource {
    fn fetch(&mut self) -> Result<CatalogPayload, RefreshError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            RefreshError::unavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            RefreshError::unavailable(format!("invalid payload in {}: {}", self.path.display(), e))
        })
    }
}

/// SHA-256 (hex) of the canonical JSON encoding of `payload`
///
/// # Errors
///
/// Returns `Serialization` if the payload cannot be encoded.
pub fn content_hash(payload: &CatalogPayload) -> crate::errors::Result<String> {
    let canonical = serde_json::to_string(payload)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

fn write_state(
    store: &mut ObjectStore,
    now: DateTime<Utc>,
    hash: Option<&str>,
) -> crate::errors::Result<()> {
    let hash_value = FieldValue::Scalar(hash.map(str::to_string).into());
    match catalog_state_handle(store) {
        Some(handle) => {
            store.set_field(handle, "last_update", FieldValue::Scalar(ScalarValue::Timestamp(now)))?;
            if hash.is_some() {
                store.set_field(handle, "content_hash", hash_value)?;
            }
        }
        None => {
            store.add(
                Object::new(CATALOG_STATE)
                    .with_field("last_update", FieldValue::Scalar(ScalarValue::Timestamp(now)))
                    .with_field("content_hash", hash_value),
            )?;
        }
    }
    Ok(())
}

/// Cascade-delete one dish and invalidate the cached content hash
///
/// Both happen in one write transaction. Deleting a detached handle is a
/// no-op and keeps the hash.
///
/// # Errors
///
/// Returns `TransactionFailure` if the backend cannot commit; the dish and
/// the hash are then both kept.
pub fn delete_dish(
    store: &mut ObjectStore,
    dish: Handle,
) -> crate::errors::Result<CascadeReport> {
    store.perform_write(|s| {
        let report = cascade_delete(s, &[dish])?;
        if !report.is_empty() {
            if let Some(state) = catalog_state_handle(s) {
                s.set_field(state, "content_hash", FieldValue::Scalar(ScalarValue::Null))?;
            }
        }
        Ok(report)
    })
}

/// Refresh the catalog if the policy says so (or `force` is set)
///
/// # Errors
///
/// `RefreshError::Source` when the source fails, `RefreshError::Store` when
/// the swap transaction fails. In both cases the cached catalog, its hash
/// and its timestamp are unchanged.
pub fn refresh(
    store: &mut ObjectStore,
    source: &mut dyn CatalogSource,
    policy: &StalenessPolicy,
    force: bool,
) -> Result<RefreshOutcome, RefreshError> {
    refresh_at(store, source, policy, force, Utc::now())
}

/// [`refresh`] with an explicit clock
///
/// # Errors
///
/// Same as [`refresh`].
pub fn refresh_at(
    store: &mut ObjectStore,
    source: &mut dyn CatalogSource,
    policy: &StalenessPolicy,
    force: bool,
    now: DateTime<Utc>,
) -> Result<RefreshOutcome, RefreshError> {
    let request_id = RequestId::new();
    log_op_start!("catalog_refresh", request_id = %request_id, force = force);
    let start = std::time::Instant::now();

    let result = refresh_impl(store, source, policy, force, now).map_err(|e| {
        log_op_error!(
            "catalog_refresh",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %request_id
        );
        e
    })?;

    log_op_end!(
        "catalog_refresh",
        duration_ms = start.elapsed().as_millis() as u64,
        request_id = %request_id,
        outcome = ?result
    );

    Ok(result)
}

fn refresh_impl(
    store: &mut ObjectStore,
    source: &mut dyn CatalogSource,
    policy: &StalenessPolicy,
    force: bool,
    now: DateTime<Utc>,
) -> Result<RefreshOutcome, RefreshError> {
    let state = catalog_state(store);
    if !force && !policy.needs_refresh_at(&state, now) {
        return Ok(RefreshOutcome::Skipped);
    }

    let payload = source.fetch()?;
    let hash = content_hash(&payload)?;

    if !force && state.content_hash.as_deref() == Some(hash.as_str()) {
        store.perform_write(|s| write_state(s, now, None))?;
        return Ok(RefreshOutcome::Unchanged);
    }

    let dishes = payload.dishes.len();
    store.perform_write(|s| {
        let mut stale = dish_handles(s);
        stale.extend(cheese_border_handles(s));
        cascade_delete(s, &stale)?;

        let mut borders = HashMap::new();
        for border in &payload.cheese_borders {
            let handle = install_cheese_border(s, border)?;
            borders.insert(border.external_id.clone(), handle);
        }
        for dish in &payload.dishes {
            install_dish(s, dish, &borders)?;
        }
        write_state(s, now, Some(&hash))
    })?;

    Ok(RefreshOutcome::Refreshed { dishes })
}

/// Callback-shaped wrapper around [`refresh`]
///
/// Exactly one of the callbacks is invoked. The outcome is also returned.
pub fn refresh_with_callbacks<S, F>(
    store: &mut ObjectStore,
    source: &mut dyn CatalogSource,
    policy: &StalenessPolicy,
    force: bool,
    on_success: S,
    on_failure: F,
) -> Option<RefreshOutcome>
where
    S: FnOnce(&RefreshOutcome),
    F: FnOnce(&str),
{
    match refresh(store, source, policy, force) {
        Ok(outcome) => {
            on_success(&outcome);
            Some(outcome)
        }
        Err(err) => {
            on_failure(&err.description());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::Dish;

    fn payload(name: &str) -> CatalogPayload {
        CatalogPayload {
            dishes: vec![Dish {
                external_id: "d1".to_string(),
                name: name.to_string(),
                description: String::new(),
                category: "pizza".to_string(),
                sort_order: 0,
                price: None,
                old_price: None,
                variants: vec![],
                toppings: vec![],
            }],
            cheese_borders: vec![],
        }
    }

    #[test]
    fn test_content_hash_is_stable_and_sensitive() {
        let a = content_hash(&payload("Margherita")).unwrap();
        assert_eq!(a, content_hash(&payload("Margherita")).unwrap());
        assert_ne!(a, content_hash(&payload("Pepperoni")).unwrap());
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_json_file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = JsonFileSource::new(dir.path().join("absent.json"));
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, RefreshError::Source { .. }));
        assert!(err.description().contains("cannot read"));
    }

    #[test]
    fn test_refresh_error_maps_to_refresh_failure_code() {
        let ex: ExError = RefreshError::unavailable("network down").into();
        assert_eq!(ex.code(), "ERR_REFRESH_FAILURE");
    }
}
