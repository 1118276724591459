// Operation boundary events emitted from the store crate

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::db_path;
use menugraph_core::catalog::catalog_schema;
use menugraph_core::logging_facility::init_test_capture;
use menugraph_core::menugraph_core_types::schema::{EVENT_END, EVENT_START};
use menugraph_store::open_store;

#[test]
fn test_open_store_logs_start_and_end() {
    // GIVEN an in-memory log capture
    let capture = init_test_capture();
    let dir = tempfile::tempdir().unwrap();

    // WHEN a store is opened
    open_store(&db_path(dir.path()), catalog_schema()).unwrap();

    // THEN both boundaries are logged with the shared event names
    capture.assert_event_exists("open_store", EVENT_START);
    capture.assert_event_exists("open_store", EVENT_END);
    let end = capture
        .events_for("open_store")
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END))
        .unwrap();
    assert_eq!(end.field("objects"), Some("0"));
    assert!(end.component.as_deref().unwrap().starts_with("menugraph_store"));
}
