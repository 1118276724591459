//! Shared fixtures for menugraph-store integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use menugraph_core::catalog::{refresh, JsonFileSource, RefreshOutcome, StalenessPolicy};
use menugraph_core::ObjectStore;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn db_path(dir: &Path) -> PathBuf {
    dir.join("store.db")
}

/// Force-refresh `store` from the catalog fixture
pub fn load_catalog(store: &mut ObjectStore) -> RefreshOutcome {
    let mut source = JsonFileSource::new(fixture("catalog.json"));
    refresh(store, &mut source, &StalenessPolicy::default(), true).unwrap()
}

pub fn table_names(conn: &rusqlite::Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

pub fn row_count(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))
        .unwrap()
}
