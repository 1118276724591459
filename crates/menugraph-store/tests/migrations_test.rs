// Integration tests for the migration framework

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{db_path, table_names};
use menugraph_store::migrations::{applied_migrations, apply_migrations};
use rusqlite::Connection;

#[test]
fn test_apply_migrations_on_empty_db() {
    // GIVEN an empty database
    let mut conn = Connection::open_in_memory().unwrap();

    // WHEN migrations are applied
    apply_migrations(&mut conn).unwrap();

    // THEN the object table and the version ledger exist
    assert_eq!(table_names(&conn), vec!["objects", "schema_version"]);
    assert_eq!(applied_migrations(&conn).unwrap(), vec!["001_objects"]);
}

#[test]
fn test_apply_migrations_is_idempotent() {
    // GIVEN a migrated database
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    // WHEN migrations run again
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    // THEN nothing is applied twice
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_checksum_is_recorded() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = '001_objects'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64);
    assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_reopening_a_file_keeps_existing_rows() {
    // GIVEN a database file with one object row
    let dir = tempfile::tempdir().unwrap();
    let path = db_path(dir.path());
    {
        let backend = menugraph_store::SqliteBackend::open(&path).unwrap();
        backend
            .connection()
            .execute(
                "INSERT INTO objects (handle, kind, fields_json, updated_at) VALUES ('h', 'Money', '{}', 0)",
                [],
            )
            .unwrap();
    }

    // WHEN it is opened again
    let backend = menugraph_store::SqliteBackend::open(&path).unwrap();

    // THEN migrations were not re-run destructively
    assert_eq!(backend.object_count().unwrap(), 1);
    assert_eq!(applied_migrations(backend.connection()).unwrap().len(), 1);
}

#[test]
fn test_open_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("store.db");

    menugraph_store::SqliteBackend::open(&path).unwrap();

    assert!(path.exists());
}
