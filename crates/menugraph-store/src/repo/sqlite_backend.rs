//! Commit backend writing change sets to the `objects` table

use std::collections::BTreeMap;
use std::path::Path;

use menugraph_core::errors::{GraphError, Result as GraphResult};
use menugraph_core::{ChangeSet, CommitBackend, FieldValue, Object};
use rusqlite::{params, Connection};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;

/// Durable backend for an [`ObjectStore`](menugraph_core::ObjectStore)
///
/// Each write transaction of the store maps onto exactly one SQLite
/// transaction: `begin` opens it, `commit` writes the net change set and
/// commits, `rollback` discards whatever was written.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Connection,
    open_txn: bool,
}

impl SqliteBackend {
    /// Open (or create) the database at `path` and bring its schema up to date
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Persistence` if the file cannot be opened or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(db::open(path)?)
    }

    /// # Errors
    ///
    /// Returns `Persistence` if migrations fail.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// # Errors
    ///
    /// Returns `Persistence` if migrations fail.
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn,
            open_txn: false,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of stored object rows
    ///
    /// # Errors
    ///
    /// Returns `Persistence` on SQLite failure.
    pub fn object_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn write(&self, changes: &ChangeSet) -> GraphResult<()> {
        let now = chrono::Utc::now().timestamp_millis();

        let mut upsert = self
            .conn
            .prepare_cached(
                "INSERT INTO objects (handle, kind, fields_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(handle) DO UPDATE SET
                     kind = excluded.kind,
                     fields_json = excluded.fields_json,
                     updated_at = excluded.updated_at",
            )
            .map_err(|e| sql_failure("commit", e))?;
        for (handle, object) in &changes.upserts {
            let fields = encode_fields(object)?;
            upsert
                .execute(params![handle.to_string(), object.kind(), fields, now])
                .map_err(|e| sql_failure("commit", e))?;
        }

        let mut delete = self
            .conn
            .prepare_cached("DELETE FROM objects WHERE handle = ?1")
            .map_err(|e| sql_failure("commit", e))?;
        for handle in &changes.deletes {
            delete
                .execute(params![handle.to_string()])
                .map_err(|e| sql_failure("commit", e))?;
        }

        Ok(())
    }
}

impl CommitBackend for SqliteBackend {
    fn begin(&mut self) -> GraphResult<()> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| sql_failure("begin", e))?;
        self.open_txn = true;
        Ok(())
    }

    fn commit(&mut self, changes: &ChangeSet) -> GraphResult<()> {
        self.write(changes)?;
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| sql_failure("commit", e))?;
        self.open_txn = false;
        tracing::debug!(
            upserts = changes.upserts.len(),
            deletes = changes.deletes.len(),
            "sqlite transaction committed"
        );
        Ok(())
    }

    fn rollback(&mut self) {
        if !self.open_txn {
            return;
        }
        self.open_txn = false;
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!(error = %err, "sqlite rollback failed");
        }
    }
}

fn sql_failure(op: &str, err: rusqlite::Error) -> GraphError {
    GraphError::transaction(op, err.to_string())
}

/// JSON of the field map, keys in name order
pub(crate) fn encode_fields(object: &Object) -> GraphResult<String> {
    let fields: BTreeMap<&str, &FieldValue> =
        object.fields().map(|(name, value)| (name.as_str(), value)).collect();
    Ok(serde_json::to_string(&fields)?)
}

pub(crate) fn decode_object(kind: &str, fields_json: &str) -> GraphResult<Object> {
    let fields: BTreeMap<String, FieldValue> = serde_json::from_str(fields_json)?;
    Ok(fields
        .into_iter()
        .fold(Object::new(kind), |object, (name, value)| {
            object.with_field(&name, value)
        }))
}
