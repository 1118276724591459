//! Hydration - rebuilds an ObjectStore from the `objects` table
//!
//! Rows are read in handle order so the rebuilt reverse index and every
//! derived listing are deterministic.

use std::path::Path;
use std::str::FromStr;

use menugraph_core::{
    log_op_end, log_op_error, log_op_start, Handle, NullBackend, Object, ObjectStore, Schema,
};
use rusqlite::Connection;

use super::sqlite_backend::{decode_object, SqliteBackend};
use crate::errors::{from_rusqlite, serialization_error, Result};

/// Every stored object, ordered by handle
///
/// # Errors
///
/// `Persistence` on SQLite failure, `Serialization` if a row's handle or
/// field JSON does not decode.
pub fn load_objects(conn: &Connection) -> Result<Vec<(Handle, Object)>> {
    let mut stmt = conn
        .prepare("SELECT handle, kind, fields_json FROM objects ORDER BY handle")
        .map_err(from_rusqlite)?;

    let rows: Vec<(String, String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter()
        .map(|(handle, kind, fields_json)| {
            let parsed = Handle::from_str(&handle).map_err(|e| serialization_error(&handle, e))?;
            let object =
                decode_object(&kind, &fields_json).map_err(|e| serialization_error(&handle, e))?;
            Ok((parsed, object))
        })
        .collect()
}

/// In-memory store holding everything in `conn`, with no durable backend
///
/// # Errors
///
/// Same as [`load_objects`].
pub fn hydrate(conn: &Connection, schema: Schema) -> Result<ObjectStore> {
    let objects = load_objects(conn)?;
    Ok(ObjectStore::restore(schema, objects, NullBackend))
}

/// Open the database at `path` and return a store committing back to it
///
/// # Errors
///
/// `Io`/`Persistence` if the database cannot be opened or migrated,
/// `Serialization` if a stored row is corrupt.
pub fn open_store<P: AsRef<Path>>(path: P, schema: Schema) -> Result<ObjectStore> {
    let path = path.as_ref();
    log_op_start!("open_store", path = %path.display());
    let start = std::time::Instant::now();

    let store = open_store_impl(path, schema).map_err(|e| {
        log_op_error!(
            "open_store",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "open_store",
        duration_ms = start.elapsed().as_millis() as u64,
        objects = store.len()
    );
    Ok(store)
}

fn open_store_impl(path: &Path, schema: Schema) -> Result<ObjectStore> {
    let backend = SqliteBackend::open(path)?;
    let objects = load_objects(backend.connection())?;
    Ok(ObjectStore::restore(schema, objects, backend))
}
