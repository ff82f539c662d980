//! Connection bootstrap and transaction helper
//!
//! Opening and closing the connection is the caller's job; [`ParcelStore`]
//! only borrows what it is handed. This module covers the common way of
//! getting such a connection from a [`TrackerConfig`].
//!
//! [`ParcelStore`]: crate::store::ParcelStore

use crate::config::TrackerConfig;
use crate::errors::{Result, StoreError};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// Embedded schema for the `parcel` table
const SCHEMA_SQL: &str = include_str!("../schema.sql");

/// Open the database named by `cfg` and apply connection settings.
pub fn open(cfg: &TrackerConfig) -> Result<Connection> {
    let path = cfg.resolved_db_path();
    open_at_path(&path, cfg)
}

/// Open a specific database file with the settings from `cfg`.
///
/// Creates the file and its parent directory if they don't exist.
pub fn open_at_path(path: &Path, cfg: &TrackerConfig) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoreError::open_with_source(
                format!("failed to create db directory: {}", parent.display()),
                e,
            )
        })?;
    }

    let conn = Connection::open(path).map_err(|e| {
        StoreError::open_with_source(format!("failed to open db at {}", path.display()), e)
    })?;

    conn.busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))
        .map_err(|e| StoreError::open_with_source("failed to set busy timeout", e))?;

    // journal_mode answers with the mode actually in effect
    let mode: String = conn
        .query_row(
            &format!("PRAGMA journal_mode = {}", cfg.journal_mode.pragma_value()),
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::open_with_source("failed to set journal mode", e))?;

    if cfg.create_schema {
        apply_schema(&conn)?;
    }

    tracing::debug!(
        path = %path.display(),
        journal_mode = %mode,
        "Parcel DB opened"
    );

    Ok(conn)
}

/// Open a private in-memory database with the schema applied.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| StoreError::open_with_source("failed to open in-memory db", e))?;

    apply_schema(&conn)?;

    Ok(conn)
}

/// Apply the bundled schema. Safe to run against an initialized database.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| StoreError::open_with_source("failed to apply schema", e))?;
    Ok(())
}

/// Run `operation` inside a transaction.
///
/// Commits when the closure returns `Ok`. On `Err` the transaction is
/// dropped uncommitted, which rolls it back, and the closure's error is
/// returned unchanged.
pub fn execute_in_transaction<F, T>(
    conn: &mut Connection,
    behavior: TransactionBehavior,
    operation: F,
) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn
        .transaction_with_behavior(behavior)
        .map_err(|e| StoreError::transaction_with_source("failed to begin transaction", e))?;

    let result = operation(&tx)?;

    tx.commit()
        .map_err(|e| StoreError::transaction_with_source("failed to commit transaction", e))?;

    Ok(result)
}
