//! SQLite-backed parcel store
//!
//! Thin access layer over the `parcel` table. Reads and single-statement
//! writes go straight to the connection; `set_address` and `delete` check
//! the current status and act on it inside one IMMEDIATE transaction.

use crate::db::execute_in_transaction;
use crate::errors::{Result, StoreError};
use crate::parcel::{Parcel, ParcelStatus};
use crate::repository::ParcelRepository;
use rusqlite::{Connection, Row, Transaction, TransactionBehavior, params};

const SELECT_PARCEL: &str = r#"
    SELECT number, client, status, address, created_at
    FROM parcel
"#;

/// Parcel store owning a single SQLite connection
pub struct ParcelStore {
    conn: Connection,
}

impl ParcelStore {
    /// Wrap an open connection. The `parcel` table must already exist.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Give the connection back to the caller.
    pub fn into_inner(self) -> Connection {
        self.conn
    }

    /// Number of parcels currently stored
    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM parcel", [], |row| row.get(0))
            .map_err(|e| StoreError::read_with_source("failed to count parcels", e))
    }

    fn parcel_from_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
        Ok(Parcel {
            number: row.get(0)?,
            client: row.get(1)?,
            status: row.get(2)?,
            address: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn status_in_tx(tx: &Transaction<'_>, number: i64) -> Result<ParcelStatus> {
        tx.query_row(
            "SELECT status FROM parcel WHERE number = ?1",
            params![number],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::from_lookup(number, "failed to read parcel status", e))
    }
}

impl ParcelRepository for ParcelStore {
    fn add(&mut self, parcel: &Parcel) -> Result<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO parcel (client, status, address, created_at)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    parcel.client,
                    parcel.status,
                    parcel.address,
                    parcel.created_at
                ],
            )
            .map_err(|e| StoreError::write_with_source("failed to insert parcel", e))?;

        let number = self.conn.last_insert_rowid();

        tracing::debug!(
            number,
            client = parcel.client,
            status = %parcel.status,
            "Added parcel"
        );

        Ok(number)
    }

    fn get(&self, number: i64) -> Result<Parcel> {
        self.conn
            .query_row(
                &format!("{SELECT_PARCEL} WHERE number = ?1"),
                params![number],
                Self::parcel_from_row,
            )
            .map_err(|e| StoreError::from_lookup(number, "failed to get parcel", e))
    }

    fn get_by_client(&self, client: i64) -> Result<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_PARCEL} WHERE client = ?1"))
            .map_err(|e| StoreError::read_with_source("failed to prepare client query", e))?;

        let rows = stmt
            .query_map(params![client], Self::parcel_from_row)
            .map_err(|e| StoreError::read_with_source("failed to query client parcels", e))?;

        // Any scan failure discards what was read so far
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::read_with_source("failed to scan client parcel", e))
    }

    fn set_status(&mut self, number: i64, status: &ParcelStatus) -> Result<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE parcel SET status = ?1 WHERE number = ?2",
                params![status, number],
            )
            .map_err(|e| StoreError::write_with_source("failed to update status", e))?;

        tracing::debug!(number, status = %status, updated, "Set parcel status");

        Ok(())
    }

    fn set_address(&mut self, number: i64, address: &str) -> Result<()> {
        execute_in_transaction(&mut self.conn, TransactionBehavior::Immediate, |tx| {
            let status = Self::status_in_tx(tx, number)?;

            if !status.is_registered() {
                tracing::warn!(
                    number,
                    status = %status,
                    "Rejected address change for parcel that is not registered"
                );
                return Err(StoreError::precondition_failed(number, status));
            }

            tx.execute(
                "UPDATE parcel SET address = ?1 WHERE number = ?2",
                params![address, number],
            )
            .map_err(|e| StoreError::write_with_source("failed to update address", e))?;

            Ok(())
        })?;

        tracing::debug!(number, "Set parcel address");
        Ok(())
    }

    fn delete(&mut self, number: i64) -> Result<()> {
        execute_in_transaction(&mut self.conn, TransactionBehavior::Immediate, |tx| {
            let status = Self::status_in_tx(tx, number)?;

            if !status.is_registered() {
                tracing::debug!(
                    number,
                    status = %status,
                    "Skipped delete of parcel that is not registered"
                );
                return Ok(());
            }

            tx.execute("DELETE FROM parcel WHERE number = ?1", params![number])
                .map_err(|e| StoreError::write_with_source("failed to delete parcel", e))?;

            tracing::debug!(number, "Deleted parcel");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::errors::ErrorCategory;
    use crate::test_support::capture_logs;
    use pretty_assertions::assert_eq;

    fn store() -> ParcelStore {
        ParcelStore::new(open_in_memory().expect("should connect"))
    }

    fn sample_parcel() -> Parcel {
        Parcel {
            number: 0,
            client: 1000,
            status: ParcelStatus::Registered,
            address: "test".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_add_get_set_address_delete() {
        let mut store = store();
        let parcel = sample_parcel();

        let number = store.add(&parcel).expect("add");
        assert!(number > 0);

        let stored = store.get(number).expect("get");
        assert_eq!(stored, parcel.clone().with_number(number));

        store.set_address(number, "updated").expect("set address");
        assert_eq!(store.get(number).expect("get").address, "updated");

        store.delete(number).expect("delete");
        let err = store.get(number).expect_err("deleted parcel should be gone");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_ignores_input_number() {
        let mut store = store();
        let parcel = sample_parcel().with_number(9_999);

        let number = store.add(&parcel).expect("add");
        assert_ne!(number, 9_999);
        assert_eq!(store.get(number).expect("get").number, number);
    }

    #[test]
    fn test_numbers_are_not_reused_after_delete() {
        let mut store = store();
        let first = store.add(&sample_parcel()).expect("add");
        store.delete(first).expect("delete");

        let second = store.add(&sample_parcel()).expect("add");
        assert!(second > first);
    }

    #[test]
    fn test_delete_sent_parcel_is_noop() {
        let mut store = store();
        let number = store.add(&sample_parcel()).expect("add");
        store.set_status(number, &ParcelStatus::Sent).expect("status");

        store.delete(number).expect("delete should not error");

        let stored = store.get(number).expect("parcel should remain");
        assert_eq!(stored.status, ParcelStatus::Sent);
        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn test_set_address_rejected_when_not_registered() {
        let mut store = store();
        let number = store.add(&sample_parcel()).expect("add");
        store
            .set_status(number, &ParcelStatus::Delivered)
            .expect("status");

        let err = store
            .set_address(number, "elsewhere")
            .expect_err("should reject");
        assert_eq!(err.category(), ErrorCategory::PreconditionFailed);
        match err {
            StoreError::PreconditionFailed { number: n, status } => {
                assert_eq!(n, number);
                assert_eq!(status, ParcelStatus::Delivered);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.get(number).expect("get").address, "test");
    }

    #[test]
    fn test_set_status_on_missing_number_succeeds() {
        let mut store = store();
        store
            .set_status(12345, &ParcelStatus::Sent)
            .expect("zero rows is not an error");
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn test_guarded_ops_on_missing_number_report_not_found() {
        let mut store = store();
        assert!(store.set_address(777, "x").expect_err("missing").is_not_found());
        assert!(store.delete(777).expect_err("missing").is_not_found());
    }

    #[test]
    fn test_unknown_status_round_trips() {
        let mut store = store();
        let number = store.add(&sample_parcel()).expect("add");
        let status = ParcelStatus::from("held at customs");

        store.set_status(number, &status).expect("status");

        assert_eq!(store.get(number).expect("get").status, status);
    }

    #[test]
    fn test_get_by_client_discards_partial_results_on_scan_failure() {
        let mut store = store();
        store.add(&sample_parcel()).expect("add");
        store.add(&sample_parcel()).expect("add");

        let conn = store.into_inner();
        conn.execute(
            "INSERT INTO parcel (client, status, address, created_at) VALUES (1000, 'registered', NULL, 'x')",
            [],
        )
        .expect("raw insert");
        let store = ParcelStore::new(conn);

        let err = store.get_by_client(1000).expect_err("NULL address should fail scan");
        assert_eq!(err.category(), ErrorCategory::ReadFailure);
    }

    #[test]
    fn test_add_surfaces_write_failure() {
        let conn = rusqlite::Connection::open_in_memory().expect("open");
        let mut store = ParcelStore::new(conn);

        let err = store.add(&sample_parcel()).expect_err("no table");
        assert_eq!(err.category(), ErrorCategory::WriteFailure);
    }

    #[test]
    fn test_guarded_operations_log_like_memory_store() {
        let mut store = store();
        let number = store.add(&sample_parcel()).expect("add");
        store.set_status(number, &ParcelStatus::Sent).expect("status");

        let logs = capture_logs(|| {
            assert!(store.set_address(number, "elsewhere").is_err());
            store.delete(number).expect("delete");
        });

        assert!(logs.contains("Rejected address change"), "logs: {logs}");
        assert!(logs.contains("Skipped delete"), "logs: {logs}");
    }
}
