//! In-memory parcel store
//!
//! Same contract as [`ParcelStore`](crate::store::ParcelStore) without a
//! database, for embedding and for tests that don't care about SQL.

use crate::errors::{Result, StoreError};
use crate::parcel::{Parcel, ParcelStatus};
use crate::repository::ParcelRepository;
use std::collections::BTreeMap;

/// Map-backed parcel store
#[derive(Debug)]
pub struct InMemoryParcelStore {
    parcels: BTreeMap<i64, Parcel>,
    next_number: i64,
}

impl Default for InMemoryParcelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParcelStore {
    pub fn new() -> Self {
        Self {
            parcels: BTreeMap::new(),
            next_number: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }
}

impl ParcelRepository for InMemoryParcelStore {
    fn add(&mut self, parcel: &Parcel) -> Result<i64> {
        // Numbers are never handed out twice, matching AUTOINCREMENT
        let number = self.next_number;
        self.next_number += 1;

        self.parcels
            .insert(number, parcel.clone().with_number(number));

        tracing::debug!(number, client = parcel.client, "Added parcel in memory");
        Ok(number)
    }

    fn get(&self, number: i64) -> Result<Parcel> {
        self.parcels
            .get(&number)
            .cloned()
            .ok_or_else(|| StoreError::not_found(number))
    }

    fn get_by_client(&self, client: i64) -> Result<Vec<Parcel>> {
        Ok(self
            .parcels
            .values()
            .filter(|p| p.client == client)
            .cloned()
            .collect())
    }

    fn set_status(&mut self, number: i64, status: &ParcelStatus) -> Result<()> {
        let updated = match self.parcels.get_mut(&number) {
            Some(parcel) => {
                parcel.status = status.clone();
                1
            }
            None => 0,
        };

        tracing::debug!(number, status = %status, updated, "Set parcel status in memory");
        Ok(())
    }

    fn set_address(&mut self, number: i64, address: &str) -> Result<()> {
        let parcel = self
            .parcels
            .get_mut(&number)
            .ok_or_else(|| StoreError::not_found(number))?;

        if !parcel.status.is_registered() {
            tracing::warn!(
                number,
                status = %parcel.status,
                "Rejected address change for parcel that is not registered"
            );
            return Err(StoreError::precondition_failed(
                number,
                parcel.status.clone(),
            ));
        }

        parcel.address = address.to_string();
        tracing::debug!(number, "Set parcel address in memory");
        Ok(())
    }

    fn delete(&mut self, number: i64) -> Result<()> {
        let parcel = self
            .parcels
            .get(&number)
            .ok_or_else(|| StoreError::not_found(number))?;

        if !parcel.status.is_registered() {
            tracing::debug!(
                number,
                status = %parcel.status,
                "Skipped delete of parcel that is not registered"
            );
            return Ok(());
        }

        self.parcels.remove(&number);
        tracing::debug!(number, "Deleted parcel from memory");
        Ok(())
    }
}
