//! Parcel tracker store
//!
//! Persists parcels in a single SQLite table and enforces the one rule the
//! data layer owns: a parcel's address can change, and the parcel can be
//! deleted, only while it is still `registered`.
//!
//! ## Usage
//! ```rust,no_run
//! use parcel_store::{Parcel, ParcelRepository, ParcelStatus, ParcelStore, TrackerConfig, db};
//!
//! # fn example() -> parcel_store::Result<()> {
//! let cfg = TrackerConfig::load()?;
//! let mut store = ParcelStore::new(db::open(&cfg)?);
//!
//! let number = store.add(&Parcel::registered(1000, "Main St 1"))?;
//! store.set_address(number, "Main St 2")?;
//! store.set_status(number, &ParcelStatus::Sent)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod errors;
pub mod memory;
pub mod parcel;
pub mod repository;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use config::{JournalMode, TrackerConfig};
pub use errors::{ErrorCategory, Result, StoreError};
pub use memory::InMemoryParcelStore;
pub use parcel::{Parcel, ParcelStatus};
pub use repository::ParcelRepository;
pub use store::ParcelStore;
