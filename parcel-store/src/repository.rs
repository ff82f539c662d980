//! Storage capability shared by every parcel backend

use crate::errors::Result;
use crate::parcel::{Parcel, ParcelStatus};

/// The operations a parcel backend must provide.
///
/// Implementations agree on error semantics: a missing number is
/// [`StoreError::NotFound`] for `get`, `set_address` and `delete`, while
/// `set_status` on a missing number succeeds without effect.
///
/// [`StoreError::NotFound`]: crate::errors::StoreError::NotFound
pub trait ParcelRepository {
    /// Insert `parcel` and return the number assigned to it.
    /// `parcel.number` is ignored.
    fn add(&mut self, parcel: &Parcel) -> Result<i64>;

    fn get(&self, number: i64) -> Result<Parcel>;

    /// All parcels of `client`, in no particular order.
    fn get_by_client(&self, client: i64) -> Result<Vec<Parcel>>;

    /// Overwrite the status unconditionally.
    fn set_status(&mut self, number: i64, status: &ParcelStatus) -> Result<()>;

    /// Change the address of a registered parcel. Fails with
    /// `PreconditionFailed` for any other status.
    fn set_address(&mut self, number: i64, address: &str) -> Result<()>;

    /// Remove a registered parcel. Parcels in any other status are left
    /// in place and no error is returned.
    // TODO: align with set_address (reject instead of ignoring) once the
    // product owner confirms which behavior is intended.
    fn delete(&mut self, number: i64) -> Result<()>;
}
