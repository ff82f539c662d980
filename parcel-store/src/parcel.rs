//! Parcel entity and its lifecycle status

use chrono::{SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a parcel.
///
/// Only [`ParcelStatus::Registered`] changes what the store allows. Labels
/// outside the known set are kept verbatim in [`ParcelStatus::Other`] so a
/// row written by a newer writer reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParcelStatus {
    /// Accepted but not yet shipped; address changes and deletion allowed
    Registered,
    /// Handed to the carrier
    Sent,
    /// Reached the recipient
    Delivered,
    /// Any other label
    Other(String),
}

impl ParcelStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Other(label) => label,
        }
    }

    /// The named status for `s`, if it is one of the known labels
    fn known(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(Self::Registered),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Parse from string representation. Never fails.
    pub fn parse(s: &str) -> Self {
        Self::known(s).unwrap_or_else(|| Self::Other(s.to_string()))
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered)
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ParcelStatus {
    fn from(s: String) -> Self {
        match Self::known(&s) {
            Some(status) => status,
            None => Self::Other(s),
        }
    }
}

impl From<&str> for ParcelStatus {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ParcelStatus> for String {
    fn from(status: ParcelStatus) -> Self {
        match status {
            ParcelStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl ToSql for ParcelStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ParcelStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Self::parse)
    }
}

/// A row of the `parcel` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Store-assigned identity; `0` until the parcel has been added
    pub number: i64,
    pub client: i64,
    pub status: ParcelStatus,
    pub address: String,
    /// RFC3339 timestamp chosen by the caller at creation
    pub created_at: String,
}

impl Parcel {
    /// A freshly registered parcel stamped with the current UTC time.
    pub fn registered(client: i64, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Copy of this parcel carrying the number assigned by the store.
    pub fn with_number(mut self, number: i64) -> Self {
        self.number = number;
        self
    }
}
