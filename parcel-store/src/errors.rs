//! Parcel store error types
//!
//! Every store operation returns the first error it hits. Callers that need
//! to branch on the failure kind use [`StoreError::category`]; everything
//! else only needs the `Display` text.

use crate::parcel::ParcelStatus;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error category for structured logging and caller-side branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No parcel row for the requested number
    NotFound,
    /// Insert/update/delete execution failed
    WriteFailure,
    /// Query or row scan failed
    ReadFailure,
    /// Address update attempted on a parcel that is not registered
    PreconditionFailed,
    /// Begin/commit/rollback of the wrapping transaction failed
    TransactionFailure,
    /// `tracker.toml` or env misconfigured
    ConfigError,
    /// Opening the database or bootstrapping its schema failed
    OpenError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::WriteFailure => "WRITE_FAILURE",
            Self::ReadFailure => "READ_FAILURE",
            Self::PreconditionFailed => "PRECONDITION_FAILED",
            Self::TransactionFailure => "TRANSACTION_FAILURE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::OpenError => "OPEN_ERROR",
        }
    }
}

/// Parcel store error with category and context
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("parcel {number} not found")]
    NotFound { number: i64 },

    #[error("write failed: {message}")]
    Write {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("read failed: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("parcel {number} has status {status}: status must be registered")]
    PreconditionFailed { number: i64, status: ParcelStatus },

    #[error("transaction failed: {message}")]
    Transaction {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("open failed: {message}")]
    Open {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl StoreError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Write { .. } => ErrorCategory::WriteFailure,
            Self::Read { .. } => ErrorCategory::ReadFailure,
            Self::PreconditionFailed { .. } => ErrorCategory::PreconditionFailed,
            Self::Transaction { .. } => ErrorCategory::TransactionFailure,
            Self::Config { .. } => ErrorCategory::ConfigError,
            Self::Open { .. } => ErrorCategory::OpenError,
        }
    }

    /// True when the requested parcel does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn not_found(number: i64) -> Self {
        Self::NotFound { number }
    }

    pub fn precondition_failed(number: i64, status: ParcelStatus) -> Self {
        Self::PreconditionFailed { number, status }
    }

    /// Create a write error with source
    pub fn write_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Write {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a read error with source
    pub fn read_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Read {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transaction error with source
    pub fn transaction_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transaction {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an open error with source
    pub fn open_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Open {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Map a single-row lookup failure, folding the driver's no-rows signal
    /// into [`StoreError::NotFound`].
    pub(crate) fn from_lookup(number: i64, message: &str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => Self::not_found(number),
            other => Self::read_with_source(message, other),
        }
    }
}

/// Result type for parcel store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_folds_no_rows_into_not_found() {
        let err = StoreError::from_lookup(
            7,
            "failed to get parcel",
            rusqlite::Error::QueryReturnedNoRows,
        );
        assert!(err.is_not_found());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "parcel 7 not found");
    }

    #[test]
    fn test_lookup_keeps_other_failures_as_reads() {
        let err = StoreError::from_lookup(
            7,
            "failed to get parcel",
            rusqlite::Error::InvalidColumnIndex(9),
        );
        assert_eq!(err.category(), ErrorCategory::ReadFailure);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_precondition_message_names_required_status() {
        let err = StoreError::precondition_failed(3, ParcelStatus::Sent);
        assert!(err.to_string().contains("status must be registered"));
        assert_eq!(err.category().as_str(), "PRECONDITION_FAILED");
    }
}
