//! Storage Error Types
//!
//! This module defines all error types that can occur during record store
//! operations.
//!
//! ## Error Categories
//!
//! ### Read Misses
//! - `PartitionUnavailable`: The requested partition key (or the
//!   consolidated dataset) has no object behind it. Callers that did not
//!   require presence treat this as an empty slice; explicit reads
//!   propagate it.
//!
//! ### Transport Errors
//! - `StorageUnavailable`: The object store transport failed for a reason
//!   other than a missing key. Retryable - partition writes are idempotent,
//!   so re-invoking the same ingestion is always safe.
//!
//! ### Data Errors
//! - `CorruptObject`: An object existed but did not decode as the expected
//!   JSON shape.
//!
//! All storage operations return `Result<T>` aliased to `Result<T, Error>`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Partition unavailable: {key}")]
    PartitionUnavailable { key: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] object_store::Error),

    #[error("Corrupt object at {key}: {reason}")]
    CorruptObject { key: String, reason: String },

    #[error(transparent)]
    Core(#[from] scorehouse_core::Error),
}

impl Error {
    /// Map a transport error for `key`, distinguishing a missing object
    /// from an unavailable store.
    pub(crate) fn from_object_store(key: &str, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Error::PartitionUnavailable {
                key: key.to_string(),
            },
            other => Error::StorageUnavailable(other),
        }
    }

    /// True when the caller may treat the failure as an empty read.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::PartitionUnavailable { .. })
    }
}
