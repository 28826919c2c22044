//! Pipeline Error Types
//!
//! Ingestion failures are scoped to a single run: a failed stage aborts
//! the remaining stages for that date and surfaces here, but other dates'
//! runs and the serving path are unaffected.
//!
//! Note what is NOT an error: a date with zero matching raw records ends
//! the run successfully with `records_processed = 0`, and individual
//! malformed records are skipped and counted within the batch.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Raw source error: {0}")]
    Source(String),

    #[error(transparent)]
    Storage(#[from] scorehouse_storage::Error),

    #[error(transparent)]
    Cache(#[from] scorehouse_cache::Error),
}
