//! Error Types for ScoreHouse Core
//!
//! This module defines the errors shared by every ScoreHouse crate that
//! handles raw survey data.
//!
//! ## Error Categories
//!
//! ### Ingestion Errors
//! - `MalformedRecord`: A raw record could not be turned into a `Record`
//!   (unparseable JSON, invalid calendar date, missing required field).
//!   Malformed records are skipped within a batch and counted, they never
//!   abort the batch.
//!
//! ### Addressing Errors
//! - `InvalidPartitionPath`: A storage path did not round-trip through the
//!   partition key codec.
//!
//! ## Usage
//! All fallible core functions return `Result<T>` aliased to
//! `Result<T, Error>`, so callers propagate with `?`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Invalid partition path: {0}")]
    InvalidPartitionPath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
