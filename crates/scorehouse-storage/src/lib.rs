//! ScoreHouse Storage Layer
//!
//! This crate implements the partitioned record store - the component
//! responsible for persisting survey batches to S3-compatible object
//! storage and reading them back for analysis.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐
//! │    Ingestion     │
//! └────────┬─────────┘
//!          │ records grouped by (date, level)
//!          ▼
//! ┌──────────────────┐      raw/year=../month=../day=../level=../batch.json
//! │   RecordStore    │ ───► processed/cleaned_dataset.json
//! └────────┬─────────┘      analytics/<identifier>/...
//!          │ batches
//!          ▼
//! ┌──────────────────┐
//! │ PartitionCursor  │  lazy, restartable partition scan
//! └──────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - A partition write is one atomic PUT: readers never observe a partial
//!   batch.
//! - Re-writing a key overwrites the prior batch (idempotent ingestion).
//! - Writes to the same key serialize at the object store
//!   (last-writer-wins); different keys are independent.
//! - Transient PUT failures retry with exponential backoff before
//!   surfacing `StorageUnavailable`.

pub mod error;
pub mod layout;
pub mod store;

pub use error::{Error, Result};
pub use store::{PartitionCursor, RecordStore};
