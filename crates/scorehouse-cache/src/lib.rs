//! ScoreHouse Analysis Cache
//!
//! This crate sits between the request surface and the statistical
//! engine. Hypothesis tests are cheap enough to run but expensive enough
//! to matter under concurrent load, so results are cached per identifier
//! with a freshness window and a single-flight guarantee:
//!
//! - At most one computation runs per identifier at any time; concurrent
//!   callers wait for the in-flight run and share its result.
//! - Entries expire lazily after the TTL (default 24h); an optional
//!   sweeper clears idle expired entries proactively.
//! - Failed computations are never cached.
//! - Successful refreshes mirror to `analytics/<identifier>/` on the blob
//!   store for external consumers.
//!
//! Ingestion invalidates all identifiers after new data lands; the next
//! read per identifier recomputes against the refreshed dataset.

pub mod cache;
pub mod error;
pub mod provider;
pub mod snapshot;

pub use cache::{AnalysisCache, CacheConfig, CacheState};
pub use error::{Error, Result};
pub use provider::{AnalysisProvider, EngineProvider};
