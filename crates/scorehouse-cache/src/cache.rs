//! Analysis Cache with Single-Flight Computation
//!
//! This module implements the caching layer between the request surface
//! and the hypothesis engine.
//!
//! ## State Machine
//!
//! Each identifier owns one slot that cycles through:
//!
//! ```text
//! Empty ──► Computing ──► Fresh ──► Stale ──► Computing ──► Fresh ──► …
//!   ▲                       │
//!   └───── invalidate ◄─────┘
//! ```
//!
//! ## Single-Flight
//!
//! A slot pairs an `RwLock<Option<CacheEntry>>` (fast read path) with a
//! compute `Mutex` that bounds the Computing state. A `get` that misses
//! takes the compute lock, re-checks the slot - a concurrent winner may
//! have refreshed it while we waited - and only then runs the provider.
//! Under N concurrent `get`s on an Empty slot the provider therefore runs
//! exactly once and all N callers receive the same result.
//!
//! ## Freshness
//!
//! Expiry is lazy: an entry older than the TTL is treated as Stale on the
//! next read and recomputed in place. `spawn_sweeper` optionally clears
//! expired entries on an interval so long-idle results do not linger.
//!
//! ## Failure Policy
//!
//! A failed computation caches nothing: the slot stays Empty and the
//! error surfaces to the caller. A computation that exceeds the timeout
//! fails with `ComputationTimeout`, releasing the compute lock so the
//! next caller may retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use scorehouse_stats::{AnalysisId, AnalysisResult};
use scorehouse_storage::RecordStore;

use crate::error::{Error, Result};
use crate::provider::AnalysisProvider;
use crate::snapshot;

/// Configuration for the analysis cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window; entries older than this recompute on read
    pub ttl: Duration,
    /// Bound on a single provider run
    pub compute_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            compute_timeout: Duration::from_secs(10),
        }
    }
}

/// A cached result and the moment it was computed
#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    computed_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.computed_at.elapsed() <= ttl
    }
}

/// Externally observable slot state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Computing,
    Fresh,
    Stale,
}

struct Slot {
    entry: RwLock<Option<CacheEntry>>,
    compute: Mutex<()>,
}

impl Slot {
    fn new() -> Self {
        Self {
            entry: RwLock::new(None),
            compute: Mutex::new(()),
        }
    }
}

/// Identifier-keyed result cache with per-identifier single-flight
pub struct AnalysisCache<P: AnalysisProvider> {
    provider: Arc<P>,
    config: CacheConfig,
    slots: HashMap<AnalysisId, Slot>,
    /// Mirror target for the externally visible `analytics/` snapshot
    snapshot_store: Option<Arc<RecordStore>>,
}

impl<P: AnalysisProvider> AnalysisCache<P> {
    pub fn new(provider: Arc<P>, config: CacheConfig) -> Self {
        let slots = AnalysisId::ALL
            .into_iter()
            .map(|id| (id, Slot::new()))
            .collect();
        Self {
            provider,
            config,
            slots,
            snapshot_store: None,
        }
    }

    /// Mirror every successful refresh to the analytics prefix of `store`.
    pub fn with_snapshots(mut self, store: Arc<RecordStore>) -> Self {
        self.snapshot_store = Some(store);
        self
    }

    /// Return the cached result for `id`, computing it if the slot is
    /// Empty or Stale.
    pub async fn get(&self, id: AnalysisId) -> Result<AnalysisResult> {
        let slot = self.slot(id);

        // Fast path: fresh entry under the read lock
        if let Some(result) = self.fresh_result(slot).await {
            tracing::debug!(identifier = %id, "Analysis cache hit");
            return Ok(result);
        }

        // Slow path: bound the Computing state
        let _computing = slot.compute.lock().await;

        // Re-check: a concurrent winner may have refreshed the slot while
        // we waited on the lock. This is the single-flight guarantee.
        if let Some(result) = self.fresh_result(slot).await {
            tracing::debug!(identifier = %id, "Analysis cache hit after wait");
            return Ok(result);
        }

        tracing::info!(identifier = %id, "Analysis cache miss, computing");
        let started = Instant::now();
        let result = match tokio::time::timeout(
            self.config.compute_timeout,
            self.provider.compute(id),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                // Failures are not cached; the slot stays Empty
                tracing::warn!(identifier = %id, error = %e, "Analysis computation failed");
                return Err(e);
            }
            Err(_) => {
                tracing::warn!(
                    identifier = %id,
                    timeout_ms = self.config.compute_timeout.as_millis() as u64,
                    "Analysis computation timed out"
                );
                return Err(Error::ComputationTimeout {
                    identifier: id,
                    timeout: self.config.compute_timeout,
                });
            }
        };

        *slot.entry.write().await = Some(CacheEntry {
            result: result.clone(),
            computed_at: Instant::now(),
        });

        tracing::info!(
            identifier = %id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis cached"
        );

        if let Some(store) = &self.snapshot_store {
            // The snapshot is a best-effort mirror; a failed upload must
            // not fail the get that produced the result.
            if let Err(e) = snapshot::write(store, id, &result, self.config.ttl).await {
                tracing::warn!(identifier = %id, error = %e, "Analytics snapshot write failed");
            }
        }

        Ok(result)
    }

    /// Force the slot for `id` back to Empty.
    pub async fn invalidate(&self, id: AnalysisId) {
        let slot = self.slot(id);
        let had_entry = slot.entry.write().await.take().is_some();
        tracing::info!(identifier = %id, had_entry, "Analysis cache invalidated");
    }

    /// Invalidate every identifier (used after ingestion, where any
    /// analysis may depend on the new data).
    pub async fn invalidate_all(&self) {
        for id in AnalysisId::ALL {
            self.invalidate(id).await;
        }
    }

    /// Observable state of a slot.
    pub async fn state(&self, id: AnalysisId) -> CacheState {
        let slot = self.slot(id);
        if slot.compute.try_lock().is_err() {
            return CacheState::Computing;
        }
        match slot.entry.read().await.as_ref() {
            None => CacheState::Empty,
            Some(entry) if entry.is_fresh(self.config.ttl) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    async fn fresh_result(&self, slot: &Slot) -> Option<AnalysisResult> {
        let entry = slot.entry.read().await;
        entry
            .as_ref()
            .filter(|e| e.is_fresh(self.config.ttl))
            .map(|e| e.result.clone())
    }

    fn slot(&self, id: AnalysisId) -> &Slot {
        // All identifiers are populated at construction
        self.slots.get(&id).expect("slot exists for every identifier")
    }
}

impl<P: AnalysisProvider + 'static> AnalysisCache<P> {
    /// Proactively clear expired entries on an interval.
    ///
    /// Purely a memory bound - correctness never depends on the sweeper,
    /// since expiry is also checked lazily on every read.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                for id in AnalysisId::ALL {
                    let slot = cache.slot(id);
                    let mut entry = slot.entry.write().await;
                    if entry
                        .as_ref()
                        .is_some_and(|e| !e.is_fresh(cache.config.ttl))
                    {
                        let _ = entry.take();
                        tracing::debug!(identifier = %id, "Swept expired analysis entry");
                    }
                }
            }
        })
    }
}
