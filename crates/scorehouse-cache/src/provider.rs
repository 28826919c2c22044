//! Analysis Providers
//!
//! The cache does not know how results are produced; it drives an
//! `AnalysisProvider`. The production implementation reads the
//! consolidated dataset from the record store and hands it to the
//! hypothesis engine. Tests substitute counting or failing providers to
//! pin down the single-flight and no-failure-caching contracts.

use std::sync::Arc;

use async_trait::async_trait;

use scorehouse_stats::{AnalysisId, AnalysisResult, Engine};
use scorehouse_storage::RecordStore;

use crate::error::Result;

/// Produces a fresh result for an identifier
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn compute(&self, id: AnalysisId) -> Result<AnalysisResult>;
}

/// Production provider: consolidated dataset + hypothesis engine
pub struct EngineProvider {
    store: Arc<RecordStore>,
    engine: Engine,
}

impl EngineProvider {
    pub fn new(store: Arc<RecordStore>, engine: Engine) -> Self {
        Self { store, engine }
    }
}

#[async_trait]
impl AnalysisProvider for EngineProvider {
    async fn compute(&self, id: AnalysisId) -> Result<AnalysisResult> {
        // A dataset that was never consolidated reads as empty; the engine
        // then reports InsufficientData with the real counts.
        let dataset = match self.store.read_all().await {
            Ok(records) => records,
            Err(e) if e.is_unavailable() => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            identifier = %id,
            records = dataset.len(),
            "Computing analysis from consolidated dataset"
        );
        Ok(self.engine.compute(id, &dataset)?)
    }
}
