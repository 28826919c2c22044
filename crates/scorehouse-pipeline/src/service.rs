//! Survey Service
//!
//! The logical request surface the out-of-scope HTTP router calls into.
//! One method per contract operation:
//!
//! | Contract              | Method          | Cached?            |
//! |-----------------------|-----------------|--------------------|
//! | `GET analysis/{id}`   | `analysis(id)`  | yes (single-flight)|
//! | `POST ingest {date}`  | `ingest(date)`  | n/a                |
//! | `GET stats/daily`     | `daily_stats()` | no, always fresh   |
//! | `GET stats/levels`    | `level_stats()` | no, always fresh   |
//! | dataset overview      | `summary()`     | no, always fresh   |
//!
//! The descriptive surfaces are cheap scans of the consolidated dataset,
//! so they bypass the cache entirely; only the hypothesis tests go
//! through it.

use std::sync::Arc;

use chrono::NaiveDate;
use object_store::ObjectStore;

use scorehouse_cache::{AnalysisCache, AnalysisProvider, CacheConfig, EngineProvider};
use scorehouse_core::Record;
use scorehouse_stats::describe::{self, DailyStat, DatasetSummary, LevelStat};
use scorehouse_stats::{AnalysisId, AnalysisResult, Engine, EngineConfig};
use scorehouse_storage::RecordStore;

use crate::error::Result;
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::source::RawRecordSource;

/// Facade over store, cache and orchestrator
pub struct SurveyService<P: AnalysisProvider> {
    store: Arc<RecordStore>,
    cache: Arc<AnalysisCache<P>>,
    orchestrator: Orchestrator<P>,
}

impl SurveyService<EngineProvider> {
    /// Wire the production stack over one object store.
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        source: Arc<dyn RawRecordSource>,
        engine_config: EngineConfig,
        cache_config: CacheConfig,
    ) -> Self {
        let store = Arc::new(RecordStore::new(object_store));
        let provider = Arc::new(EngineProvider::new(
            store.clone(),
            Engine::new(engine_config),
        ));
        let cache = Arc::new(
            AnalysisCache::new(provider, cache_config).with_snapshots(store.clone()),
        );
        let orchestrator = Orchestrator::new(source, store.clone(), cache.clone());
        Self {
            store,
            cache,
            orchestrator,
        }
    }
}

impl<P: AnalysisProvider> SurveyService<P> {
    pub fn with_parts(
        store: Arc<RecordStore>,
        cache: Arc<AnalysisCache<P>>,
        orchestrator: Orchestrator<P>,
    ) -> Self {
        Self {
            store,
            cache,
            orchestrator,
        }
    }

    /// `GET analysis/{identifier}`
    pub async fn analysis(&self, id: AnalysisId) -> Result<AnalysisResult> {
        Ok(self.cache.get(id).await?)
    }

    /// `POST ingest {date}`
    pub async fn ingest(&self, date: NaiveDate) -> Result<RunSummary> {
        self.orchestrator.run(date).await
    }

    /// Dataset overview, always recomputed
    pub async fn summary(&self) -> Result<DatasetSummary> {
        Ok(describe::summarize(&self.dataset().await?))
    }

    /// `GET stats/daily`, always recomputed
    pub async fn daily_stats(&self) -> Result<Vec<DailyStat>> {
        Ok(describe::daily_stats(&self.dataset().await?))
    }

    /// `GET stats/levels`, always recomputed
    pub async fn level_stats(&self) -> Result<Vec<LevelStat>> {
        Ok(describe::level_stats(&self.dataset().await?))
    }

    /// The analysis cache, for callers that manage invalidation directly
    pub fn cache(&self) -> &Arc<AnalysisCache<P>> {
        &self.cache
    }

    /// The underlying record store
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    async fn dataset(&self) -> Result<Vec<Record>> {
        match self.store.read_all().await {
            Ok(records) => Ok(records),
            Err(e) if e.is_unavailable() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
