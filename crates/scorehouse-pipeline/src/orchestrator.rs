//! Pipeline Orchestrator
//!
//! Coordinates one ingestion run for a requested date.
//!
//! ## Stages
//!
//! ```text
//! run(date)
//!     ↓
//! extract   fetch raw blobs with metadata.date == D
//!     ↓         zero blobs → successful zero-record summary
//! parse     Record::from_raw_json per blob
//!     ↓         malformed → skipped and counted, batch continues
//! load      group by PartitionKey, one atomic write per partition,
//!     ↓     then rebuild the consolidated cleaned dataset
//! trigger   invalidate every analysis identifier
//! ```
//!
//! Linear and non-branching: a stage failure aborts the remaining stages
//! for this run only. Re-running the same date is safe end to end because
//! partition writes are idempotent overwrites.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scorehouse_cache::{AnalysisCache, AnalysisProvider};
use scorehouse_core::{PartitionKey, Record};
use scorehouse_stats::AnalysisId;
use scorehouse_storage::RecordStore;

use crate::error::Result;
use crate::source::RawRecordSource;

/// Outcome of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub records_processed: usize,
    pub records_skipped: usize,
    pub partitions_written: usize,
    pub invalidated: Vec<AnalysisId>,
}

impl RunSummary {
    fn empty(date: NaiveDate, skipped: usize) -> Self {
        Self {
            date,
            records_processed: 0,
            records_skipped: skipped,
            partitions_written: 0,
            invalidated: Vec::new(),
        }
    }
}

/// Runs the extract → load → invalidate pipeline for single dates
pub struct Orchestrator<P: AnalysisProvider> {
    source: Arc<dyn RawRecordSource>,
    store: Arc<RecordStore>,
    cache: Arc<AnalysisCache<P>>,
}

impl<P: AnalysisProvider> Orchestrator<P> {
    pub fn new(
        source: Arc<dyn RawRecordSource>,
        store: Arc<RecordStore>,
        cache: Arc<AnalysisCache<P>>,
    ) -> Self {
        Self {
            source,
            store,
            cache,
        }
    }

    /// Run ingestion for `date`.
    ///
    /// A date with no matching raw records is a successful zero-record
    /// run, not an error - the scheduler re-invokes daily regardless of
    /// whether the collector produced anything.
    pub async fn run(&self, date: NaiveDate) -> Result<RunSummary> {
        tracing::info!(date = %date, "Ingestion run starting");

        // extract
        let blobs = self.source.fetch(date).await?;
        if blobs.is_empty() {
            tracing::warn!(date = %date, "No raw records for date, ending run");
            return Ok(RunSummary::empty(date, 0));
        }

        let mut records = Vec::with_capacity(blobs.len());
        let mut skipped = 0usize;
        for blob in &blobs {
            match Record::from_raw_json(&blob.body) {
                Ok(record) if record.date == date => records.push(record),
                Ok(record) => {
                    tracing::warn!(
                        blob = %blob.name,
                        record_date = %record.date,
                        expected = %date,
                        "Record date does not match run date, skipping"
                    );
                    skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(blob = %blob.name, error = %e, "Skipping malformed record");
                    skipped += 1;
                }
            }
        }

        if records.is_empty() {
            tracing::warn!(date = %date, skipped, "Every raw record was skipped, ending run");
            return Ok(RunSummary::empty(date, skipped));
        }

        // load
        let mut by_partition: BTreeMap<PartitionKey, Vec<Record>> = BTreeMap::new();
        for record in records {
            by_partition
                .entry(PartitionKey::for_record(&record))
                .or_default()
                .push(record);
        }

        let mut processed = 0usize;
        for (key, batch) in &by_partition {
            self.store.write_partition(key, batch).await?;
            processed += batch.len();
        }

        self.consolidate().await?;

        // trigger
        self.cache.invalidate_all().await;

        let summary = RunSummary {
            date,
            records_processed: processed,
            records_skipped: skipped,
            partitions_written: by_partition.len(),
            invalidated: AnalysisId::ALL.to_vec(),
        };
        tracing::info!(
            date = %date,
            records = summary.records_processed,
            skipped = summary.records_skipped,
            partitions = summary.partitions_written,
            "Ingestion run complete"
        );
        Ok(summary)
    }

    /// Rebuild the consolidated cleaned dataset from every raw partition.
    async fn consolidate(&self) -> Result<()> {
        let keys = self.store.list_partitions().await?;
        let mut dataset = Vec::new();
        for key in &keys {
            let mut batch = self.store.read_partition(key).await?;
            dataset.append(&mut batch);
        }
        self.store.write_dataset(&dataset).await?;
        Ok(())
    }
}
