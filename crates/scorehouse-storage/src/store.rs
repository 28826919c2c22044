//! Record Store
//!
//! This module implements the partitioned record store - the component that
//! persists survey records to S3-compatible object storage and reads them
//! back for analysis.
//!
//! ## Responsibilities
//!
//! - **Partition writes**: One atomic PUT per `(date, level)` partition.
//!   Re-writing a key overwrites the prior batch, so re-running ingestion
//!   for an already-processed date is safe.
//! - **Partition reads**: Enumerate partition keys by listing the `raw/`
//!   prefix, then fetch batches lazily through `PartitionCursor`.
//! - **Consolidated dataset**: The cleaned corpus under
//!   `processed/cleaned_dataset.json`, the default universe for analyses
//!   with no explicit date range.
//! - **Analytics snapshots**: The externally visible mirror of cached
//!   analysis results under `analytics/<identifier>/`.
//!
//! ## Write Flow
//!
//! ```text
//! write_partition(key, records)
//!     ↓
//! serialize batch to JSON
//!     ↓
//! PUT raw/year=../month=../day=../level=../batch.json
//!     ↓ transient failure?
//! retry with exponential backoff (3 attempts)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use scorehouse_storage::RecordStore;
//! use object_store::memory::InMemory;
//!
//! let store = RecordStore::new(Arc::new(InMemory::new()));
//! store.write_partition(&key, &records).await?;
//!
//! let mut cursor = store.read_partitions(range, None).await?;
//! while let Some((key, batch)) = cursor.next_partition().await? {
//!     println!("{key}: {} records", batch.len());
//! }
//! ```

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{path::Path, ObjectStore};
use std::sync::Arc;
use std::time::Duration;

use scorehouse_core::{DateRange, Level, PartitionKey, Record};

use crate::error::{Error, Result};
use crate::layout;

/// How many times a PUT is attempted before the failure propagates
const PUT_ATTEMPTS: u32 = 3;
/// Base backoff between PUT attempts; doubles per attempt
const PUT_BACKOFF: Duration = Duration::from_millis(100);

/// Partitioned record store over a blob interface
pub struct RecordStore {
    object_store: Arc<dyn ObjectStore>,
}

impl RecordStore {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }

    /// Persist a batch under its partition key.
    ///
    /// The whole batch lands in a single PUT, so concurrent readers observe
    /// either the previous batch or the new one, never a partial write.
    /// Re-invoking with the same key replaces the prior content.
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` after the transport has failed
    /// `PUT_ATTEMPTS` times.
    pub async fn write_partition(&self, key: &PartitionKey, records: &[Record]) -> Result<()> {
        let object_key = layout::batch_key(key);
        let body = serde_json::to_vec(records).map_err(|e| Error::CorruptObject {
            key: object_key.clone(),
            reason: e.to_string(),
        })?;

        self.put_with_retry(&object_key, Bytes::from(body)).await?;

        tracing::info!(
            partition = %key,
            records = records.len(),
            "Wrote partition batch"
        );
        Ok(())
    }

    /// Read one partition's batch.
    ///
    /// # Errors
    ///
    /// `PartitionUnavailable` when the key has no object behind it.
    pub async fn read_partition(&self, key: &PartitionKey) -> Result<Vec<Record>> {
        let object_key = layout::batch_key(key);
        self.get_records(&object_key).await
    }

    /// Enumerate partitions matching a date range and optional level
    /// filter, returning a lazy cursor over their batches.
    ///
    /// The key list is taken from storage at call time; a new call re-lists
    /// rather than resuming any in-memory position, so the cursor is
    /// restartable by construction.
    pub async fn read_partitions(
        &self,
        range: DateRange,
        level: Option<Level>,
    ) -> Result<PartitionCursor> {
        let mut keys = self.list_partitions().await?;
        keys.retain(|k| range.contains(k.date()) && level.map_or(true, |l| k.level == l));

        Ok(PartitionCursor {
            object_store: self.object_store.clone(),
            keys: keys.into_iter(),
        })
    }

    /// All partition keys currently present under the raw prefix, sorted.
    pub async fn list_partitions(&self) -> Result<Vec<PartitionKey>> {
        let prefix = Path::from(layout::RAW_PREFIX);
        let objects: Vec<_> = self
            .object_store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| Error::from_object_store(layout::RAW_PREFIX, e))?;

        let mut keys: Vec<PartitionKey> = objects
            .iter()
            .filter_map(|meta| layout::parse_batch_key(meta.location.as_ref()))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// The consolidated cleaned dataset.
    ///
    /// # Errors
    ///
    /// `PartitionUnavailable` when no dataset has been consolidated yet;
    /// callers that can start from nothing treat that as empty.
    pub async fn read_all(&self) -> Result<Vec<Record>> {
        self.get_records(layout::DATASET_KEY).await
    }

    /// Replace the consolidated cleaned dataset.
    pub async fn write_dataset(&self, records: &[Record]) -> Result<()> {
        let body = serde_json::to_vec(records).map_err(|e| Error::CorruptObject {
            key: layout::DATASET_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.put_with_retry(layout::DATASET_KEY, Bytes::from(body))
            .await?;

        tracing::info!(records = records.len(), "Consolidated cleaned dataset");
        Ok(())
    }

    /// Write one member object of an analytics snapshot.
    pub async fn write_analytics_object(
        &self,
        identifier: &str,
        name: &str,
        body: Bytes,
    ) -> Result<()> {
        let key = layout::analytics_key(identifier, name);
        self.put_with_retry(&key, body).await
    }

    /// Read one member object of an analytics snapshot.
    pub async fn read_analytics_object(&self, identifier: &str, name: &str) -> Result<Bytes> {
        let key = layout::analytics_key(identifier, name);
        self.get_bytes(&key).await
    }

    async fn get_records(&self, object_key: &str) -> Result<Vec<Record>> {
        let body = self.get_bytes(object_key).await?;
        serde_json::from_slice(&body).map_err(|e| Error::CorruptObject {
            key: object_key.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_bytes(&self, object_key: &str) -> Result<Bytes> {
        let path = Path::from(object_key);
        let result = self
            .object_store
            .get(&path)
            .await
            .map_err(|e| Error::from_object_store(object_key, e))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::from_object_store(object_key, e))
    }

    async fn put_with_retry(&self, object_key: &str, body: Bytes) -> Result<()> {
        let path = Path::from(object_key);
        let mut last_err = None;

        for attempt in 0..PUT_ATTEMPTS {
            match self.object_store.put(&path, body.clone()).await {
                Ok(_) => {
                    tracing::debug!(
                        key = %object_key,
                        size = body.len(),
                        attempt = attempt + 1,
                        "Uploaded object"
                    );
                    return Ok(());
                }
                Err(e) if attempt + 1 < PUT_ATTEMPTS => {
                    let backoff = PUT_BACKOFF * 2_u32.pow(attempt);
                    tracing::warn!(
                        key = %object_key,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Object upload failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    last_err = Some(e);
                }
                Err(e) => {
                    last_err = Some(e);
                    break;
                }
            }
        }

        Err(Error::StorageUnavailable(
            last_err.expect("retry loop exits with an error"),
        ))
    }
}

/// Lazy cursor over the batches of matching partitions.
///
/// Each `next_partition()` call performs one storage GET; nothing is
/// buffered ahead. Dropping the cursor early costs nothing.
pub struct PartitionCursor {
    object_store: Arc<dyn ObjectStore>,
    keys: std::vec::IntoIter<PartitionKey>,
}

impl PartitionCursor {
    /// Fetch the next matching partition's batch, or `None` when the scan
    /// is exhausted.
    ///
    /// A partition that was listed but deleted before the fetch surfaces as
    /// `PartitionUnavailable`.
    pub async fn next_partition(&mut self) -> Result<Option<(PartitionKey, Vec<Record>)>> {
        let Some(key) = self.keys.next() else {
            return Ok(None);
        };

        let object_key = layout::batch_key(&key);
        let path = Path::from(object_key.as_str());
        let result = self
            .object_store
            .get(&path)
            .await
            .map_err(|e| Error::from_object_store(&object_key, e))?;
        let body = result
            .bytes()
            .await
            .map_err(|e| Error::from_object_store(&object_key, e))?;

        let records: Vec<Record> =
            serde_json::from_slice(&body).map_err(|e| Error::CorruptObject {
                key: object_key,
                reason: e.to_string(),
            })?;
        Ok(Some((key, records)))
    }

    /// Drain the cursor into a flat record list.
    pub async fn collect_records(mut self) -> Result<Vec<Record>> {
        let mut all = Vec::new();
        while let Some((_, mut batch)) = self.next_partition().await? {
            all.append(&mut batch);
        }
        Ok(all)
    }

    /// Partitions remaining to be fetched
    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}
