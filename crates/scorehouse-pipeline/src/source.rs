//! Raw Record Sources
//!
//! Ingestion pulls raw survey blobs from wherever the collector dropped
//! them. The orchestrator only needs "give me every blob whose metadata
//! date matches D" - it does its own parsing and per-record recovery - so
//! sources return opaque bytes.
//!
//! Two implementations:
//!
//! - `LocalDirSource`: scans `<root>/<LEVEL>/<participant>/*.json`, the
//!   layout the survey collector writes to disk. Every file is opened and
//!   its `metadata.date` compared against the requested date; unreadable
//!   files are skipped with a warning.
//! - `ObjectSource`: reads a landing prefix on the blob store, one
//!   directory per compact date (`<prefix>/YYYYMMDD/...`).

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::{path::Path as ObjectPath, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};

/// One raw blob as the collector produced it
#[derive(Debug, Clone)]
pub struct RawBlob {
    /// Source-relative name, used only for logging
    pub name: String,
    pub body: Bytes,
}

/// Supplies raw survey blobs for a requested date
#[async_trait]
pub trait RawRecordSource: Send + Sync {
    /// Every blob whose metadata date equals `date`. An empty result is
    /// the normal "nothing collected that day" outcome, not an error.
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawBlob>>;
}

/// Collector drop directory on the local filesystem
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl RawRecordSource for LocalDirSource {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawBlob>> {
        let wanted = date.format("%Y%m%d").to_string();
        let mut blobs = Vec::new();

        let mut level_dirs = match tokio::fs::read_dir(&self.root).await {
            Ok(dirs) => dirs,
            Err(e) => return Err(Error::Source(format!("cannot read {:?}: {e}", self.root))),
        };

        while let Some(level_dir) = level_dirs
            .next_entry()
            .await
            .map_err(|e| Error::Source(e.to_string()))?
        {
            if !level_dir
                .file_type()
                .await
                .map_err(|e| Error::Source(e.to_string()))?
                .is_dir()
            {
                continue;
            }

            let mut participant_dirs = tokio::fs::read_dir(level_dir.path())
                .await
                .map_err(|e| Error::Source(e.to_string()))?;
            while let Some(participant) = participant_dirs
                .next_entry()
                .await
                .map_err(|e| Error::Source(e.to_string()))?
            {
                if !participant
                    .file_type()
                    .await
                    .map_err(|e| Error::Source(e.to_string()))?
                    .is_dir()
                {
                    continue;
                }

                let mut files = tokio::fs::read_dir(participant.path())
                    .await
                    .map_err(|e| Error::Source(e.to_string()))?;
                while let Some(file) = files
                    .next_entry()
                    .await
                    .map_err(|e| Error::Source(e.to_string()))?
                {
                    let path = file.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }

                    let body = match tokio::fs::read(&path).await {
                        Ok(body) => body,
                        Err(e) => {
                            tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable raw file");
                            continue;
                        }
                    };

                    if blob_date(&body).as_deref() == Some(wanted.as_str()) {
                        blobs.push(RawBlob {
                            name: path.display().to_string(),
                            body: Bytes::from(body),
                        });
                    }
                }
            }
        }

        tracing::info!(date = %date, blobs = blobs.len(), "Scanned raw drop directory");
        Ok(blobs)
    }
}

/// Landing prefix on the blob store, one directory per compact date
pub struct ObjectSource {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ObjectSource {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl RawRecordSource for ObjectSource {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawBlob>> {
        let day_prefix = format!("{}/{}", self.prefix, date.format("%Y%m%d"));
        let prefix = ObjectPath::from(day_prefix.as_str());

        let objects: Vec<_> = self
            .store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| Error::Source(e.to_string()))?;

        let mut blobs = Vec::with_capacity(objects.len());
        for meta in objects {
            let body = self
                .store
                .get(&meta.location)
                .await
                .map_err(|e| Error::Source(e.to_string()))?
                .bytes()
                .await
                .map_err(|e| Error::Source(e.to_string()))?;
            blobs.push(RawBlob {
                name: meta.location.to_string(),
                body,
            });
        }

        tracing::info!(date = %date, blobs = blobs.len(), "Listed raw landing prefix");
        Ok(blobs)
    }
}

/// Peek at `metadata.date` without committing to the full record shape.
fn blob_date(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("metadata")?
        .get("date")?
        .as_str()
        .map(str::to_string)
}
