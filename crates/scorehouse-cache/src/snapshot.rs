//! Analytics Snapshot Mirror
//!
//! Every successful cache refresh is mirrored to the blob store so
//! external consumers (dashboards, downstream jobs) can read the latest
//! result without going through the service:
//!
//! ```text
//! analytics/<identifier>/analysis_result.json   full AnalysisResult
//! analytics/<identifier>/processed_data.json    summary table only
//! analytics/<identifier>/metadata.json          computed_at + ttl
//! ```
//!
//! The mirror is advisory: the in-memory cache is authoritative and a
//! failed snapshot upload never fails the `get` that produced the result.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scorehouse_stats::{AnalysisId, AnalysisResult};
use scorehouse_storage::RecordStore;

use crate::error::Result;

pub const RESULT_OBJECT: &str = "analysis_result.json";
pub const PROCESSED_OBJECT: &str = "processed_data.json";
pub const METADATA_OBJECT: &str = "metadata.json";

/// Sidecar describing a snapshot's freshness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub identifier: AnalysisId,
    pub computed_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

/// Upload the three snapshot members for one refreshed result.
pub async fn write(
    store: &RecordStore,
    id: AnalysisId,
    result: &AnalysisResult,
    ttl: Duration,
) -> Result<()> {
    let identifier = id.as_str();

    let body = serde_json::to_vec_pretty(result).expect("analysis result serializes");
    store
        .write_analytics_object(identifier, RESULT_OBJECT, Bytes::from(body))
        .await?;

    let processed = serde_json::to_vec_pretty(&result.data.summary_stats)
        .expect("summary stats serialize");
    store
        .write_analytics_object(identifier, PROCESSED_OBJECT, Bytes::from(processed))
        .await?;

    let metadata = SnapshotMetadata {
        identifier: id,
        computed_at: result.computed_at,
        ttl_secs: ttl.as_secs(),
    };
    let body = serde_json::to_vec_pretty(&metadata).expect("snapshot metadata serializes");
    store
        .write_analytics_object(identifier, METADATA_OBJECT, Bytes::from(body))
        .await?;

    tracing::debug!(identifier, "Mirrored analysis snapshot");
    Ok(())
}

/// Read back a mirrored result (external consumers' view).
pub async fn read(store: &RecordStore, id: AnalysisId) -> Result<AnalysisResult> {
    let body = store
        .read_analytics_object(id.as_str(), RESULT_OBJECT)
        .await?;
    let result = serde_json::from_slice(&body).map_err(|e| {
        scorehouse_storage::Error::CorruptObject {
            key: format!("analytics/{}/{RESULT_OBJECT}", id.as_str()),
            reason: e.to_string(),
        }
    })?;
    Ok(result)
}
