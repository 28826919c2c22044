//! Object Key Layout
//!
//! This module owns the string keys ScoreHouse writes into the blob store.
//!
//! ## Layout
//!
//! ```text
//! raw/year=YYYY/month=MM/day=DD/level=L/batch.json   ingested partition batches
//! processed/cleaned_dataset.json                     consolidated cleaned dataset
//! analytics/<identifier>/analysis_result.json        cached analysis snapshot
//! analytics/<identifier>/processed_data.json         summary table behind the snapshot
//! analytics/<identifier>/metadata.json               computed_at + ttl of the snapshot
//! ```
//!
//! Each partition holds exactly one `batch.json` object. A fixed object
//! name is what makes re-ingestion an idempotent overwrite instead of an
//! accumulation, and a single PUT is what makes the partition write atomic:
//! a reader sees the whole batch or none of it.

use scorehouse_core::PartitionKey;

pub const RAW_PREFIX: &str = "raw";
pub const BATCH_OBJECT: &str = "batch.json";
pub const DATASET_KEY: &str = "processed/cleaned_dataset.json";
pub const ANALYTICS_PREFIX: &str = "analytics";

/// Object key of a partition's batch
pub fn batch_key(key: &PartitionKey) -> String {
    format!("{RAW_PREFIX}/{}/{BATCH_OBJECT}", key.path())
}

/// Object key of an analytics snapshot member file
pub fn analytics_key(identifier: &str, name: &str) -> String {
    format!("{ANALYTICS_PREFIX}/{identifier}/{name}")
}

/// Recover the partition key from a listed batch object path.
///
/// Returns `None` for objects that are not canonical batch keys (foreign
/// files under `raw/` are ignored rather than treated as partitions).
pub fn parse_batch_key(object_path: &str) -> Option<PartitionKey> {
    let partition = object_path
        .strip_prefix(RAW_PREFIX)?
        .strip_prefix('/')?
        .strip_suffix(BATCH_OBJECT)?
        .strip_suffix('/')?;
    PartitionKey::parse(partition).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorehouse_core::Level;

    #[test]
    fn batch_key_round_trips() {
        let key = PartitionKey::new(2025, 8, 6, Level::Th).unwrap();
        let object = batch_key(&key);
        assert_eq!(object, "raw/year=2025/month=08/day=06/level=TH/batch.json");
        assert_eq!(parse_batch_key(&object), Some(key));
    }

    #[test]
    fn foreign_objects_are_ignored() {
        assert_eq!(parse_batch_key("raw/year=2025/month=08/day=06/level=TH/extra.json"), None);
        assert_eq!(parse_batch_key("processed/cleaned_dataset.json"), None);
        assert_eq!(parse_batch_key("raw/garbage/batch.json"), None);
    }
}
