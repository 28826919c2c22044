//! End-to-end pipeline tests: ingestion through the orchestrator, cache
//! invalidation, and the service surface, all over an in-memory object
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use object_store::memory::InMemory;

use scorehouse_cache::{CacheConfig, CacheState};
use scorehouse_pipeline::{RawBlob, RawRecordSource, Result, SurveyService};
use scorehouse_stats::{AnalysisId, Conclusion, EngineConfig};

/// Source backed by a fixed date → blobs map
struct MemorySource {
    blobs: HashMap<NaiveDate, Vec<RawBlob>>,
}

#[async_trait]
impl RawRecordSource for MemorySource {
    async fn fetch(&self, date: NaiveDate) -> Result<Vec<RawBlob>> {
        Ok(self.blobs.get(&date).cloned().unwrap_or_default())
    }
}

fn raw_blob(date: &str, age: u32, region: &str, occupation: &str, level: &str, base: f64) -> RawBlob {
    let body = format!(
        r#"{{
            "metadata": {{ "date": "{date}" }},
            "respondent": {{
                "age": {age},
                "region": "{region}",
                "occupation": "{occupation}",
                "level": "{level}",
                "scores": {{
                    "task_completion": {a},
                    "delivery": {b},
                    "accuracy": {c},
                    "appropriateness": {d}
                }}
            }}
        }}"#,
        a = base,
        b = base + 0.5,
        c = base + 1.0,
        d = base + 1.5,
    );
    RawBlob {
        name: format!("{date}-{age}-{region}.json"),
        body: Bytes::from(body),
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A day's worth of blobs spread across regions, occupations and levels
fn standard_blobs(date: &str) -> Vec<RawBlob> {
    vec![
        raw_blob(date, 22, "seoul", "engineer", "TH", 10.0),
        raw_blob(date, 26, "gyeonggi", "engineer", "TH", 12.0),
        raw_blob(date, 29, "incheon", "teacher", "TM", 13.0),
        raw_blob(date, 33, "busan", "teacher", "TM", 15.0),
        raw_blob(date, 37, "daegu", "nurse", "TL", 16.0),
        raw_blob(date, 41, "jeju", "nurse", "TL", 18.0),
        raw_blob(date, 45, "seoul", "clerk", "NA", 19.0),
        raw_blob(date, 49, "busan", "clerk", "IG", 21.0),
    ]
}

fn service_with(blobs: HashMap<NaiveDate, Vec<RawBlob>>) -> SurveyService<scorehouse_cache::EngineProvider> {
    SurveyService::new(
        Arc::new(InMemory::new()),
        Arc::new(MemorySource { blobs }),
        EngineConfig::default(),
        CacheConfig::default(),
    )
}

#[tokio::test]
async fn ingest_writes_partitions_and_consolidates() {
    let date = day(2025, 8, 6);
    let mut blobs = HashMap::new();
    blobs.insert(date, standard_blobs("20250806"));
    let service = service_with(blobs);

    let summary = service.ingest(date).await.unwrap();
    assert_eq!(summary.records_processed, 8);
    assert_eq!(summary.records_skipped, 0);
    // One partition per distinct (date, level): TH, TM, TL, NA, IG
    assert_eq!(summary.partitions_written, 5);
    assert_eq!(summary.invalidated.len(), 3);

    let dataset = service.store().read_all().await.unwrap();
    assert_eq!(dataset.len(), 8);
}

#[tokio::test]
async fn zero_record_date_is_a_successful_run() {
    let service = service_with(HashMap::new());
    let summary = service.ingest(day(2025, 8, 6)).await.unwrap();
    assert_eq!(summary.records_processed, 0);
    assert_eq!(summary.partitions_written, 0);
    assert!(summary.invalidated.is_empty());
}

#[tokio::test]
async fn malformed_and_mismatched_records_are_skipped_not_fatal() {
    let date = day(2025, 8, 6);
    let mut day_blobs = standard_blobs("20250806");
    day_blobs.push(RawBlob {
        name: "broken.json".to_string(),
        body: Bytes::from_static(b"{ not json"),
    });
    // Valid record, wrong date
    day_blobs.push(raw_blob("20250807", 30, "seoul", "engineer", "TH", 14.0));
    // Valid JSON, impossible date
    day_blobs.push(raw_blob("20251345", 30, "seoul", "engineer", "TH", 14.0));

    let mut blobs = HashMap::new();
    blobs.insert(date, day_blobs);
    let service = service_with(blobs);

    let summary = service.ingest(date).await.unwrap();
    assert_eq!(summary.records_processed, 8);
    assert_eq!(summary.records_skipped, 3);
}

#[tokio::test]
async fn reingesting_a_date_overwrites_instead_of_accumulating() {
    let date = day(2025, 8, 6);
    let mut blobs = HashMap::new();
    blobs.insert(date, standard_blobs("20250806"));
    let service = service_with(blobs);

    service.ingest(date).await.unwrap();
    service.ingest(date).await.unwrap();

    let dataset = service.store().read_all().await.unwrap();
    assert_eq!(dataset.len(), 8, "idempotent re-ingestion must not duplicate");
}

#[tokio::test]
async fn ingestion_invalidates_cached_analyses() {
    let date = day(2025, 8, 6);
    let mut blobs = HashMap::new();
    blobs.insert(date, standard_blobs("20250806"));
    blobs.insert(day(2025, 8, 7), standard_blobs("20250807"));
    let service = service_with(blobs);

    service.ingest(date).await.unwrap();
    service.analysis(AnalysisId::AgePerformance).await.unwrap();
    assert_eq!(
        service.cache().state(AnalysisId::AgePerformance).await,
        CacheState::Fresh
    );

    service.ingest(day(2025, 8, 7)).await.unwrap();
    assert_eq!(
        service.cache().state(AnalysisId::AgePerformance).await,
        CacheState::Empty
    );

    // Next read recomputes over the enlarged dataset
    let result = service.analysis(AnalysisId::AgePerformance).await.unwrap();
    let total_count: usize = result.data.summary_stats.values().map(|g| g.count).sum();
    assert_eq!(total_count, 16);
}

#[tokio::test]
async fn analyses_run_after_ingestion() {
    let date = day(2025, 8, 6);
    let mut blobs = HashMap::new();
    blobs.insert(date, standard_blobs("20250806"));
    let service = service_with(blobs);
    service.ingest(date).await.unwrap();

    // Ages and totals rise together in the fixture
    let age = service.analysis(AnalysisId::AgePerformance).await.unwrap();
    assert!(age.effect_size > 0.9);
    assert_eq!(age.conclusion, Conclusion::Accepted);

    let regional = service.analysis(AnalysisId::RegionalGap).await.unwrap();
    assert_eq!(regional.data.summary_stats["capital"].count, 4);
    assert_eq!(regional.data.summary_stats["non-capital"].count, 4);

    let occupation = service
        .analysis(AnalysisId::OccupationAnalysis)
        .await
        .unwrap();
    assert_eq!(occupation.data.summary_stats.len(), 4);
}

#[tokio::test]
async fn analysis_snapshot_is_mirrored_to_analytics_prefix() {
    let date = day(2025, 8, 6);
    let mut blobs = HashMap::new();
    blobs.insert(date, standard_blobs("20250806"));
    let service = service_with(blobs);
    service.ingest(date).await.unwrap();

    let served = service.analysis(AnalysisId::RegionalGap).await.unwrap();
    let mirrored = scorehouse_cache::snapshot::read(service.store(), AnalysisId::RegionalGap)
        .await
        .unwrap();
    assert_eq!(mirrored, served);

    let metadata = service
        .store()
        .read_analytics_object("regional-gap", "metadata.json")
        .await
        .unwrap();
    let metadata: serde_json::Value = serde_json::from_slice(&metadata).unwrap();
    assert_eq!(metadata["identifier"], "regional-gap");
    assert_eq!(metadata["ttl_secs"], 24 * 60 * 60);
}

#[tokio::test]
async fn stats_surfaces_are_recomputed_from_the_dataset() {
    let mut blobs = HashMap::new();
    blobs.insert(day(2025, 8, 6), standard_blobs("20250806"));
    blobs.insert(day(2025, 8, 7), standard_blobs("20250807"));
    let service = service_with(blobs);

    // Empty dataset → empty aggregates, no error
    assert!(service.daily_stats().await.unwrap().is_empty());
    assert_eq!(service.summary().await.unwrap().total_respondents, 0);

    service.ingest(day(2025, 8, 6)).await.unwrap();
    service.ingest(day(2025, 8, 7)).await.unwrap();

    let daily = service.daily_stats().await.unwrap();
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].respondents, 8);

    let levels = service.level_stats().await.unwrap();
    assert_eq!(levels.len(), 5);

    let summary = service.summary().await.unwrap();
    assert_eq!(summary.total_respondents, 16);
    assert_eq!(summary.age_min, 22);
    assert_eq!(summary.age_max, 49);
}
