//! Descriptive Aggregates
//!
//! Cheap summary statistics over a dataset slice. These back the uncached
//! stats surface (`stats/daily`, `stats/levels`, dataset summary) and the
//! per-group summary tables inside every analysis result. Unlike the
//! hypothesis tests they are always recomputed on demand.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scorehouse_core::{Level, Record};

/// Sample mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator); 0.0 below two samples.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sample variance (n-1 denominator); 0.0 below two samples.
pub fn variance(values: &[f64]) -> f64 {
    let sd = std_dev(values);
    sd * sd
}

/// Linear-interpolation percentile, `q` in [0, 1].
///
/// Matches the interpolation the original analysis notebook used, so the
/// 75th-percentile cut line lands on the same value.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Decade age bracket label: 27 → "20s", 41 → "40s".
pub fn age_bracket(age: u32) -> String {
    format!("{}s", (age / 10) * 10)
}

/// Descriptive overview of the current dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_respondents: usize,
    pub age_min: u32,
    pub age_max: u32,
    pub age_mean: f64,
    pub mean_total_score: f64,
    pub level_distribution: BTreeMap<String, usize>,
    pub region_distribution: BTreeMap<String, usize>,
}

/// Per-day aggregate for the daily stats surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub respondents: usize,
    pub mean_total_score: f64,
}

/// Per-level aggregate for the level stats surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelStat {
    pub level: Level,
    pub respondents: usize,
    pub mean_total_score: f64,
    pub std_dev_total_score: f64,
}

/// Build the dataset overview.
pub fn summarize(records: &[Record]) -> DatasetSummary {
    let totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();
    let mut levels = BTreeMap::new();
    let mut regions = BTreeMap::new();
    for r in records {
        *levels.entry(r.level.to_string()).or_insert(0) += 1;
        *regions.entry(r.region.clone()).or_insert(0) += 1;
    }

    DatasetSummary {
        total_respondents: records.len(),
        age_min: records.iter().map(|r| r.age).min().unwrap_or(0),
        age_max: records.iter().map(|r| r.age).max().unwrap_or(0),
        age_mean: mean(&records.iter().map(|r| r.age as f64).collect::<Vec<_>>()),
        mean_total_score: mean(&totals),
        level_distribution: levels,
        region_distribution: regions,
    }
}

/// Per-day respondent counts and mean totals, ascending by date.
pub fn daily_stats(records: &[Record]) -> Vec<DailyStat> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for r in records {
        by_date.entry(r.date).or_default().push(r.total_score);
    }
    by_date
        .into_iter()
        .map(|(date, totals)| DailyStat {
            date,
            respondents: totals.len(),
            mean_total_score: mean(&totals),
        })
        .collect()
}

/// Per-level aggregates, ascending by level rank. Levels with no records
/// are omitted.
pub fn level_stats(records: &[Record]) -> Vec<LevelStat> {
    let mut by_level: BTreeMap<u8, (Level, Vec<f64>)> = BTreeMap::new();
    for r in records {
        by_level
            .entry(r.level.rank())
            .or_insert_with(|| (r.level, Vec::new()))
            .1
            .push(r.total_score);
    }
    by_level
        .into_values()
        .map(|(level, totals)| LevelStat {
            level,
            respondents: totals.len(),
            mean_total_score: mean(&totals),
            std_dev_total_score: std_dev(&totals),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorehouse_core::SubScores;

    fn record(date: (i32, u32, u32), level: Level, age: u32, total: f64) -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            level,
            age,
            "seoul",
            "engineer",
            SubScores {
                task_completion: total / 4.0,
                delivery: total / 4.0,
                accuracy: total / 4.0,
                appropriateness: total / 4.0,
            },
        )
    }

    #[test]
    fn mean_and_std_dev_basics() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[5.0]), 0.0);
        // sample std of 1..5 is sqrt(2.5)
        assert!((std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 2.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 4.0);
        assert_eq!(percentile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn age_bracket_bins_by_decade() {
        assert_eq!(age_bracket(24), "20s");
        assert_eq!(age_bracket(29), "20s");
        assert_eq!(age_bracket(30), "30s");
        assert_eq!(age_bracket(57), "50s");
    }

    #[test]
    fn daily_stats_group_by_date_in_order() {
        let records = vec![
            record((2025, 8, 6), Level::Th, 30, 60.0),
            record((2025, 8, 5), Level::Ig, 25, 40.0),
            record((2025, 8, 6), Level::Na, 35, 80.0),
        ];
        let daily = daily_stats(&records);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
        assert_eq!(daily[0].respondents, 1);
        assert_eq!(daily[1].respondents, 2);
        assert!((daily[1].mean_total_score - 70.0).abs() < 1e-12);
    }

    #[test]
    fn level_stats_order_by_rank() {
        let records = vec![
            record((2025, 8, 6), Level::Na, 30, 80.0),
            record((2025, 8, 6), Level::Ig, 25, 40.0),
            record((2025, 8, 6), Level::Ig, 28, 44.0),
        ];
        let levels = level_stats(&records);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level, Level::Ig);
        assert_eq!(levels[0].respondents, 2);
        assert!((levels[0].mean_total_score - 42.0).abs() < 1e-12);
        assert_eq!(levels[1].level, Level::Na);
    }

    #[test]
    fn summarize_covers_distributions() {
        let records = vec![
            record((2025, 8, 6), Level::Th, 24, 60.0),
            record((2025, 8, 6), Level::Th, 36, 70.0),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_respondents, 2);
        assert_eq!(summary.age_min, 24);
        assert_eq!(summary.age_max, 36);
        assert_eq!(summary.level_distribution["TH"], 2);
        assert_eq!(summary.region_distribution["seoul"], 2);
    }
}
