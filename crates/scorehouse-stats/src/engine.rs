//! Hypothesis Engine
//!
//! This module computes the named hypothesis tests over a dataset slice.
//!
//! ## Analyses
//!
//! | Identifier            | Grouping          | Test                     | Effect size |
//! |-----------------------|-------------------|--------------------------|-------------|
//! | `age-performance`     | decade brackets   | Pearson correlation      | r           |
//! | `regional-gap`        | capital / non-cap | Welch two-sample t-test  | Cohen's d   |
//! | `occupation-analysis` | occupation        | one-way ANOVA            | eta-squared |
//!
//! ## Compute Flow
//!
//! ```text
//! compute(identifier, dataset)
//!     ↓
//! bucket records (unmapped values → "unknown", never dropped)
//!     ↓
//! filter groups below the minimum sample size
//!     ↓ fewer than two eligible groups?
//! InsufficientData ──────────────► caller (never cached)
//!     ↓
//! run the test, derive p-value + effect size
//!     ↓
//! AnalysisResult { conclusion, summary_stats over ALL groups, chart data }
//! ```
//!
//! Excluded groups stay in `summary_stats` with their counts, so a reader
//! can always see what the test did not consider.

use std::collections::BTreeMap;

use chrono::Utc;

use scorehouse_core::Record;

use crate::describe::{age_bracket, mean, percentile, std_dev, variance};
use crate::dist::{f_sf, students_t_two_tailed};
use crate::error::{Error, Result};
use crate::result::{
    AnalysisData, AnalysisId, AnalysisResult, Conclusion, GroupSummary, ScoreStat,
    VisualizationData,
};

/// Variance below this is treated as exactly zero
const EPS: f64 = 1e-12;

/// Group labels for the regional buckets
pub const CAPITAL: &str = "capital";
pub const NON_CAPITAL: &str = "non-capital";
pub const UNKNOWN_GROUP: &str = "unknown";

/// Regions counted as the capital area
const CAPITAL_REGIONS: [&str; 3] = ["seoul", "gyeonggi", "incheon"];

/// Tuning knobs for the hypothesis tests
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Significance threshold for accepting a hypothesis
    pub significance: f64,
    /// Minimum records for a correlation to be meaningful
    pub min_correlation_samples: usize,
    /// Minimum group size for variance-based tests (t-test, ANOVA)
    pub min_group_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            min_correlation_samples: 5,
            min_group_samples: 2,
        }
    }
}

/// Computes hypothesis tests over dataset slices
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the analysis selected by `id` over `records`.
    ///
    /// # Errors
    ///
    /// `InsufficientData` when fewer than two eligible groups (or fewer
    /// than the minimum correlation sample) remain.
    pub fn compute(&self, id: AnalysisId, records: &[Record]) -> Result<AnalysisResult> {
        let result = match id {
            AnalysisId::AgePerformance => self.age_performance(records),
            AnalysisId::RegionalGap => self.regional_gap(records),
            AnalysisId::OccupationAnalysis => self.occupation_analysis(records),
        }?;

        tracing::debug!(
            identifier = %id,
            records = records.len(),
            p_value = result.p_value,
            conclusion = ?result.conclusion,
            "Computed analysis"
        );
        Ok(result)
    }

    /// Pearson correlation between raw age and total score, with decade
    /// bracket summaries.
    pub fn age_performance(&self, records: &[Record]) -> Result<AnalysisResult> {
        let id = AnalysisId::AgePerformance;
        if records.len() < self.config.min_correlation_samples {
            return Err(Error::insufficient(
                id.as_str(),
                format!(
                    "{} records, need at least {}",
                    records.len(),
                    self.config.min_correlation_samples
                ),
            ));
        }

        let ages: Vec<f64> = records.iter().map(|r| r.age as f64).collect();
        let totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();
        let r = pearson_r(&ages, &totals).ok_or_else(|| {
            Error::insufficient(id.as_str(), "zero variance in age or total score")
        })?;

        let n = records.len() as f64;
        let p_value = if 1.0 - r * r <= EPS {
            0.0
        } else {
            let t = r * ((n - 2.0) / (1.0 - r * r)).sqrt();
            students_t_two_tailed(t, n - 2.0)
        };

        let mut brackets: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
        for record in records {
            brackets
                .entry(age_bracket(record.age))
                .or_default()
                .push(record);
        }
        let summary_stats = brackets
            .into_iter()
            .map(|(label, group)| (label, group_summary(&group, true)))
            .collect();

        let points = records
            .iter()
            .map(|r| [r.age as f64, r.total_score])
            .collect();

        Ok(self.finish(
            id,
            "Pearson correlation",
            p_value,
            r,
            summary_stats,
            VisualizationData::Scatter {
                x_label: "age".to_string(),
                y_label: "total_score".to_string(),
                points,
            },
        ))
    }

    /// Welch t-test of total score between the capital and non-capital
    /// buckets, with top-quartile shares per bucket.
    pub fn regional_gap(&self, records: &[Record]) -> Result<AnalysisResult> {
        let id = AnalysisId::RegionalGap;

        let mut buckets: BTreeMap<&'static str, Vec<&Record>> = BTreeMap::new();
        for record in records {
            buckets.entry(region_bucket(&record.region)).or_default().push(record);
        }

        let capital: Vec<f64> = totals(buckets.get(CAPITAL));
        let non_capital: Vec<f64> = totals(buckets.get(NON_CAPITAL));

        let min = self.config.min_group_samples;
        if capital.len() < min || non_capital.len() < min {
            return Err(Error::insufficient(
                id.as_str(),
                format!(
                    "capital={} non-capital={} records, need at least {min} each",
                    capital.len(),
                    non_capital.len()
                ),
            ));
        }

        let (t, df) = welch_t(&capital, &non_capital);
        let p_value = if t.is_infinite() {
            0.0
        } else {
            students_t_two_tailed(t, df)
        };
        let effect_size = cohens_d(&capital, &non_capital);

        // Quartile cut over the whole slice, unknown bucket included
        let all_totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();
        let p75 = percentile(&all_totals, 0.75);

        let mut summary_stats = BTreeMap::new();
        let mut box_groups = BTreeMap::new();
        for (label, group) in &buckets {
            let group_totals: Vec<f64> = group.iter().map(|r| r.total_score).collect();
            let share =
                group_totals.iter().filter(|&&v| v >= p75).count() as f64 / group.len() as f64;
            let mut summary = group_summary(group, false);
            summary.top_quartile_share = Some(share);
            summary_stats.insert(label.to_string(), summary);
            box_groups.insert(label.to_string(), group_totals);
        }

        Ok(self.finish(
            id,
            "Welch two-sample t-test",
            p_value,
            effect_size,
            summary_stats,
            VisualizationData::GroupedBox { groups: box_groups },
        ))
    }

    /// One-way ANOVA of total score across occupation groups.
    pub fn occupation_analysis(&self, records: &[Record]) -> Result<AnalysisResult> {
        let id = AnalysisId::OccupationAnalysis;

        let mut groups: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
        for record in records {
            let label = if record.occupation.is_empty() {
                UNKNOWN_GROUP.to_string()
            } else {
                record.occupation.clone()
            };
            groups.entry(label).or_default().push(record);
        }

        let eligible: Vec<Vec<f64>> = groups
            .values()
            .filter(|g| g.len() >= self.config.min_group_samples)
            .map(|g| g.iter().map(|r| r.total_score).collect())
            .collect();

        if eligible.len() < 2 {
            return Err(Error::insufficient(
                id.as_str(),
                format!(
                    "{} groups with at least {} records, need at least 2",
                    eligible.len(),
                    self.config.min_group_samples
                ),
            ));
        }

        let (p_value, eta_squared) = one_way_anova(&eligible);

        let mut summary_stats = BTreeMap::new();
        let mut bar_groups = BTreeMap::new();
        for (label, group) in &groups {
            let summary = group_summary(group, true);
            bar_groups.insert(label.clone(), summary.mean);
            summary_stats.insert(label.clone(), summary);
        }

        Ok(self.finish(
            id,
            "One-way ANOVA",
            p_value,
            eta_squared,
            summary_stats,
            VisualizationData::GroupedBar { groups: bar_groups },
        ))
    }

    fn finish(
        &self,
        id: AnalysisId,
        test: &str,
        p_value: f64,
        effect_size: f64,
        summary_stats: BTreeMap<String, GroupSummary>,
        visualization_data: VisualizationData,
    ) -> AnalysisResult {
        let conclusion = if p_value < self.config.significance {
            Conclusion::Accepted
        } else {
            Conclusion::Rejected
        };

        AnalysisResult {
            hypothesis: id.hypothesis().to_string(),
            statistical_test: test.to_string(),
            p_value,
            conclusion,
            effect_size,
            data: AnalysisData {
                summary_stats,
                visualization_data,
            },
            computed_at: Utc::now(),
        }
    }
}

/// Regional bucket of a respondent. Unmapped or empty regions route to the
/// explicit `unknown` bucket.
pub fn region_bucket(region: &str) -> &'static str {
    let region = region.trim();
    if region.is_empty() {
        return UNKNOWN_GROUP;
    }
    let lower = region.to_lowercase();
    if CAPITAL_REGIONS.iter().any(|area| lower.contains(area)) {
        CAPITAL
    } else {
        NON_CAPITAL
    }
}

fn totals(group: Option<&Vec<&Record>>) -> Vec<f64> {
    group
        .map(|g| g.iter().map(|r| r.total_score).collect())
        .unwrap_or_default()
}

fn group_summary(group: &[&Record], with_sub_scores: bool) -> GroupSummary {
    let group_totals: Vec<f64> = group.iter().map(|r| r.total_score).collect();
    let mut summary = GroupSummary::new(mean(&group_totals), std_dev(&group_totals), group.len());

    if with_sub_scores {
        let mut per_score: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in group {
            for (name, value) in record.scores.named() {
                per_score.entry(name.to_string()).or_default().push(value);
            }
        }
        summary.sub_scores = per_score
            .into_iter()
            .map(|(name, values)| {
                (
                    name,
                    ScoreStat {
                        mean: mean(&values),
                        std_dev: std_dev(&values),
                    },
                )
            })
            .collect();
    }
    summary
}

/// Pearson correlation coefficient, or `None` when either side has zero
/// variance.
pub fn pearson_r(xs: &[f64], ys: &[f64]) -> Option<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut ssx = 0.0;
    let mut ssy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        ssx += (x - mx) * (x - mx);
        ssy += (y - my) * (y - my);
    }

    let denom = (ssx * ssy).sqrt();
    if denom <= EPS {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Welch's t statistic and its Welch-Satterthwaite degrees of freedom.
///
/// Degenerate inputs (both groups constant) yield `t = 0` when the means
/// agree and `t = inf` when they differ; the caller maps those to p = 1
/// and p = 0.
pub fn welch_t(a: &[f64], b: &[f64]) -> (f64, f64) {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (mean(a), mean(b));
    let sea = variance(a) / na;
    let seb = variance(b) / nb;
    let se2 = sea + seb;

    if se2 <= EPS {
        let t = if (ma - mb).abs() <= EPS {
            0.0
        } else {
            f64::INFINITY
        };
        return (t, na + nb - 2.0);
    }

    let t = (ma - mb) / se2.sqrt();
    let df = se2 * se2 / (sea * sea / (na - 1.0) + seb * seb / (nb - 1.0));
    (t, df)
}

/// Cohen's d with pooled standard deviation; 0 when both groups are
/// constant.
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let pooled = (((na - 1.0) * variance(a) + (nb - 1.0) * variance(b)) / (na + nb - 2.0)).sqrt();
    if pooled <= EPS {
        0.0
    } else {
        (mean(a) - mean(b)) / pooled
    }
}

/// One-way ANOVA over the eligible groups: (p-value, eta-squared).
pub fn one_way_anova(groups: &[Vec<f64>]) -> (f64, f64) {
    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    let k = groups.len();
    let grand: f64 =
        groups.iter().flatten().sum::<f64>() / n_total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let m = mean(group);
        ss_between += group.len() as f64 * (m - grand) * (m - grand);
        ss_within += group.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    }

    // Degenerate layouts first: no between-group spread means nothing to
    // detect; no within-group spread with distinct means is a perfect
    // separation.
    if ss_between <= EPS {
        return (1.0, 0.0);
    }
    if ss_within <= EPS {
        return (0.0, 1.0);
    }

    let df1 = (k - 1) as f64;
    let df2 = (n_total - k) as f64;
    let f = (ss_between / df1) / (ss_within / df2);
    let p = f_sf(f, df1, df2);
    let eta_squared = ss_between / (ss_between + ss_within);
    (p, eta_squared)
}
