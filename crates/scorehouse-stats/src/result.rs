//! Analysis Result Model
//!
//! This module defines the structured result every hypothesis test
//! produces, and the identifier enum that selects which test runs.
//!
//! ## Serialized Shape
//!
//! A result serializes the way the dashboard consumes it:
//!
//! ```json
//! {
//!   "hypothesis": "Capital-region respondents score higher",
//!   "statistical_test": "Welch two-sample t-test",
//!   "p_value": 0.012,
//!   "conclusion": "accepted",
//!   "effect_size": 0.41,
//!   "data": {
//!     "summary_stats": { "capital": { "mean": 71.2, "std_dev": 4.1, "count": 182 } },
//!     "visualization_data": { "chart_type": "grouped_box", "groups": { "capital": [70.5] } }
//!   },
//!   "computed_at": "2025-08-06T09:00:00Z"
//! }
//! ```
//!
//! `summary_stats` always covers the full group universe for the
//! identifier: small groups and the `unknown` bucket stay visible with
//! their counts even when the test excluded them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Selects a hypothesis test and its grouping attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisId {
    #[serde(rename = "age-performance")]
    AgePerformance,
    #[serde(rename = "regional-gap")]
    RegionalGap,
    #[serde(rename = "occupation-analysis")]
    OccupationAnalysis,
}

impl AnalysisId {
    pub const ALL: [AnalysisId; 3] = [
        AnalysisId::AgePerformance,
        AnalysisId::RegionalGap,
        AnalysisId::OccupationAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisId::AgePerformance => "age-performance",
            AnalysisId::RegionalGap => "regional-gap",
            AnalysisId::OccupationAnalysis => "occupation-analysis",
        }
    }

    /// The null hypothesis each analysis challenges, phrased positively.
    pub fn hypothesis(&self) -> &'static str {
        match self {
            AnalysisId::AgePerformance => "Age correlates with overall performance",
            AnalysisId::RegionalGap => "Capital-region respondents score higher",
            AnalysisId::OccupationAnalysis => "Overall performance differs across occupations",
        }
    }
}

impl std::str::FromStr for AnalysisId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age-performance" => Ok(AnalysisId::AgePerformance),
            "regional-gap" => Ok(AnalysisId::RegionalGap),
            "occupation-analysis" => Ok(AnalysisId::OccupationAnalysis),
            other => Err(format!("unknown analysis identifier: {other:?}")),
        }
    }
}

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict at the fixed significance threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Accepted,
    Rejected,
}

/// Mean/spread of one sub-score within a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStat {
    pub mean: f64,
    pub std_dev: f64,
}

/// Descriptive summary of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Mean total score of the group
    pub mean: f64,
    /// Sample standard deviation of the total score
    pub std_dev: f64,
    /// Group size - kept even when the group was too small for the test
    pub count: usize,
    /// Per-sub-score breakdown, when the analysis reports one
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_scores: BTreeMap<String, ScoreStat>,
    /// Share of the group at or above the dataset's 75th percentile
    /// (regional-gap only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_quartile_share: Option<f64>,
}

impl GroupSummary {
    pub fn new(mean: f64, std_dev: f64, count: usize) -> Self {
        Self {
            mean,
            std_dev,
            count,
            sub_scores: BTreeMap::new(),
            top_quartile_share: None,
        }
    }
}

/// Chart payload handed to the dashboard, tagged by chart type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart_type", rename_all = "snake_case")]
pub enum VisualizationData {
    /// One point per record, e.g. age against total score
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<[f64; 2]>,
    },
    /// Raw score distributions per group, for box plots
    GroupedBox { groups: BTreeMap<String, Vec<f64>> },
    /// One bar per group
    GroupedBar { groups: BTreeMap<String, f64> },
}

/// The `data` envelope of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisData {
    pub summary_stats: BTreeMap<String, GroupSummary>,
    pub visualization_data: VisualizationData,
}

/// Outcome of one hypothesis test over a dataset slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub hypothesis: String,
    pub statistical_test: String,
    pub p_value: f64,
    pub conclusion: Conclusion,
    pub effect_size: f64,
    pub data: AnalysisData,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_strings_round_trip() {
        for id in AnalysisId::ALL {
            let parsed: AnalysisId = id.as_str().parse().unwrap();
            assert_eq!(parsed, id);
        }
        assert!("age_performance".parse::<AnalysisId>().is_err());
    }

    #[test]
    fn identifier_serde_uses_kebab_case() {
        let json = serde_json::to_string(&AnalysisId::RegionalGap).unwrap();
        assert_eq!(json, "\"regional-gap\"");
    }

    #[test]
    fn result_serializes_with_the_published_field_names() {
        let mut summary = BTreeMap::new();
        summary.insert("capital".to_string(), GroupSummary::new(71.2, 4.1, 182));

        let result = AnalysisResult {
            hypothesis: AnalysisId::RegionalGap.hypothesis().to_string(),
            statistical_test: "Welch two-sample t-test".to_string(),
            p_value: 0.012,
            conclusion: Conclusion::Accepted,
            effect_size: 0.41,
            data: AnalysisData {
                summary_stats: summary,
                visualization_data: VisualizationData::GroupedBar {
                    groups: BTreeMap::new(),
                },
            },
            computed_at: Utc::now(),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["conclusion"], "accepted");
        assert_eq!(value["data"]["summary_stats"]["capital"]["count"], 182);
        assert_eq!(value["data"]["visualization_data"]["chart_type"], "grouped_bar");
        // optional members stay out of the payload when unset
        assert!(value["data"]["summary_stats"]["capital"]
            .get("top_quartile_share")
            .is_none());
    }
}
