//! Record Data Structure
//!
//! This module defines the core `Record` type - one respondent's evaluation,
//! the fundamental unit of data in ScoreHouse.
//!
//! ## Structure
//! Each record contains:
//! - **date**: Calendar date the evaluation was taken
//! - **level**: Proficiency tier assigned by the panel (IG..NA, or UNKNOWN)
//! - **age** / **region** / **occupation**: Respondent demographics
//! - **scores**: The four numeric sub-scores given by the raters
//! - **total_score**: Derived sum of the four sub-scores
//!
//! Records are immutable once ingested; `total_score` is computed at
//! construction and never recomputed from mutated sub-scores.
//!
//! ## Raw Form
//! Ingestion receives records as JSON blobs shaped like the collector's
//! output:
//!
//! ```json
//! {
//!   "metadata": { "date": "20250806" },
//!   "respondent": {
//!     "age": 29,
//!     "region": "seoul",
//!     "occupation": "engineer",
//!     "level": "TH",
//!     "scores": {
//!       "task_completion": 18.5,
//!       "delivery": 17.0,
//!       "accuracy": 16.5,
//!       "appropriateness": 19.0
//!     }
//!   }
//! }
//! ```
//!
//! `Record::from_raw_json` validates the date (`YYYYMMDD`) and required
//! fields, failing with `Error::MalformedRecord`; the caller skips and
//! counts such records rather than aborting the batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Level, Result};

/// The four rater sub-scores of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub task_completion: f64,
    pub delivery: f64,
    pub accuracy: f64,
    pub appropriateness: f64,
}

impl SubScores {
    /// Sum of the four sub-scores
    pub fn total(&self) -> f64 {
        self.task_completion + self.delivery + self.accuracy + self.appropriateness
    }

    /// (label, value) pairs in canonical order
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("task_completion", self.task_completion),
            ("delivery", self.delivery),
            ("accuracy", self.accuracy),
            ("appropriateness", self.appropriateness),
        ]
    }
}

/// One respondent's evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Calendar date of the evaluation
    pub date: NaiveDate,

    /// Proficiency tier assigned by the panel
    pub level: Level,

    /// Respondent age in years
    pub age: u32,

    /// Respondent's self-reported region (lowercased on ingestion)
    pub region: String,

    /// Respondent's occupation category (lowercased on ingestion)
    pub occupation: String,

    /// The four rater sub-scores
    pub scores: SubScores,

    /// Derived total, fixed at construction
    pub total_score: f64,
}

/// Raw wire form of a record as emitted by the survey collector
#[derive(Debug, Deserialize)]
struct RawSurvey {
    metadata: RawMetadata,
    respondent: RawRespondent,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    date: String,
}

#[derive(Debug, Deserialize)]
struct RawRespondent {
    age: u32,
    #[serde(default)]
    region: String,
    #[serde(default)]
    occupation: String,
    #[serde(default)]
    level: String,
    scores: SubScores,
}

impl Record {
    /// Build a record, deriving the total score.
    pub fn new(
        date: NaiveDate,
        level: Level,
        age: u32,
        region: impl Into<String>,
        occupation: impl Into<String>,
        scores: SubScores,
    ) -> Self {
        Self {
            date,
            level,
            age,
            region: region.into(),
            occupation: occupation.into(),
            scores,
            total_score: scores.total(),
        }
    }

    /// Parse one raw collector blob into a cleaned record.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` when the blob is not valid JSON, the date is not a
    /// real `YYYYMMDD` calendar date, or the age is zero. An unrecognized
    /// level label is NOT an error: it routes to `Level::Unknown`.
    pub fn from_raw_json(raw: &[u8]) -> Result<Record> {
        let survey: RawSurvey = serde_json::from_slice(raw)
            .map_err(|e| Error::MalformedRecord(format!("invalid survey JSON: {e}")))?;

        let date = parse_compact_date(&survey.metadata.date)?;
        if survey.respondent.age == 0 {
            return Err(Error::MalformedRecord("respondent age is zero".to_string()));
        }

        let level = Level::from_label_lossy(&survey.respondent.level);

        Ok(Record::new(
            date,
            level,
            survey.respondent.age,
            survey.respondent.region.trim().to_lowercase(),
            survey.respondent.occupation.trim().to_lowercase(),
            survey.respondent.scores,
        ))
    }
}

/// Parse the collector's compact `YYYYMMDD` date form.
pub fn parse_compact_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|_| Error::MalformedRecord(format!("invalid date: {s:?} (expected YYYYMMDD)")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> SubScores {
        SubScores {
            task_completion: 18.5,
            delivery: 17.0,
            accuracy: 16.5,
            appropriateness: 19.0,
        }
    }

    #[test]
    fn total_is_sum_of_sub_scores() {
        assert!((scores().total() - 71.0).abs() < 1e-12);
    }

    #[test]
    fn parses_valid_raw_blob() {
        let raw = br#"{
            "metadata": { "date": "20250806" },
            "respondent": {
                "age": 29,
                "region": " Seoul ",
                "occupation": "Engineer",
                "level": "TH",
                "scores": {
                    "task_completion": 18.5,
                    "delivery": 17.0,
                    "accuracy": 16.5,
                    "appropriateness": 19.0
                }
            }
        }"#;
        let record = Record::from_raw_json(raw).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 8, 6).unwrap());
        assert_eq!(record.level, Level::Th);
        assert_eq!(record.region, "seoul");
        assert_eq!(record.occupation, "engineer");
        assert!((record.total_score - 71.0).abs() < 1e-12);
    }

    #[test]
    fn bad_date_is_malformed() {
        let raw = br#"{
            "metadata": { "date": "20251345" },
            "respondent": {
                "age": 29, "region": "seoul", "occupation": "x", "level": "TH",
                "scores": { "task_completion": 1, "delivery": 1, "accuracy": 1, "appropriateness": 1 }
            }
        }"#;
        assert!(matches!(
            Record::from_raw_json(raw),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn unknown_level_is_kept_not_rejected() {
        let raw = br#"{
            "metadata": { "date": "20250806" },
            "respondent": {
                "age": 41, "region": "busan", "occupation": "teacher", "level": "ZZ",
                "scores": { "task_completion": 1, "delivery": 2, "accuracy": 3, "appropriateness": 4 }
            }
        }"#;
        let record = Record::from_raw_json(raw).unwrap();
        assert_eq!(record.level, Level::Unknown);
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            Record::from_raw_json(b"not json"),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn record_serde_round_trip() {
        let record = Record::new(
            NaiveDate::from_ymd_opt(2025, 8, 6).unwrap(),
            Level::Na,
            33,
            "gyeonggi",
            "designer",
            scores(),
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
