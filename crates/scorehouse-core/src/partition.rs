//! Partition Key Codec
//!
//! This module derives the hierarchical partition address of a record from
//! its date and proficiency level.
//!
//! ## Layout
//!
//! Records land in object storage under Hive-style path segments:
//!
//! ```text
//! year=2025/month=08/day=06/level=TH
//! ```
//!
//! The codec is a pure, total function over valid records and is
//! bidirectional: `path()` renders the canonical string and `parse()`
//! inverts it exactly. That round trip is what partition enumeration relies
//! on - listed storage paths are decoded back into keys, so any drift
//! between the two directions would silently orphan partitions.
//!
//! ## Ordering
//!
//! Keys order by calendar date first, then by level rank, giving range
//! scans a stable, date-major traversal.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Level, Record, Result};

/// Storage address of one partition: a calendar date plus a level bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub level: Level,
}

impl PartitionKey {
    /// Build a key from calendar components, validating the date.
    pub fn new(year: i32, month: u32, day: u32, level: Level) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::MalformedRecord(format!("invalid calendar date: {year:04}-{month:02}-{day:02}"))
        })?;
        Ok(Self {
            year,
            month,
            day,
            level,
        })
    }

    /// The partition a record belongs to. Every record maps to exactly one.
    pub fn for_record(record: &Record) -> Self {
        Self {
            year: record.date.year(),
            month: record.date.month(),
            day: record.date.day(),
            level: record.level,
        }
    }

    pub fn from_date(date: NaiveDate, level: Level) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            level,
        }
    }

    /// The key's calendar date.
    pub fn date(&self) -> NaiveDate {
        // new() and for_record() only admit valid dates
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .expect("partition key holds a valid date")
    }

    /// Canonical storage path segment: `year=YYYY/month=MM/day=DD/level=L`
    pub fn path(&self) -> String {
        format!(
            "year={:04}/month={:02}/day={:02}/level={}",
            self.year, self.month, self.day, self.level
        )
    }

    /// Invert `path()`. Accepts exactly the canonical rendering.
    pub fn parse(path: &str) -> Result<Self> {
        let mut parts = path.split('/');
        let year = segment(parts.next(), "year", path)?;
        let month = segment(parts.next(), "month", path)?;
        let day = segment(parts.next(), "day", path)?;
        let level = parts
            .next()
            .and_then(|s| s.strip_prefix("level="))
            .ok_or_else(|| Error::InvalidPartitionPath(path.to_string()))?;
        if parts.next().is_some() {
            return Err(Error::InvalidPartitionPath(path.to_string()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| Error::InvalidPartitionPath(path.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| Error::InvalidPartitionPath(path.to_string()))?;
        let day: u32 = day
            .parse()
            .map_err(|_| Error::InvalidPartitionPath(path.to_string()))?;
        let level: Level = level
            .parse()
            .map_err(|_| Error::InvalidPartitionPath(path.to_string()))?;

        PartitionKey::new(year, month, day, level)
            .map_err(|_| Error::InvalidPartitionPath(path.to_string()))
    }
}

fn segment<'a>(part: Option<&'a str>, name: &str, path: &str) -> Result<&'a str> {
    part.and_then(|s| s.strip_prefix(name).and_then(|s| s.strip_prefix('=')))
        .ok_or_else(|| Error::InvalidPartitionPath(path.to_string()))
}

impl Ord for PartitionKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month, self.day, self.level.rank()).cmp(&(
            other.year,
            other.month,
            other.day,
            other.level.rank(),
        ))
    }
}

impl PartialOrd for PartitionKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Display mirrors path() so log lines and storage keys read the same.
impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Inclusive calendar date range used for partition scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Inclusive range; `start` and `end` may be equal for a single day.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(y: i32, m: u32, d: u32, level: Level) -> PartitionKey {
        PartitionKey::new(y, m, d, level).unwrap()
    }

    #[test]
    fn path_renders_canonical_form() {
        let k = key(2025, 8, 6, Level::Th);
        assert_eq!(k.path(), "year=2025/month=08/day=06/level=TH");
    }

    #[test]
    fn path_round_trips_for_all_levels() {
        for level in Level::ALL.into_iter().chain([Level::Unknown]) {
            let k = key(2024, 12, 31, level);
            let back = PartitionKey::parse(&k.path()).unwrap();
            assert_eq!(back, k);
        }
    }

    #[test]
    fn parse_rejects_mangled_paths() {
        for bad in [
            "year=2025/month=08/day=06",
            "year=2025/month=08/day=06/level=TH/extra",
            "year=2025/month=13/day=06/level=TH",
            "year=2025/month=02/day=30/level=TH",
            "y=2025/month=08/day=06/level=TH",
            "year=2025/month=08/day=06/level=tiger",
            "",
        ] {
            assert!(PartitionKey::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn invalid_date_rejected_at_construction() {
        assert!(PartitionKey::new(2025, 2, 30, Level::Ig).is_err());
        assert!(PartitionKey::new(2025, 0, 1, Level::Ig).is_err());
    }

    #[test]
    fn ordering_is_date_major_then_level() {
        let a = key(2025, 8, 5, Level::Na);
        let b = key(2025, 8, 6, Level::Ig);
        let c = key(2025, 8, 6, Level::Th);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn record_maps_to_its_date_and_level() {
        let record = crate::Record::new(
            NaiveDate::from_ymd_opt(2025, 8, 6).unwrap(),
            Level::Tm,
            30,
            "seoul",
            "engineer",
            crate::SubScores {
                task_completion: 1.0,
                delivery: 1.0,
                accuracy: 1.0,
                appropriateness: 1.0,
            },
        );
        let k = PartitionKey::for_record(&record);
        assert_eq!(k, key(2025, 8, 6, Level::Tm));
        assert_eq!(k.date(), record.date);
    }

    #[test]
    fn date_range_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 3).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2025, 8, 3).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 8, 4).unwrap()));
    }
}
