//! Proficiency Level
//!
//! This module defines the ordinal proficiency tier assigned to each
//! respondent by the evaluation panel.
//!
//! ## Tiers
//!
//! From lowest to highest:
//! - **IG**: Intermediate General
//! - **TL**: Talented Low
//! - **TM**: Talented Middle
//! - **TH**: Talented High
//! - **NA**: Native-like
//!
//! Records whose level field is missing or unrecognized are routed to the
//! `Unknown` bucket rather than rejected, so a whole partition is never lost
//! to one bad label. `Unknown` sorts after every real tier.
//!
//! ## Example
//! ```
//! use scorehouse_core::Level;
//!
//! let level: Level = "TH".parse().unwrap();
//! assert_eq!(level.as_str(), "TH");
//! assert!(Level::Ig < Level::Na);
//! ```

use serde::{Deserialize, Serialize};

/// Ordinal proficiency tier of a respondent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "IG")]
    Ig,
    #[serde(rename = "TL")]
    Tl,
    #[serde(rename = "TM")]
    Tm,
    #[serde(rename = "TH")]
    Th,
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Level {
    /// All real tiers, lowest first. `Unknown` is excluded.
    pub const ALL: [Level; 5] = [Level::Ig, Level::Tl, Level::Tm, Level::Th, Level::Na];

    /// Canonical storage label (matches the `level=` path segment)
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Ig => "IG",
            Level::Tl => "TL",
            Level::Tm => "TM",
            Level::Th => "TH",
            Level::Na => "NA",
            Level::Unknown => "UNKNOWN",
        }
    }

    /// Ordinal rank, 1 (IG) through 5 (NA). `Unknown` ranks 0.
    pub fn rank(&self) -> u8 {
        match self {
            Level::Unknown => 0,
            Level::Ig => 1,
            Level::Tl => 2,
            Level::Tm => 3,
            Level::Th => 4,
            Level::Na => 5,
        }
    }

    /// Human-readable tier name
    pub fn display_name(&self) -> &'static str {
        match self {
            Level::Ig => "Intermediate General",
            Level::Tl => "Talented Low",
            Level::Tm => "Talented Middle",
            Level::Th => "Talented High",
            Level::Na => "Native-like",
            Level::Unknown => "Unknown",
        }
    }

    /// Parse a label, routing anything unrecognized to `Unknown`.
    ///
    /// Used on the ingestion path where a bad label must not drop the
    /// record. Strict parsing (for partition paths) goes through `FromStr`.
    pub fn from_label_lossy(label: &str) -> Level {
        label.parse().unwrap_or(Level::Unknown)
    }
}

impl std::str::FromStr for Level {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IG" => Ok(Level::Ig),
            "TL" => Ok(Level::Tl),
            "TM" => Ok(Level::Tm),
            "TH" => Ok(Level::Th),
            "NA" => Ok(Level::Na),
            "UNKNOWN" => Ok(Level::Unknown),
            other => Err(crate::Error::MalformedRecord(format!(
                "unrecognized level label: {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
