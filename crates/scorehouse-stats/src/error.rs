//! Statistical Engine Error Types
//!
//! ## Error Categories
//!
//! - `InsufficientData`: A hypothesis test cannot run - fewer than two
//!   eligible groups remain after the minimum-sample-size filter, or the
//!   inputs are degenerate (zero variance where a correlation needs
//!   spread). Surfaced to the caller instead of returning a misleading
//!   result, and never cached.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data for {analysis}: {reason}")]
    InsufficientData { analysis: String, reason: String },
}

impl Error {
    pub fn insufficient(analysis: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InsufficientData {
            analysis: analysis.into(),
            reason: reason.into(),
        }
    }
}
