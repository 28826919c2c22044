//! Cache Error Types
//!
//! ## Error Categories
//!
//! - `ComputationTimeout`: The provider did not return within the
//!   configured bound. The compute lock is released before this surfaces,
//!   so a subsequent caller may retry immediately.
//! - `Analysis`: The statistical engine refused to run (e.g. insufficient
//!   data). Never cached - the slot stays Empty.
//! - `Storage`: Reading the dataset (or, for explicit snapshot reads, the
//!   analytics mirror) failed.

use std::time::Duration;

use thiserror::Error;

use scorehouse_stats::AnalysisId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Computation for {identifier} timed out after {timeout:?}")]
    ComputationTimeout {
        identifier: AnalysisId,
        timeout: Duration,
    },

    #[error(transparent)]
    Analysis(#[from] scorehouse_stats::Error),

    #[error(transparent)]
    Storage(#[from] scorehouse_storage::Error),
}
