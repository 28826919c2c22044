//! ScoreHouse Statistical Engine
//!
//! This crate turns a slice of survey records into structured hypothesis
//! test results.
//!
//! ## What Lives Here
//!
//! - **`engine`**: The three named analyses (age-performance,
//!   regional-gap, occupation-analysis) and the small-sample policy that
//!   keeps degenerate groups out of the tests without hiding them from the
//!   summaries.
//! - **`dist`**: The numeric primitives behind the p-values - log-gamma
//!   and the regularized incomplete beta function, evaluated by continued
//!   fraction.
//! - **`describe`**: Cheap descriptive aggregates (means, percentiles,
//!   daily and per-level stats) that are recomputed on every request
//!   rather than cached.
//! - **`result`**: The `AnalysisResult` model in the exact shape the
//!   dashboard consumes.
//!
//! The engine is synchronous and allocation-light; concurrency and
//! caching live a layer up in `scorehouse-cache`.

pub mod describe;
pub mod dist;
pub mod engine;
pub mod error;
pub mod result;

pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use result::{
    AnalysisData, AnalysisId, AnalysisResult, Conclusion, GroupSummary, ScoreStat,
    VisualizationData,
};
