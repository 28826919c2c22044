//! ScoreHouse Ingestion Pipeline and Service Surface
//!
//! This crate ties the other layers together:
//!
//! ```text
//! scheduler ──► Orchestrator::run(date)
//!                 extract   RawRecordSource
//!                 load      RecordStore (partitions + cleaned dataset)
//!                 trigger   AnalysisCache::invalidate_all
//!
//! router ─────► SurveyService
//!                 analysis(id)      cached, single-flight
//!                 ingest(date)      one orchestrator run
//!                 summary / stats   uncached descriptive scans
//! ```
//!
//! The scheduler and router themselves are external callers; this crate
//! exposes the operations they invoke, nothing more.

pub mod error;
pub mod orchestrator;
pub mod service;
pub mod source;

pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, RunSummary};
pub use service::SurveyService;
pub use source::{LocalDirSource, ObjectSource, RawBlob, RawRecordSource};
