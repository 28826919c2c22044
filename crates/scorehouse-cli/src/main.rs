//! ScoreHouse CLI (scorectl)
//!
//! Command-line tool for driving a ScoreHouse data lake rooted in a local
//! directory. Useful for development and for exercising the pipeline
//! without the scheduler or the API layer.
//!
//! ## Quick Start
//!
//! ```bash
//! # Ingest one day's worth of collector output
//! scorectl --data-dir ./lake --raw-dir ./dataset ingest --date 2025-08-06
//!
//! # Run a cached analysis
//! scorectl --data-dir ./lake analyze regional-gap
//!
//! # Uncached descriptive aggregates
//! scorectl --data-dir ./lake stats daily
//! scorectl --data-dir ./lake stats levels
//! scorectl --data-dir ./lake summary
//! ```
//!
//! ## Configuration
//!
//! - `--data-dir` / `SCOREHOUSE_DATA_DIR`: root of the local object store
//! - `--raw-dir` / `SCOREHOUSE_RAW_DIR`: collector drop directory
//! - `RUST_LOG`: log filter (default `info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use object_store::local::LocalFileSystem;
use tracing_subscriber::EnvFilter;

use scorehouse_cache::CacheConfig;
use scorehouse_pipeline::{LocalDirSource, SurveyService};
use scorehouse_stats::{AnalysisId, EngineConfig};

#[derive(Parser)]
#[command(name = "scorectl")]
#[command(about = "ScoreHouse command-line tool", long_about = None)]
struct Cli {
    /// Root directory of the local object store
    #[arg(long, env = "SCOREHOUSE_DATA_DIR", default_value = "./scorehouse-data")]
    data_dir: PathBuf,

    /// Collector drop directory holding raw survey JSON
    #[arg(long, env = "SCOREHOUSE_RAW_DIR", default_value = "./dataset")]
    raw_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run ingestion for one date
    Ingest {
        /// Date to ingest (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Run a cached hypothesis analysis
    Analyze {
        /// One of: age-performance, regional-gap, occupation-analysis
        identifier: String,
    },
    /// Uncached descriptive aggregates
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// Dataset overview
    Summary,
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Per-day respondent counts and mean totals
    Daily,
    /// Per-level aggregates
    Levels,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("creating data dir {:?}", cli.data_dir))?;
    let object_store = LocalFileSystem::new_with_prefix(&cli.data_dir)
        .with_context(|| format!("opening object store at {:?}", cli.data_dir))?;

    let service = SurveyService::new(
        Arc::new(object_store),
        Arc::new(LocalDirSource::new(&cli.raw_dir)),
        EngineConfig::default(),
        CacheConfig::default(),
    );

    match cli.command {
        Commands::Ingest { date } => {
            let summary = service
                .ingest(date)
                .await
                .with_context(|| format!("ingesting {date}"))?;
            print_json(&summary)?;
        }
        Commands::Analyze { identifier } => {
            let id: AnalysisId = identifier
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let result = service
                .analysis(id)
                .await
                .with_context(|| format!("computing {id}"))?;
            print_json(&result)?;
        }
        Commands::Stats { command } => match command {
            StatsCommands::Daily => print_json(&service.daily_stats().await?)?,
            StatsCommands::Levels => print_json(&service.level_stats().await?)?,
        },
        Commands::Summary => print_json(&service.summary().await?)?,
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
