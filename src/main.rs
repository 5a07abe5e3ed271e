//! Tradewind - Journal Lifecycle CLI
//!
//! This is the main entry point for the Tradewind core: the position
//! lifecycle sweep, the schema bootstrap, and the indicator snapshot tool.
//! The sweep is single-shot; an external scheduler drives the cadence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one lifecycle sweep over open positions
    Sweep {
        /// Max positions to evaluate this run (clamped to 1..=500)
        #[arg(long, default_value_t = 200)]
        limit: u32,

        /// Evaluate close conditions without mutating anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply the embedded database schema
    Migrate,
    /// Compute an indicator snapshot from a JSON file of OHLCV bars
    Snapshot {
        /// Path to a JSON array of bars, oldest first
        #[arg(long)]
        bars: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args.log_level);

    match args.command {
        Command::Sweep { limit, dry_run } => run_sweep(limit, dry_run).await,
        Command::Migrate => run_migrate().await,
        Command::Snapshot { bars } => run_snapshot(&bars),
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_sweep(limit: u32, dry_run: bool) -> Result<()> {
    info!("Starting Tradewind sweep v{}", env!("CARGO_PKG_VERSION"));

    let db_config = tradewind_database::DatabaseConfig::from_env()?;
    let manager = tradewind_database::DatabaseManager::connect(db_config).await?;
    manager.health_check().await?;
    info!("✅ Database connection established");

    let quote_config = quote_gateway::QuoteClientConfig::from_env()?;
    let quotes = Arc::new(quote_gateway::HttpQuoteClient::new(quote_config)?);

    let pool = manager.pool().clone();
    let store = Arc::new(tradewind_database::PgPositionStore::new(pool.clone()));
    let events = Arc::new(tradewind_database::PgLifecycleEventSink::new(pool.clone()));
    let jobs = Arc::new(tradewind_database::PgRecomputeJobQueue::new(pool));

    let config = sweep_engine::SweepConfig {
        limit,
        dry_run,
        ..Default::default()
    };
    let engine = sweep_engine::SweepEngine::new(store, quotes, events, jobs, config);
    let report = engine.run().await?;

    // Per-position failures live inside the report; only wiring errors are
    // fatal to the invocation.
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_migrate() -> Result<()> {
    let db_config = tradewind_database::DatabaseConfig::from_env()?;
    let manager = tradewind_database::DatabaseManager::connect(db_config).await?;
    tradewind_database::ensure_schema(manager.pool()).await?;
    info!("✅ Schema applied");
    Ok(())
}

fn run_snapshot(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let bars: Vec<indicator_engine::Bar> = serde_json::from_str(&raw)?;
    let snapshot = indicator_engine::snapshot::IndicatorSnapshot::compute(&bars);
    let warmup = indicator_engine::warmup::WarmupStatus::for_bar_count(bars.len());
    let output = serde_json::json!({
        "snapshot": snapshot,
        "warmup": warmup,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
