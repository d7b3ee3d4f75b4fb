//! Traffic Trends API Server
//!
//! Run with: cargo run --bin traffic-trends [-- --config path/to/config.toml]
//!
//! # Configuration
//!
//! Settings come from a TOML file (see `traffic-cli config`) with
//! environment overrides:
//! - `TRAFFIC_DATASET_SOURCE`: synthetic or csv (default: synthetic)
//! - `TRAFFIC_CSV_PATH`: CSV file for the csv source
//! - `TRAFFIC_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `TRAFFIC_API_PORT`: Port to listen on (default: 8050)
//! - `TRAFFIC_LOG_LEVEL` / `TRAFFIC_LOG_FORMAT`: logging (default: info, pretty)
//! - `RUST_LOG`: full tracing filter, overrides the level

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use traffic_trends::api::{serve, AppState};
use traffic_trends::config::Config;

#[derive(Parser)]
#[command(name = "traffic-trends")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Website Traffic Trend Analyzer API server")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    config.logging.init();

    tracing::info!("Starting Traffic Trends API server v{}", env!("CARGO_PKG_VERSION"));

    let source = config.dataset.data_source()?;
    tracing::info!("Loading dataset from {} source", source.name());

    let dataset = source
        .load()
        .with_context(|| format!("failed to load {} dataset", source.name()))?;

    let (first, last) = dataset.date_span();
    tracing::info!(
        records = dataset.len(),
        total_visits = dataset.total_visits(),
        devices = dataset.devices().len(),
        locations = dataset.locations().len(),
        "Dataset loaded ({} to {})",
        first,
        last
    );

    let state = AppState::new(dataset, config.api.clone()).with_source(source.name());

    serve(state, &config.api).await?;

    tracing::info!("Traffic Trends API server stopped");
    Ok(())
}
