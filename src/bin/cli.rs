//! Traffic Trends CLI
//!
//! Command-line interface for the dashboard:
//! - Print aggregate tables for a filter
//! - List filter options
//! - Check server status
//! - Export filtered records
//!
//! Talks to a running API server, or computes locally with `--offline`.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use traffic_trends::aggregate::aggregate;
use traffic_trends::api::dto::{AggregateMeta, AggregateResponse, FilterOptionsResponse};
use traffic_trends::config::{generate_default_config, Config};
use traffic_trends::dataset::{write_csv, Dataset, FilterSpec};

#[derive(Parser)]
#[command(name = "traffic-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Website Traffic Trend Analyzer")]
#[command(long_about = "Filter website traffic by device and location and print the\ndaily trend, top pages and device share.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://127.0.0.1:8050", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Compute locally from the configured data source instead of calling the API
    #[arg(long, global = true)]
    pub offline: bool,

    /// Config file used in offline mode
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print trend, top pages and device share
    Summary {
        /// Device to include (repeatable or comma-separated)
        #[arg(short, long)]
        device: Vec<String>,
        /// Location to include (repeatable or comma-separated)
        #[arg(short, long)]
        location: Vec<String>,
    },

    /// List available device and location values
    Filters,

    /// Show server status
    Status,

    /// Export filtered records as CSV
    Export {
        #[arg(short, long)]
        device: Vec<String>,
        #[arg(short, long)]
        location: Vec<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match &cli.command {
        Commands::Summary { device, location } => {
            let filter = build_filter(device, location);

            let data = if cli.offline {
                let dataset = load_local(&local_config(&cli)?)?;
                let tables = aggregate(&dataset, &filter);
                let meta = AggregateMeta {
                    matched_records: tables.matched_records,
                    total_records: dataset.len(),
                    total_visits: tables.grand_total(),
                    execution_time_us: 0,
                    filter,
                };
                AggregateResponse::new(&tables, meta)
            } else {
                let response = client
                    .post(format!("{}/api/v1/aggregate", cli.api_url))
                    .json(&filter)
                    .send()
                    .await
                    .with_context(|| connect_hint(&cli.api_url))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    bail!("Aggregate failed ({}): {}", status, text);
                }

                response.json().await?
            };

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&data)?),
                "csv" => print_csv(&data),
                _ => print_table(&data),
            }
        }

        Commands::Filters => {
            let options = if cli.offline {
                local_filter_options(&local_config(&cli)?)?
            } else {
                client
                    .get(format!("{}/api/v1/filters", cli.api_url))
                    .send()
                    .await
                    .with_context(|| connect_hint(&cli.api_url))?
                    .error_for_status()?
                    .json()
                    .await?
            };

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                println!("{}", options.title);
                println!();
                println!("Devices:   {}", options.devices.join(", "));
                println!("Locations: {}", options.locations.join(", "));
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await
                .with_context(|| connect_hint(&cli.api_url))?;

            if !response.status().is_success() {
                bail!("API returned error: {}", response.status());
            }

            let health: serde_json::Value = response.json().await?;

            println!("Traffic Trends v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!(
                "API Status: {}",
                health["status"].as_str().unwrap_or("unknown")
            );
            println!(
                "Dataset:    {} records ({})",
                health["records"].as_u64().unwrap_or(0),
                health["source"].as_str().unwrap_or("unknown")
            );
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:     {}", format_duration(uptime));
            }
        }

        Commands::Export {
            device,
            location,
            output,
        } => {
            let filter = build_filter(device, location);

            let data = if cli.offline {
                let dataset = load_local(&local_config(&cli)?)?;
                let mut buf = Vec::new();
                write_csv(&mut buf, dataset.select(&filter))?;
                String::from_utf8(buf)?
            } else {
                let mut request = client
                    .get(format!("{}/api/v1/export", cli.api_url))
                    .query(&[("format", "csv")]);
                if !filter.devices.is_empty() {
                    request = request.query(&[("device", filter.devices.join(","))]);
                }
                if !filter.locations.is_empty() {
                    request = request.query(&[("location", filter.locations.join(","))]);
                }

                let response = request
                    .send()
                    .await
                    .with_context(|| connect_hint(&cli.api_url))?;
                if !response.status().is_success() {
                    bail!("Export failed: {}", response.status());
                }
                response.text().await?
            };

            match output {
                Some(path) => {
                    std::fs::write(path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => print!("{}", data),
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", config),
            }
        }
    }

    Ok(())
}

/// Flatten repeated and comma-separated flag values into a filter
fn build_filter(devices: &[String], locations: &[String]) -> FilterSpec {
    FilterSpec::from_csv_lists(Some(&devices.join(",")), Some(&locations.join(",")))
}

fn local_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    })
}

fn load_local(config: &Config) -> anyhow::Result<Dataset> {
    let source = config.dataset.data_source()?;
    source
        .load()
        .with_context(|| format!("failed to load {} dataset", source.name()))
}

fn local_filter_options(config: &Config) -> anyhow::Result<FilterOptionsResponse> {
    let dataset = load_local(config)?;
    Ok(FilterOptionsResponse {
        title: config.api.title.clone(),
        devices: dataset.devices(),
        locations: dataset.locations(),
    })
}

fn connect_hint(api_url: &str) -> String {
    format!(
        "Cannot connect to Traffic Trends API at {} (start it with `cargo run --bin traffic-trends`, or pass --offline)",
        api_url
    )
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_table(data: &AggregateResponse) {
    if data.meta.matched_records == 0 {
        println!("No traffic matches the selected filters");
        return;
    }

    println!("Daily Website Visits");
    println!("{:<12} | {:>8}", "Date", "Visits");
    println!("{}", "-".repeat(23));
    for point in &data.trend {
        println!("{:<12} | {:>8}", point.date, point.visits);
    }

    println!();
    println!("Top Pages by Visits");
    println!("{:<12} | {:>8}", "Page", "Visits");
    println!("{}", "-".repeat(23));
    for page in &data.top_pages {
        println!("{:<12} | {:>8}", page.label, page.visits);
    }

    println!();
    println!("Traffic by Device");
    println!("{:<12} | {:>8} | {:>6}", "Device", "Visits", "Share");
    println!("{}", "-".repeat(32));
    for device in &data.device_share {
        let share = device.visits as f64 * 100.0 / data.meta.total_visits.max(1) as f64;
        println!("{:<12} | {:>8} | {:>5.1}%", device.label, device.visits, share);
    }

    println!();
    println!(
        "{} of {} records, {} visits",
        data.meta.matched_records, data.meta.total_records, data.meta.total_visits
    );
}

fn print_csv(data: &AggregateResponse) {
    println!("table,label,visits");
    for point in &data.trend {
        println!("trend,{},{}", point.date, point.visits);
    }
    for page in &data.top_pages {
        println!("top_pages,{},{}", page.label, page.visits);
    }
    for device in &data.device_share {
        println!("device_share,{},{}", device.label, device.visits);
    }
}
