//! # spheroscan CLI
//!
//! Command-line front end for the spheroid scan pipeline.
//!
//! ## Usage
//!
//! ```bash
//! # Process a staging directory and write both result tables as CSV
//! spheroscan process ./scan42_export -o ./results
//!
//! # Emit chart-ready JSON for one channel/attribute slice
//! spheroscan chart ./scan42_export --channel BF --attribute confluency
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::str::FromStr;

use spheroscan::chart::chart_series;
use spheroscan::export::{write_aggregate_table_path, write_row_table_path};
use spheroscan::pipeline::process;
use spheroscan::vocabulary::{Attribute, Channel};

/// spheroscan - Spheroid Scan Export Processor
#[derive(Parser)]
#[command(name = "spheroscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a staging directory into row-level and aggregated CSV tables
    Process {
        /// Staging directory with instrument CSVs and one metadata source
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Output directory (defaults to the staging directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit chart-ready JSON for one channel/attribute slice
    Chart {
        /// Staging directory with instrument CSVs and one metadata source
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Channel token (BF, green, EC)
        #[arg(short, long)]
        channel: String,

        /// Attribute token (e.g. confluency, total_intensity)
        #[arg(short, long)]
        attribute: String,

        /// Restrict to these well groups (repeatable)
        #[arg(short, long)]
        group: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Process { dir, output } => run_process(dir, output),
        Commands::Chart {
            dir,
            channel,
            attribute,
            group,
        } => run_chart(dir, channel, attribute, group),
    }
}

fn run_process(dir: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let output_dir = output.unwrap_or_else(|| dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let result = process(&dir).with_context(|| format!("processing {}", dir.display()))?;

    let stem = result.rows.scan_id.clone().unwrap_or_else(|| "scan".to_string());
    let rows_path = output_dir.join(format!("{stem}_rows.csv"));
    let aggregated_path = output_dir.join(format!("{stem}_aggregated.csv"));

    write_row_table_path(&rows_path, &result.rows)
        .with_context(|| format!("writing {}", rows_path.display()))?;
    write_aggregate_table_path(&aggregated_path, &result.aggregated)
        .with_context(|| format!("writing {}", aggregated_path.display()))?;

    info!("wrote {} row-level records", result.rows.rows.len());
    info!("wrote {} aggregated records", result.aggregated.rows.len());
    print!("{}", result.report);
    println!("Row-level table:  {}", rows_path.display());
    println!("Aggregated table: {}", aggregated_path.display());
    Ok(())
}

fn run_chart(dir: PathBuf, channel: String, attribute: String, groups: Vec<String>) -> Result<()> {
    let channel = Channel::from_str(&channel)?;
    let attribute = Attribute::from_str(&attribute)?;

    let result = process(&dir).with_context(|| format!("processing {}", dir.display()))?;
    let filter = if groups.is_empty() {
        None
    } else {
        Some(groups.as_slice())
    };
    let chart = chart_series(&result.aggregated, channel, attribute, filter);

    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}
