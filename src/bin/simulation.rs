//! Synthetic Wear Data Generator
//!
//! Writes a JSON array of measurements for a simulated fleet to stdout,
//! in the format `wearcast` reads.
//!
//! # Usage
//! ```bash
//! ./simulation --seed 42 > measurements.json
//! ./wearcast compare --input measurements.json
//! ```

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;

use wearcast::config::ThresholdConfig;
use wearcast::simulation::{FleetSpec, WearSimulator};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wear-simulation")]
#[command(about = "Synthetic wear measurements for wearcast testing")]
#[command(version = "1.0")]
struct Args {
    /// Unit identifiers (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "TUL1,TUL2,TUL3")]
    units: Vec<String>,

    /// Pinions and rollers per unit
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u32).range(1..=99))]
    per_kind: u32,

    /// Years of history to generate
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=20))]
    years: u32,

    /// Last measurement date (YYYY-MM-DD, default: today)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let spec = FleetSpec {
        units: args.units,
        assets_per_kind: args.per_kind,
        end_date: args.end_date.unwrap_or_else(|| Utc::now().date_naive()),
        years: args.years,
    };

    let thresholds = ThresholdConfig::default();
    let mut simulator = match args.seed {
        Some(seed) => WearSimulator::from_seed(seed, thresholds),
        None => WearSimulator::from_entropy(thresholds),
    };
    let measurements = simulator.generate_fleet(&spec);

    info!(
        units = spec.units.len(),
        per_kind = spec.assets_per_kind,
        measurements = measurements.len(),
        seed = ?args.seed,
        "Generated synthetic fleet"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&measurements)
    } else {
        serde_json::to_string(&measurements)
    }
    .context("Failed to serialize measurements")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write to stdout")?;
    Ok(())
}
