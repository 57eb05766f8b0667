//! Wearcast - wear forecasting CLI
//!
//! Reads wear measurements (JSON array of `{asset_id, date, wear_mm, notes?}`)
//! and prints forecasts, maintenance dates, model predictions or fleet
//! comparisons as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! wearcast forecast --input measurements.json --asset TUL1-INDPIN-03
//! wearcast maintenance-date --input measurements.json --asset TUL1-INDROL-01
//! wearcast forecast --input m.json --asset TUL1-INDPIN-03 --save-model pin3.json
//! wearcast predict --model pin3.json --days 900,930,960
//! wearcast compare --input measurements.json --since 2024-01-01
//! ```
//!
//! # Environment Variables
//!
//! - `WEARCAST_CONFIG`: Path to a TOML config file (default: ./wearcast.toml)
//! - `RUST_LOG`: Logging level (default: info). Logs go to stderr.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use wearcast::config::{self, ForecastConfig};
use wearcast::forecast::checkpoint::{self, CheckpointMetadata, ModelCheckpoint};
use wearcast::{FleetComparator, Measurement, WearForecaster, WearPredictionModel};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wearcast")]
#[command(about = "Wear forecasting for indexer pinions and support rollers")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides WEARCAST_CONFIG and ./wearcast.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Fit, project and find the threshold crossing for one asset (or all)
    Forecast {
        /// Measurements JSON file
        #[arg(long)]
        input: PathBuf,
        /// Asset to forecast (default: every asset in the input)
        #[arg(long)]
        asset: Option<String>,
        /// Threshold in mm (default: per asset kind from config)
        #[arg(long)]
        threshold: Option<f64>,
        /// Days to project beyond the latest measurement
        #[arg(long)]
        days_ahead: Option<u32>,
        /// Save the fitted model checkpoint here (requires --asset)
        #[arg(long, requires = "asset")]
        save_model: Option<PathBuf>,
    },

    /// Estimate the maintenance date over the long horizon
    MaintenanceDate {
        /// Measurements JSON file
        #[arg(long)]
        input: PathBuf,
        /// Asset to estimate
        #[arg(long)]
        asset: String,
        /// Threshold in mm (default: per asset kind from config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Evaluate a saved model at the given elapsed days
    Predict {
        /// Model checkpoint file
        #[arg(long)]
        model: PathBuf,
        /// Elapsed days (comma separated)
        #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
        days: Vec<f64>,
    },

    /// Compare wear rates across every asset in the input
    Compare {
        /// Measurements JSON file
        #[arg(long)]
        input: PathBuf,
        /// Only use readings on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
struct Prediction {
    elapsed_day: f64,
    wear_mm: f64,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Logs on stderr; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = CliArgs::parse();

    let forecast_config = match &args.config {
        Some(path) => ForecastConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ForecastConfig::load(),
    };
    config::init(forecast_config);
    let forecaster = WearForecaster::new(config::get().clone());

    match args.command {
        SubCommand::Forecast {
            input,
            asset,
            threshold,
            days_ahead,
            save_model,
        } => {
            let measurements = read_measurements(&input)?;
            match asset {
                Some(asset_id) => {
                    let run = forecaster
                        .forecast(&asset_id, &measurements, threshold, days_ahead)
                        .with_context(|| format!("Forecast failed for {asset_id}"))?;
                    if let Some(path) = save_model {
                        save_model_checkpoint(&run.model, &run.report, &path)?;
                    }
                    print_json(&run.report, args.pretty)
                }
                None => {
                    let mut reports = Vec::new();
                    for asset_id in asset_ids(&measurements) {
                        match forecaster.forecast(&asset_id, &measurements, threshold, days_ahead) {
                            Ok(run) => reports.push(run.report),
                            Err(e) => warn!(asset_id = %asset_id, error = %e, "Skipping asset"),
                        }
                    }
                    info!(assets = reports.len(), "Forecast complete");
                    print_json(&reports, args.pretty)
                }
            }
        }

        SubCommand::MaintenanceDate { input, asset, threshold } => {
            let measurements = read_measurements(&input)?;
            let estimate = forecaster
                .maintenance_date(&asset, &measurements, threshold)
                .with_context(|| format!("Maintenance estimate failed for {asset}"))?;
            print_json(&estimate, args.pretty)
        }

        SubCommand::Predict { model, days } => {
            let saved = checkpoint::load_from_disk(&model)
                .with_context(|| format!("Failed to load model {}", model.display()))?;
            let curve = saved.to_curve()?;
            let predictions: Vec<Prediction> = days
                .iter()
                .zip(curve.predict(&days))
                .map(|(&elapsed_day, wear_mm)| Prediction { elapsed_day, wear_mm })
                .collect();
            print_json(&predictions, args.pretty)
        }

        SubCommand::Compare { input, since } => {
            let measurements = read_measurements(&input)?;
            let report = FleetComparator::compare(&measurements, since, &forecaster.config().comparison);
            print_json(&report, args.pretty)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn read_measurements(path: &Path) -> Result<Vec<Measurement>> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let measurements: Vec<Measurement> = serde_json::from_slice(&data)
        .with_context(|| format!("Invalid measurements JSON in {}", path.display()))?;
    info!(path = %path.display(), count = measurements.len(), "Loaded measurements");
    Ok(measurements)
}

fn asset_ids(measurements: &[Measurement]) -> BTreeSet<String> {
    measurements.iter().map(|m| m.asset_id.clone()).collect()
}

fn save_model_checkpoint(
    model: &WearPredictionModel,
    report: &wearcast::ForecastReport,
    path: &Path,
) -> Result<()> {
    let curve = model.curve()?;
    let metadata = CheckpointMetadata::new(&report.asset_id, report.fitted_points, Some(report.r_squared));
    checkpoint::save_to_disk(&ModelCheckpoint::new(curve, metadata), path)
        .with_context(|| format!("Failed to save model to {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write to stdout")?;
    Ok(())
}
