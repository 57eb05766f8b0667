//! Wearcast: Wear Forecasting for Indexer Pinions and Support Rollers
//!
//! Forecasts when accumulated wear on a mechanical component will reach its
//! maintenance threshold, from the component's measurement history alone.
//!
//! ## Architecture
//!
//! - **Segmenter**: Splits the history at inferred maintenance resets
//! - **Curve Fitter**: Polynomial least squares with degree search by R²
//! - **Forecaster**: Projection, threshold crossing and maintenance date
//! - **Fleet Comparison**: Wear rates across assets with outlier flagging
//! - **Simulation**: Seeded synthetic fleet data

pub mod config;
pub mod types;
pub mod forecast;
pub mod simulation;

// Re-export configuration
pub use config::{ConfigError, ForecastConfig};

// Re-export commonly used types
pub use types::{
    AssetKind, AssetWearRate, FleetComparisonReport, ForecastReport, MaintenanceEstimate,
    Measurement, ProjectionPoint, Regime, RegimePoint, RegimeSelection, ThresholdCrossing,
};

// Re-export the forecasting engine
pub use forecast::{
    CheckpointError, FittedCurve, FleetComparator, ForecastError, ForecastRun, ModelCheckpoint,
    RegimeSegmenter, WearForecaster, WearPredictionModel,
};
