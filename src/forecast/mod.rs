//! Wear Forecasting Engine
//!
//! Fits a polynomial to the wear accumulated since the last maintenance
//! reset, projects it forward and finds the first day the projection reaches
//! a maintenance threshold.
//!
//! ## Key Features
//! - Reset detection from the data alone (no maintenance log needed)
//! - Degree search over small polynomials by in-sample R² (fixed degree on the fallback)
//! - Explicit untrained / trained model, threaded by the caller
//! - Versioned model checkpoints
//! - Fleet wear-rate comparison with MAD outlier flagging (statrs)
//!
//! ## Architecture
//! - `segmenter`: Normalize (dedup + sort) and split at resets
//! - `basis`: Polynomial feature expansion over a scaled day axis
//! - `least_squares`: Normal-equation solver
//! - `model`: `FittedCurve` and `WearPredictionModel`
//! - `degree_search`: R² scoring and best-degree selection
//! - `checkpoint`: Byte and on-disk persistence
//! - `forecaster`: Measurements → `ForecastReport` pipeline
//! - `comparison`: Fleet wear-rate comparison

mod error;
pub mod segmenter;
pub mod basis;
pub mod least_squares;
pub mod model;
pub mod degree_search;
pub mod checkpoint;
pub mod forecaster;
pub mod comparison;

// Re-export public types
pub use error::ForecastError;
pub use segmenter::{ForecastWindow, NormalizedSeries, RegimeSegmenter};
pub use basis::PolynomialBasis;
pub use model::{FittedCurve, WearPredictionModel};
pub use degree_search::{
    candidate_degrees, fit_fixed_degree, r_squared, search_best_degree, DegreeCandidate, DegreeSearchOutcome,
};
pub use checkpoint::{CheckpointError, CheckpointMetadata, ModelCheckpoint, CHECKPOINT_VERSION};
pub use forecaster::{ForecastRun, WearForecaster};
pub use comparison::FleetComparator;
