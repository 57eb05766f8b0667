//! System-wide default constants.
//!
//! Centralises the forecasting heuristics so `ForecastConfig` defaults and
//! library fallbacks agree. Grouped by subsystem.

// ============================================================================
// Segmentation
// ============================================================================

/// A reading below this fraction of the previous reading is a maintenance reset.
///
/// 0.5 = a drop of more than 50 %.
pub const RESET_DROP_RATIO: f64 = 0.5;

// ============================================================================
// Fitting
// ============================================================================

/// Minimum points required to fit a wear curve.
pub const MIN_FIT_POINTS: usize = 3;

/// Highest polynomial degree tried by the degree search.
pub const MAX_SEARCH_DEGREE: usize = 3;

/// Degree of a model constructed without a degree search.
pub const DEFAULT_DEGREE: usize = 2;

// ============================================================================
// Horizons
// ============================================================================

/// Forecast projection window (days past the latest measurement).
pub const DAYS_AHEAD: u32 = 90;

/// Maintenance-date lookahead. 365 = one year.
pub const MAINTENANCE_HORIZON_DAYS: u32 = 365;

/// Projection table sampling interval (days).
pub const REPORT_EVERY_N_DAYS: u32 = 10;

// ============================================================================
// Thresholds (mm)
// ============================================================================

/// Indexer pinion wear threshold.
pub const PINION_THRESHOLD_MM: f64 = 60.0;

/// Index support roller wear threshold.
pub const ROLLER_THRESHOLD_MM: f64 = 45.0;

/// Threshold for assets of unknown kind.
pub const DEFAULT_THRESHOLD_MM: f64 = 60.0;

// ============================================================================
// Fleet Comparison
// ============================================================================

/// MAD multiplier above the median wear rate that marks an outlier.
pub const OUTLIER_MAD_MULTIPLIER: f64 = 3.0;

/// Minimum rated assets before outliers are flagged.
pub const MIN_ASSETS_FOR_OUTLIERS: usize = 3;
