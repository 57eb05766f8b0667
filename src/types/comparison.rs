//! Fleet wear-rate comparison output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Average wear rate of one asset over the compared window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetWearRate {
    pub asset_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub span_days: i64,
    pub measurement_count: usize,
    /// (last wear - first wear) / span (mm per day)
    pub wear_rate_mm_per_day: f64,
    pub is_outlier: bool,
}

/// Wear rates across a set of assets with MAD-based outlier flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetComparisonReport {
    /// Rated assets, fastest-wearing first
    pub assets: Vec<AssetWearRate>,
    /// Assets skipped for too few readings or a zero-day span
    pub skipped_assets: Vec<String>,
    /// Present only when enough assets were rated to flag outliers
    pub median_rate: Option<f64>,
    pub median_absolute_deviation: Option<f64>,
    pub outlier_threshold: Option<f64>,
}

impl FleetComparisonReport {
    pub fn outliers(&self) -> impl Iterator<Item = &AssetWearRate> {
        self.assets.iter().filter(|a| a.is_outlier)
    }
}
