//! Fleet Wear-Rate Comparison
//!
//! Rates every asset by its average wear per day over the compared window
//! and flags the ones wearing unusually fast. An asset is an outlier when its
//! rate exceeds `median + k × MAD` across the fleet, where MAD is the median
//! absolute deviation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use statrs::statistics::{Data, Median};
use tracing::{debug, info};

use crate::config::ComparisonConfig;
use crate::types::{AssetWearRate, FleetComparisonReport, Measurement};

/// Fleet comparison engine
pub struct FleetComparator;

impl FleetComparator {
    /// Compare wear rates across every asset in `measurements`.
    ///
    /// `since` keeps only readings on or after that date, unless that would
    /// leave an asset with none, in which case its full history is used.
    /// Assets with fewer than two readings or a zero-day span are listed in
    /// `skipped_assets`.
    pub fn compare(
        measurements: &[Measurement],
        since: Option<NaiveDate>,
        config: &ComparisonConfig,
    ) -> FleetComparisonReport {
        let mut by_asset: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
        for m in measurements.iter().filter(|m| m.is_valid()) {
            by_asset.entry(m.asset_id.as_str()).or_default().push(m);
        }

        let mut report = FleetComparisonReport::default();
        for (asset_id, mut readings) in by_asset {
            readings.sort_by_key(|m| m.date);
            let readings = Self::apply_cutoff(readings, since);

            match Self::wear_rate(asset_id, &readings) {
                Some(rate) => report.assets.push(rate),
                None => {
                    debug!(asset_id, readings = readings.len(), "Asset skipped in comparison");
                    report.skipped_assets.push(asset_id.to_string());
                }
            }
        }

        if report.assets.len() >= config.min_assets_for_outliers.max(1) {
            Self::flag_outliers(&mut report, config.outlier_mad_multiplier);
        }

        report
            .assets
            .sort_by(|a, b| b.wear_rate_mm_per_day.total_cmp(&a.wear_rate_mm_per_day));

        info!(
            rated = report.assets.len(),
            skipped = report.skipped_assets.len(),
            outliers = report.outliers().count(),
            "Fleet comparison complete"
        );
        report
    }

    fn apply_cutoff(readings: Vec<&Measurement>, since: Option<NaiveDate>) -> Vec<&Measurement> {
        let Some(cutoff) = since else {
            return readings;
        };
        let recent: Vec<&Measurement> = readings.iter().copied().filter(|m| m.date >= cutoff).collect();
        if recent.is_empty() {
            readings
        } else {
            recent
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn wear_rate(asset_id: &str, readings: &[&Measurement]) -> Option<AssetWearRate> {
        let (first, last) = match readings {
            [first, .., last] => (*first, *last),
            _ => return None,
        };
        let span_days = (last.date - first.date).num_days();
        if span_days <= 0 {
            return None;
        }

        Some(AssetWearRate {
            asset_id: asset_id.to_string(),
            first_date: first.date,
            last_date: last.date,
            span_days,
            measurement_count: readings.len(),
            wear_rate_mm_per_day: (last.wear_mm - first.wear_mm) / span_days as f64,
            is_outlier: false,
        })
    }

    fn flag_outliers(report: &mut FleetComparisonReport, multiplier: f64) {
        let rates: Vec<f64> = report.assets.iter().map(|a| a.wear_rate_mm_per_day).collect();
        let median = Data::new(rates.clone()).median();
        let deviations: Vec<f64> = rates.iter().map(|r| (r - median).abs()).collect();
        let mad = Data::new(deviations).median();
        let threshold = median + multiplier * mad;

        for asset in &mut report.assets {
            asset.is_outlier = asset.wear_rate_mm_per_day > threshold;
        }

        report.median_rate = Some(median);
        report.median_absolute_deviation = Some(mad);
        report.outlier_threshold = Some(threshold);
    }
}
