//! Synthetic Wear Data
//!
//! Generates quarterly wear measurements for a fleet of indexer pinions and
//! support rollers, including maintenance resets, for exercising the
//! forecaster without a measurement store.
//!
//! Each asset wears at a base rate (mm per 30 days) modulated by three
//! overlapping cycles plus noise. Wear resets to zero when it reaches 90% of
//! the asset's threshold or when a scheduled maintenance (1-2 per year) falls
//! between two readings. One pinion and one roller per unit wear faster.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand_distr::{Distribution, Uniform};
use tracing::debug;

use crate::config::ThresholdConfig;
use crate::types::{AssetKind, Measurement};

// ============================================================================
// Generator Constants
// ============================================================================

/// Days between measurements (12 weeks)
pub const MEASUREMENT_INTERVAL_DAYS: u64 = 84;
/// Pinion base wear rate range (mm per 30 days)
const PINION_RATE_RANGE: (f64, f64) = (1.8, 2.4);
/// Roller base wear rate range (mm per 30 days)
const ROLLER_RATE_RANGE: (f64, f64) = (1.2, 1.8);
/// Rate multiplier for the fast-wearing pinion
const PINION_OUTLIER_FACTOR: f64 = 1.5;
/// Rate multiplier for the fast-wearing roller
const ROLLER_OUTLIER_FACTOR: f64 = 1.4;
/// Fraction of the wear threshold at which maintenance is performed
const MAINTENANCE_FRACTION: f64 = 0.9;
/// Fraction of the threshold above which a fast asset is noted
const MONITORING_FRACTION: f64 = 0.6;
/// Scheduled maintenance never falls this soon after installation
const MIN_DAYS_BEFORE_SCHEDULED: i64 = 60;
/// Installation dates are jittered by up to this many days
const INSTALL_JITTER_DAYS: u64 = 30;

/// Shape of the generated fleet.
#[derive(Debug, Clone)]
pub struct FleetSpec {
    /// Unit identifiers; each carries `assets_per_kind` pinions and rollers
    pub units: Vec<String>,
    pub assets_per_kind: u32,
    /// Last possible measurement date
    pub end_date: NaiveDate,
    /// Years of history before `end_date`
    pub years: u32,
}

impl FleetSpec {
    pub fn new(end_date: NaiveDate) -> Self {
        Self {
            units: vec!["TUL1".to_string(), "TUL2".to_string(), "TUL3".to_string()],
            assets_per_kind: 8,
            end_date,
            years: 3,
        }
    }
}

/// Seeded wear-series generator.
pub struct WearSimulator {
    rng: StdRng,
    thresholds: ThresholdConfig,
    noise: Uniform<f64>,
}

impl WearSimulator {
    /// Reproducible generator: the same seed yields the same fleet.
    pub fn from_seed(seed: u64, thresholds: ThresholdConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), thresholds)
    }

    pub fn from_entropy(thresholds: ThresholdConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), thresholds)
    }

    fn with_rng(rng: StdRng, thresholds: ThresholdConfig) -> Self {
        Self {
            rng,
            thresholds,
            noise: Uniform::new_inclusive(-0.05, 0.05),
        }
    }

    /// Measurements for every asset in the fleet, grouped by asset.
    pub fn generate_fleet(&mut self, spec: &FleetSpec) -> Vec<Measurement> {
        let history_days = u64::from(spec.years) * 365;
        let history_start = spec
            .end_date
            .checked_sub_days(Days::new(history_days))
            .unwrap_or(NaiveDate::MIN);

        let mut measurements = Vec::new();
        for unit in &spec.units {
            let pinion_outlier = self.rng.gen_range(1..=spec.assets_per_kind.max(1));
            let roller_outlier = self.rng.gen_range(1..=spec.assets_per_kind.max(1));
            debug!(unit = %unit, pinion_outlier, roller_outlier, "Generating unit");

            for (kind, outlier) in [(AssetKind::Pinion, pinion_outlier), (AssetKind::Roller, roller_outlier)] {
                for n in 1..=spec.assets_per_kind {
                    let asset_id = format!("{unit}-{}-{n:02}", kind.code());
                    let jitter = self.rng.gen_range(0..=INSTALL_JITTER_DAYS);
                    let install_date = history_start + Days::new(jitter);
                    measurements.extend(self.generate_asset(
                        &asset_id,
                        kind,
                        install_date,
                        spec.end_date,
                        n == outlier,
                    ));
                }
            }
        }
        measurements
    }

    /// One asset's 12-weekly measurements from installation to `end_date`.
    #[allow(clippy::cast_precision_loss)]
    pub fn generate_asset(
        &mut self,
        asset_id: &str,
        kind: AssetKind,
        install_date: NaiveDate,
        end_date: NaiveDate,
        is_outlier: bool,
    ) -> Vec<Measurement> {
        let threshold = self.thresholds.for_kind(kind);
        let maintenance_threshold = threshold * MAINTENANCE_FRACTION;

        let (lo, hi) = match kind {
            AssetKind::Roller => ROLLER_RATE_RANGE,
            AssetKind::Pinion | AssetKind::Other => PINION_RATE_RANGE,
        };
        let mut base_rate = self.rng.gen_range(lo..=hi);
        if is_outlier {
            base_rate *= match kind {
                AssetKind::Roller => ROLLER_OUTLIER_FACTOR,
                AssetKind::Pinion | AssetKind::Other => PINION_OUTLIER_FACTOR,
            };
        }

        let scheduled = self.scheduled_maintenance(install_date, end_date);

        let mut measurements = Vec::new();
        let mut last_maintenance = install_date;
        let mut accumulated = 0.0;
        let mut previous_wear = 0.0;
        let mut resets = 0_u32;

        let mut date = install_date + Days::new(MEASUREMENT_INTERVAL_DAYS);
        while date <= end_date {
            let days_since = (date - last_maintenance).num_days() as f64;
            let rate = base_rate * self.wear_multiplier(days_since);
            accumulated += rate * days_since / 30.0;
            let mut wear = round2(accumulated);

            let scheduled_before = scheduled
                .range(last_maintenance.succ_opt().unwrap_or(last_maintenance)..date)
                .next_back()
                .copied();

            let notes = if let Some(serviced) = scheduled_before {
                last_maintenance = serviced;
                accumulated = 0.0;
                wear = 0.0;
                resets += 1;
                format!(
                    "Scheduled maintenance performed on {serviced}. Wear reset from approximately {previous_wear:.2} mm to 0 mm."
                )
            } else if wear >= maintenance_threshold {
                let note = format!(
                    "Maintenance performed as wear reached {wear:.2} mm (threshold: {maintenance_threshold:.2} mm). Wear reset to 0 mm."
                );
                last_maintenance = date;
                accumulated = 0.0;
                wear = 0.0;
                resets += 1;
                note
            } else if is_outlier && wear > threshold * MONITORING_FRACTION {
                format!("Higher than expected wear rate ({rate:.2} mm/month), monitoring closely")
            } else {
                format!("Regular 12-week measurement, current wear rate: {rate:.2} mm/month")
            };

            previous_wear = wear;
            measurements.push(Measurement::new(asset_id, date, wear).with_notes(notes));
            date = date + Days::new(MEASUREMENT_INTERVAL_DAYS);
        }

        debug!(
            asset_id,
            measurements = measurements.len(),
            resets,
            base_rate,
            is_outlier,
            "Generated asset series"
        );
        measurements
    }

    /// Cyclical rate multiplier, roughly 0.7 to 1.3, with a little noise.
    fn wear_multiplier(&mut self, days: f64) -> f64 {
        use std::f64::consts::PI;

        let long = (days / 180.0 * PI).sin();
        let medium = (days / 60.0 * PI).sin() * 0.3;
        let short = (days / 20.0 * PI).sin() * 0.1;
        let multiplier = 1.0 + (long + medium + short) * 0.3 + self.noise.sample(&mut self.rng);
        round2(multiplier)
    }

    /// One or two maintenance dates per full year of service.
    fn scheduled_maintenance(&mut self, install_date: NaiveDate, end_date: NaiveDate) -> BTreeSet<NaiveDate> {
        let years = ((end_date - install_date).num_days() / 365).clamp(0, 3);
        let mut dates = BTreeSet::new();

        for year in 0..years.unsigned_abs() {
            let year_start = install_date + Days::new(year * 365);
            for _ in 0..self.rng.gen_range(1..=2) {
                let candidate = year_start + Days::new(self.rng.gen_range(0..=364));
                if candidate <= end_date && (candidate - install_date).num_days() >= MIN_DAYS_BEFORE_SCHEDULED {
                    dates.insert(candidate);
                }
            }
        }
        dates
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
