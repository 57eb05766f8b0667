//! Wear forecasting pipeline.
//!
//! measurements → normalize → segment → degree search → projection and
//! threshold crossing. The full-series fallback is fit at
//! `fitting.default_degree` instead of searched. Every request fits its own model; nothing is cached
//! between calls.

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use super::degree_search::{self, DegreeCandidate};
use super::model::{FittedCurve, WearPredictionModel};
use super::segmenter::RegimeSegmenter;
use super::ForecastError;
use crate::config::{defaults, ForecastConfig};
use crate::types::{
    AssetKind, ForecastReport, MaintenanceEstimate, Measurement, ProjectionPoint, RegimeSelection,
    ThresholdCrossing,
};

/// A completed forecast: the report plus the model behind it.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub report: ForecastReport,
    pub model: WearPredictionModel,
    /// Every degree tried and its in-sample R²
    pub candidates: Vec<DegreeCandidate>,
}

/// Runs forecasts for individual assets.
#[derive(Debug, Clone, Default)]
pub struct WearForecaster {
    config: ForecastConfig,
}

impl WearForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast wear for `asset_id`.
    ///
    /// Measurements for other assets are ignored, as are negative or
    /// non-finite readings. `threshold_mm` defaults to the asset kind's
    /// configured threshold and `days_ahead` to `horizon.days_ahead`.
    ///
    /// # Errors
    /// `InsufficientData` when fewer than 3 distinct days remain,
    /// `InvalidInput` for a bad threshold or horizon, or any fit error if
    /// no candidate degree could be fit.
    pub fn forecast(
        &self,
        asset_id: &str,
        measurements: &[Measurement],
        threshold_mm: Option<f64>,
        days_ahead: Option<u32>,
    ) -> Result<ForecastRun, ForecastError> {
        let asset_kind = AssetKind::from_asset_id(asset_id);
        let threshold_mm = threshold_mm.unwrap_or_else(|| self.config.thresholds.for_kind(asset_kind));
        let days_ahead = days_ahead.unwrap_or(self.config.horizon.days_ahead);

        if !threshold_mm.is_finite() {
            return Err(ForecastError::InvalidInput(format!(
                "threshold {threshold_mm} is not a finite wear depth"
            )));
        }
        if days_ahead == 0 {
            return Err(ForecastError::InvalidInput("days_ahead must be > 0".to_string()));
        }

        let readings = Self::readings_for(asset_id, measurements);
        let measurement_count = readings.len();

        let series = RegimeSegmenter::normalize(&readings).ok_or(ForecastError::InsufficientData {
            points: 0,
            required: defaults::MIN_FIT_POINTS,
        })?;
        let segmenter = RegimeSegmenter::from_config(&self.config.segmentation);
        let window = segmenter.select_for_forecast(&series.points)?;

        let days = window.points.days();
        let wear = window.points.wear();
        let outcome = match window.selection {
            RegimeSelection::LatestRegime => {
                let degrees = degree_search::candidate_degrees(days.len(), self.config.fitting.max_degree);
                degree_search::search_best_degree(&days, &wear, &degrees)?
            }
            RegimeSelection::FullSeriesFallback => {
                degree_search::fit_fixed_degree(&days, &wear, self.config.fitting.default_degree)?
            }
        };

        info!(
            asset_id,
            regimes = window.regime_count,
            selection = ?window.selection,
            points = days.len(),
            degree = outcome.degree,
            r2 = outcome.r_squared,
            "Fitted wear model"
        );

        let (last_day, last_date, current_wear_mm) = match (series.points.last(), series.last_date()) {
            (Some(last), Some(date)) => (last.elapsed_day, date, last.wear_mm),
            _ => return Err(ForecastError::InvalidInput("measurement dates out of range".to_string())),
        };

        let projection = self.projection(&outcome.curve, last_day, last_date, days_ahead)?;
        let crossing = outcome
            .curve
            .threshold_crossing(last_day, days_ahead, last_date, threshold_mm)?;
        log_crossing(asset_id, threshold_mm, &crossing);

        let report = ForecastReport {
            asset_id: asset_id.to_string(),
            asset_kind,
            measurement_count,
            first_date: series.origin,
            last_date,
            current_wear_mm,
            regime_count: window.regime_count,
            selection: window.selection,
            fitted_points: window.points.len(),
            degree: outcome.degree,
            r_squared: outcome.r_squared,
            threshold_mm,
            days_ahead,
            projection,
            crossing,
        };

        Ok(ForecastRun {
            report,
            model: WearPredictionModel::from_curve(outcome.curve),
            candidates: outcome.candidates,
        })
    }

    /// When will `asset_id` reach its threshold, looking
    /// `horizon.maintenance_horizon_days` ahead of the latest reading.
    ///
    /// # Errors
    /// Same as [`forecast`](Self::forecast).
    pub fn maintenance_date(
        &self,
        asset_id: &str,
        measurements: &[Measurement],
        threshold_mm: Option<f64>,
    ) -> Result<MaintenanceEstimate, ForecastError> {
        let horizon_days = self.config.horizon.maintenance_horizon_days;
        let run = self.forecast(asset_id, measurements, threshold_mm, Some(horizon_days))?;
        let report = run.report;

        Ok(MaintenanceEstimate {
            asset_id: report.asset_id,
            current_wear_mm: report.current_wear_mm,
            threshold_mm: report.threshold_mm,
            horizon_days,
            last_date: report.last_date,
            crossing: report.crossing,
        })
    }

    fn readings_for(asset_id: &str, measurements: &[Measurement]) -> Vec<(NaiveDate, f64)> {
        measurements
            .iter()
            .filter(|m| m.asset_id == asset_id)
            .filter(|m| {
                let valid = m.is_valid();
                if !valid {
                    warn!(asset_id, date = %m.date, wear_mm = m.wear_mm, "Skipping invalid measurement");
                }
                valid
            })
            .map(|m| (m.date, m.wear_mm))
            .collect()
    }

    /// Sample every `report_every_n_days`-th future day plus the last one.
    #[allow(clippy::cast_precision_loss)]
    fn projection(
        &self,
        curve: &FittedCurve,
        last_day: i64,
        last_date: NaiveDate,
        days_ahead: u32,
    ) -> Result<Vec<ProjectionPoint>, ForecastError> {
        let every = self.config.horizon.report_every_n_days.max(1);

        (1..=days_ahead)
            .filter(|offset| offset % every == 0 || *offset == days_ahead)
            .map(|offset| {
                let elapsed_day = last_day + i64::from(offset);
                let date = last_date
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or_else(|| {
                        ForecastError::InvalidInput(format!("{last_date} + {offset} days is out of range"))
                    })?;
                Ok(ProjectionPoint {
                    elapsed_day,
                    date,
                    wear_mm: curve.evaluate(elapsed_day as f64),
                })
            })
            .collect()
    }
}

fn log_crossing(asset_id: &str, threshold_mm: f64, crossing: &ThresholdCrossing) {
    match crossing {
        ThresholdCrossing::Reached { date, days_until } => {
            info!(asset_id, threshold_mm, %date, days_until, "Threshold crossing projected");
        }
        ThresholdCrossing::NotReached => {
            debug!(asset_id, threshold_mm, "Threshold not reached within horizon");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn linear_series(asset: &str, start: NaiveDate, n: u64, step: u64, rate: f64) -> Vec<Measurement> {
        (0..n)
            .map(|i| {
                let day = i * step;
                #[allow(clippy::cast_precision_loss)]
                let wear = 1.0 + rate * day as f64;
                Measurement::new(asset, start + Days::new(day), wear)
            })
            .collect()
    }

    #[test]
    fn test_linear_forecast_crossing() {
        // 1 mm + 0.1 mm/day, last reading day 40 (5.0 mm); 8 mm at day 70.
        let data = linear_series("U1-INDPIN-01", date(2024, 1, 1), 5, 10, 0.1);
        let run = WearForecaster::default()
            .forecast("U1-INDPIN-01", &data, Some(7.95), Some(90))
            .unwrap();

        let report = &run.report;
        assert_eq!(report.degree, 1);
        assert_eq!(report.selection, RegimeSelection::LatestRegime);
        assert_eq!(report.last_date, date(2024, 2, 10));
        assert_eq!(report.crossing.days_until(), Some(30));
        assert_eq!(report.crossing.date(), Some(date(2024, 3, 11)));
        assert!(run.model.is_trained());
    }

    #[test]
    fn test_projection_sampling() {
        let data = linear_series("U1-INDROL-01", date(2024, 1, 1), 5, 10, 0.1);
        let run = WearForecaster::default()
            .forecast("U1-INDROL-01", &data, None, Some(25))
            .unwrap();

        let offsets: Vec<i64> = run.report.projection.iter().map(|p| p.elapsed_day - 40).collect();
        assert_eq!(offsets, vec![10, 20, 25]);
        assert_eq!(run.report.projection[0].date, date(2024, 2, 20));
        assert!((run.report.threshold_mm - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_other_assets_and_invalid_readings_ignored() {
        let mut data = linear_series("A-INDPIN-01", date(2024, 1, 1), 4, 7, 0.2);
        data.extend(linear_series("B-INDPIN-01", date(2023, 1, 1), 10, 7, 5.0));
        data.push(Measurement::new("A-INDPIN-01", date(2024, 3, 1), f64::NAN));
        data.push(Measurement::new("A-INDPIN-01", date(2024, 3, 2), -1.0));

        let run = WearForecaster::default()
            .forecast("A-INDPIN-01", &data, None, None)
            .unwrap();
        assert_eq!(run.report.measurement_count, 4);
        assert_eq!(run.report.first_date, date(2024, 1, 1));
        assert_eq!(run.report.last_date, date(2024, 1, 22));
    }

    #[test]
    fn test_unknown_asset_is_insufficient() {
        let err = WearForecaster::default()
            .forecast("missing", &[], None, None)
            .unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { points: 0, required: 3 });
    }

    #[test]
    fn test_reset_uses_latest_regime() {
        let start = date(2024, 1, 1);
        let mut data = linear_series("U2-INDPIN-01", start, 4, 30, 0.2);
        // Serviced back down, then wearing again.
        data.extend([
            Measurement::new("U2-INDPIN-01", start + Days::new(120), 0.5),
            Measurement::new("U2-INDPIN-01", start + Days::new(150), 1.0),
            Measurement::new("U2-INDPIN-01", start + Days::new(180), 1.5),
        ]);

        let run = WearForecaster::default()
            .forecast("U2-INDPIN-01", &data, Some(100.0), None)
            .unwrap();
        assert_eq!(run.report.regime_count, 2);
        assert_eq!(run.report.selection, RegimeSelection::LatestRegime);
        assert_eq!(run.report.fitted_points, 3);
        assert!((run.report.current_wear_mm - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fallback_fits_default_degree() {
        // Reset on the last reading leaves a 1-point regime.
        let start = date(2024, 1, 1);
        let data: Vec<Measurement> = [(0, 2.0), (30, 4.0), (60, 6.0), (90, 1.0)]
            .into_iter()
            .map(|(day, wear)| Measurement::new("U4-INDPIN-01", start + Days::new(day), wear))
            .collect();

        let run = WearForecaster::default()
            .forecast("U4-INDPIN-01", &data, None, None)
            .unwrap();
        assert_eq!(run.report.selection, RegimeSelection::FullSeriesFallback);
        assert_eq!(run.report.fitted_points, 4);
        assert_eq!(run.report.degree, 2);
        assert!(run.report.r_squared > 0.8 && run.report.r_squared < 0.9, "R² {}", run.report.r_squared);
        assert_eq!(run.candidates.len(), 1);
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let data = linear_series("X", date(2024, 1, 1), 5, 10, 0.1);
        let err = WearForecaster::default()
            .forecast("X", &data, Some(f64::INFINITY), None)
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn test_maintenance_date_uses_long_horizon() {
        // 0.1 mm/day from 5.0 mm: 60 mm pinion threshold is 550 days out.
        let data = linear_series("U3-INDPIN-01", date(2024, 1, 1), 5, 10, 0.1);
        let estimate = WearForecaster::default()
            .maintenance_date("U3-INDPIN-01", &data, None)
            .unwrap();
        assert_eq!(estimate.horizon_days, 365);
        assert_eq!(estimate.crossing, ThresholdCrossing::NotReached);

        let estimate = WearForecaster::default()
            .maintenance_date("U3-INDPIN-01", &data, Some(30.05))
            .unwrap();
        assert_eq!(estimate.crossing.days_until(), Some(251));
    }
}
