//! Forecast Regression Tests
//!
//! End-to-end checks of the forecasting engine through the public API:
//! segmentation, degree selection, threshold crossing, persistence and the
//! full measurement-to-report pipeline.

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use wearcast::config::ThresholdConfig;
use wearcast::forecast::checkpoint::{self, CheckpointMetadata, ModelCheckpoint};
use wearcast::forecast::{candidate_degrees, search_best_degree, FittedCurve};
use wearcast::simulation::{FleetSpec, WearSimulator};
use wearcast::{
    FleetComparator, ForecastConfig, ForecastError, Measurement, RegimePoint, RegimeSegmenter,
    RegimeSelection, ThresholdCrossing, WearForecaster, WearPredictionModel,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn points(raw: &[(i64, f64)]) -> Vec<RegimePoint> {
    raw.iter().copied().map(RegimePoint::from).collect()
}

// ============================================================================
// Curve Fitting
// ============================================================================

#[test]
fn linear_series_selects_degree_one() {
    for (intercept, slope) in [(0.0, 0.05), (2.5, 0.2), (10.0, 1.0)] {
        let days: Vec<f64> = (0..12).map(|i| f64::from(i) * 84.0).collect();
        let wear: Vec<f64> = days.iter().map(|d| intercept + slope * d).collect();

        let outcome = search_best_degree(&days, &wear, &candidate_degrees(days.len(), 3)).unwrap();
        assert_eq!(outcome.degree, 1, "a={intercept} b={slope}");
        assert!((outcome.r_squared - 1.0).abs() < 1e-9);
    }
}

#[test]
fn pure_quadratic_prefers_degree_two() {
    let days = [0.0, 1.0, 2.0, 3.0, 4.0];
    let wear = [0.0, 1.0, 4.0, 9.0, 16.0];

    let outcome = search_best_degree(&days, &wear, &[1, 2, 3]).unwrap();
    assert!(outcome.r_squared > 0.999);
    assert_eq!(outcome.degree, 2);

    let linear = outcome.candidates.iter().find(|c| c.degree == 1).unwrap();
    let quadratic = outcome.candidates.iter().find(|c| c.degree == 2).unwrap();
    assert!(quadratic.r_squared.unwrap() > 0.999);
    assert!(
        linear.r_squared.unwrap() < 0.96,
        "degree 1 should be markedly worse, got {:?}",
        linear.r_squared
    );
}

#[test]
fn noisy_linear_wear_fits_well() {
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let days: Vec<f64> = (0..20).map(|i| f64::from(i) * 30.0).collect();
    let wear: Vec<f64> = days.iter().map(|d| 0.5 + 0.06 * d + noise.sample(&mut rng)).collect();

    let outcome = search_best_degree(&days, &wear, &candidate_degrees(days.len(), 3)).unwrap();
    assert!(outcome.r_squared > 0.99, "R² was {}", outcome.r_squared);
}

#[test]
fn fit_boundary_two_versus_three_points() {
    let err = FittedCurve::fit(&[0.0, 1.0], &[1.0, 2.0], 1).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { points: 2, required: 3 }));

    let mut model = WearPredictionModel::new(1);
    model.fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
    assert!(model.is_trained());
}

// ============================================================================
// Segmentation
// ============================================================================

#[test]
fn single_drop_gives_two_regimes() {
    let input = points(&[(0, 2.0), (30, 4.0), (60, 6.0), (90, 1.0)]);
    let segmenter = RegimeSegmenter::default();

    let regimes = segmenter.split(&input);
    assert_eq!(regimes.len(), 2);
    assert_eq!(regimes[0].points, points(&[(0, 2.0), (30, 4.0), (60, 6.0)]));
    assert_eq!(regimes[1].points, points(&[(90, 1.0)]));

    let window = segmenter.select_for_forecast(&input).unwrap();
    assert_eq!(window.selection, RegimeSelection::FullSeriesFallback);
    assert_eq!(window.points.points, input);
}

#[test]
fn fallback_forecast_uses_default_degree_not_interpolation() {
    let start = date(2024, 1, 1);
    let data: Vec<Measurement> = [(0, 2.0), (30, 4.0), (60, 6.0), (90, 1.0)]
        .into_iter()
        .map(|(day, wear)| Measurement::new("TUL1-INDROL-04", start + Days::new(day), wear))
        .collect();

    let run = WearForecaster::default()
        .forecast("TUL1-INDROL-04", &data, None, Some(90))
        .unwrap();
    assert_eq!(run.report.selection, RegimeSelection::FullSeriesFallback);
    assert_eq!(run.report.degree, 2, "fallback must not search up to the interpolating degree");
    assert!(run.report.r_squared < 0.9);

    // Quadratic through the fallback is -30.45 mm at day 180; the cubic
    // interpolant would be far lower.
    let last = run.report.projection.last().unwrap();
    assert_eq!(last.elapsed_day, 180);
    assert!((last.wear_mm + 30.45).abs() < 1e-6, "got {}", last.wear_mm);
}

#[test]
fn no_drop_gives_one_regime_equal_to_input() {
    let input = RegimeSegmenter::normalize_points(&points(&[(20, 3.0), (0, 1.0), (10, 2.0)]));
    let regimes = RegimeSegmenter::default().split(&input);
    assert_eq!(regimes.len(), 1);
    assert_eq!(regimes[0].points, input);
}

#[test]
fn normalization_is_idempotent() {
    let series = RegimeSegmenter::normalize(&[
        (date(2024, 3, 1), 3.0),
        (date(2024, 1, 1), 1.0),
        (date(2024, 3, 1), 3.5),
        (date(2024, 2, 1), 2.0),
    ])
    .unwrap();
    let again = RegimeSegmenter::normalize_points(&series.points);
    assert_eq!(again, series.points);
    assert_eq!(series.points.len(), 3);
}

// ============================================================================
// Threshold Crossing
// ============================================================================

#[test]
fn crossing_index_and_date_from_start_day() {
    // wear = day; the window starts at day 9 on 2024-01-01.
    let mut model = WearPredictionModel::new(1);
    model.fit(&[0.0, 4.0, 8.0], &[0.0, 4.0, 8.0]).unwrap();

    let crossing = model
        .calculate_threshold_crossing(9, 5, date(2024, 1, 1), 11.5)
        .unwrap();
    assert_eq!(
        crossing,
        ThresholdCrossing::Reached { date: date(2024, 1, 4), days_until: 3 }
    );
}

#[test]
fn crossing_not_reached_when_projection_stays_low() {
    let mut model = WearPredictionModel::new(1);
    model.fit(&[0.0, 10.0, 20.0], &[1.0, 1.5, 2.0]).unwrap();

    let crossing = model
        .calculate_threshold_crossing(20, 90, date(2024, 1, 1), 100.0)
        .unwrap();
    assert_eq!(crossing, ThresholdCrossing::NotReached);
}

#[test]
fn untrained_model_is_a_usage_error() {
    let model = WearPredictionModel::new(2);
    assert_eq!(model.predict(&[0.0]).unwrap_err(), ForecastError::ModelNotTrained);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn checkpoint_round_trip_predicts_exactly() {
    let days: Vec<f64> = (0..9).map(|i| f64::from(i) * 84.0).collect();
    let wear: Vec<f64> = days.iter().map(|d| 0.3 + 0.05 * d + 2e-5 * d * d).collect();
    let mut model = WearPredictionModel::new(2);
    model.fit(&days, &wear).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let cp = ModelCheckpoint::new(model.curve().unwrap(), CheckpointMetadata::new("T-INDPIN-01", 9, None));
    checkpoint::save_to_disk(&cp, &path).unwrap();

    let restored = checkpoint::load_from_disk(&path).unwrap().to_curve().unwrap();
    let sample_days: Vec<f64> = (0..=672).map(f64::from).collect();
    assert_eq!(restored.predict(&sample_days), model.predict(&sample_days).unwrap());

    let bytes = model.save(CheckpointMetadata::default()).unwrap();
    let mut reloaded = WearPredictionModel::new(1);
    reloaded.load(&bytes).unwrap();
    assert_eq!(reloaded.predict(&sample_days).unwrap(), model.predict(&sample_days).unwrap());
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn forecast_after_reset_ignores_old_regime() {
    let start = date(2023, 1, 1);
    let mut data = Vec::new();
    // Steep wear before service...
    for (i, wear) in [2.0, 10.0, 20.0, 30.0].iter().enumerate() {
        data.push(Measurement::new("TUL1-INDPIN-01", start + Days::new(84 * i as u64), *wear));
    }
    // ...gentle wear after it.
    for (i, wear) in [0.5, 1.0, 1.5, 2.0].iter().enumerate() {
        data.push(Measurement::new("TUL1-INDPIN-01", start + Days::new(336 + 84 * i as u64), *wear));
    }

    let run = WearForecaster::default()
        .forecast("TUL1-INDPIN-01", &data, None, Some(90))
        .unwrap();
    assert_eq!(run.report.regime_count, 2);
    assert_eq!(run.report.selection, RegimeSelection::LatestRegime);
    assert_eq!(run.report.fitted_points, 4);
    assert_eq!(run.report.degree, 1);
    assert_eq!(run.report.crossing, ThresholdCrossing::NotReached);
    assert!(run.report.projection.iter().all(|p| p.wear_mm < 5.0));
}

#[test]
fn forecast_with_too_few_readings_fails() {
    let data = vec![
        Measurement::new("X", date(2024, 1, 1), 1.0),
        Measurement::new("X", date(2024, 2, 1), 2.0),
        Measurement::new("X", date(2024, 2, 1), 2.5),
    ];
    let err = WearForecaster::default().forecast("X", &data, None, None).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { points: 2, .. }));
}

#[test]
fn simulated_fleet_forecasts_and_compares() {
    let spec = FleetSpec::new(date(2025, 6, 30));
    let data = WearSimulator::from_seed(2024, ThresholdConfig::default()).generate_fleet(&spec);
    let forecaster = WearForecaster::new(ForecastConfig::default());

    let mut forecasted = 0;
    for asset_id in ["TUL1-INDPIN-01", "TUL2-INDROL-05", "TUL3-INDPIN-08"] {
        let run = forecaster.forecast(asset_id, &data, None, None).unwrap();
        assert!(run.report.r_squared.is_finite());
        assert!(run.report.degree >= 1 && run.report.degree <= 3);
        assert_eq!(run.report.projection.last().map(|p| p.elapsed_day), Some(
            (run.report.last_date - run.report.first_date).num_days() + 90
        ));
        forecasted += 1;
    }
    assert_eq!(forecasted, 3);

    let report = FleetComparator::compare(&data, None, &ForecastConfig::default().comparison);
    assert_eq!(report.assets.len() + report.skipped_assets.len(), 48);
    assert!(report.median_rate.is_some());
}
