//! Config Validation Tests
//!
//! Typo detection and range validation for `wearcast.toml`, exercised
//! independently from the forecasting pipeline.

use wearcast::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use wearcast::config::{ConfigError, ForecastConfig};
use wearcast::{AssetKind, Measurement, WearForecaster};

// ============================================================================
// Typo Detection Tests
// ============================================================================

#[test]
fn typo_in_threshold_warns_with_suggestion() {
    let toml_str = r#"
[thresholds]
roler_mm = 40.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("roler_mm"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("thresholds.roller_mm"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[horizn]
days_ahead = 30
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "horizn"));
    let section = warnings.iter().find(|w| w.field == "horizn").unwrap();
    assert_eq!(section.suggestion.as_deref(), Some("horizon"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[segmentation]
reset_drop_ratio = 0.4
min_regime_points = 4

[fitting]
max_degree = 3
default_degree = 2

[horizon]
days_ahead = 120
maintenance_horizon_days = 730
report_every_n_days = 7

[thresholds]
pinion_mm = 55.0
roller_mm = 40.0
default_mm = 50.0

[comparison]
outlier_mad_multiplier = 2.5
min_assets_for_outliers = 5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );

    let config = ForecastConfig::from_toml_str(toml_str).unwrap();
    assert!((config.segmentation.reset_drop_ratio - 0.4).abs() < f64::EPSILON);
    assert_eq!(config.horizon.maintenance_horizon_days, 730);
}

#[test]
fn multiple_typos_all_warned() {
    let toml_str = r#"
[fitting]
max_degre = 2

[comparison]
outlier_mad_multipler = 2.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 2, "Expected 2 warnings for 2 typos, got {}", warnings.len());
}

#[test]
fn unknown_keys_do_not_fail_the_load() {
    let config = ForecastConfig::from_toml_str("[horizon]\ndays_ahead = 45\nextra = true\n").unwrap();
    assert_eq!(config.horizon.days_ahead, 45);
}

#[test]
fn known_keys_cover_every_serialized_field() {
    let toml_str = ForecastConfig::default().to_toml().unwrap();
    let known = known_config_keys();
    assert!(
        validate_unknown_keys(&toml_str).is_empty(),
        "default config serializes keys missing from known_config_keys ({} known)",
        known.len()
    );
}

#[test]
fn suggestion_requires_small_edit_distance() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("fitting.default_degre", &known).as_deref(),
        Some("fitting.default_degree")
    );
    assert!(suggest_correction("totally.unrelated.key", &known).is_none());
}

// ============================================================================
// Range Validation Tests
// ============================================================================

#[test]
fn default_config_passes_validation() {
    assert!(validate_ranges(&ForecastConfig::default()).is_empty());
    assert!(ForecastConfig::default().validate().is_ok());
}

#[test]
fn out_of_range_values_are_all_reported() {
    let toml_str = r#"
[segmentation]
reset_drop_ratio = 1.5
min_regime_points = 2

[thresholds]
pinion_mm = -1.0
"#;
    match ForecastConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 3, "got {errors:?}");
            assert!(errors.iter().any(|e| e.contains("reset_drop_ratio")));
            assert!(errors.iter().any(|e| e.contains("min_regime_points")));
            assert!(errors.iter().any(|e| e.contains("pinion_mm")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = ForecastConfig::from_toml_str("[horizon]\ndays_ahead = \"soon\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

// ============================================================================
// Config Flows Into Forecasts
// ============================================================================

#[test]
fn thresholds_follow_asset_kind() {
    let config = ForecastConfig::from_toml_str("[thresholds]\npinion_mm = 20.0\nroller_mm = 10.0\n").unwrap();
    assert!((config.thresholds.for_kind(AssetKind::Pinion) - 20.0).abs() < f64::EPSILON);
    assert!((config.thresholds.for_kind(AssetKind::Roller) - 10.0).abs() < f64::EPSILON);

    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let data: Vec<Measurement> = (0..5_u64)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let wear = 1.0 + 2.0 * i as f64;
            Measurement::new("TUL1-INDROL-02", start + chrono::Days::new(i * 30), wear)
        })
        .collect();

    let run = WearForecaster::new(config)
        .forecast("TUL1-INDROL-02", &data, None, None)
        .unwrap();
    assert!((run.report.threshold_mm - 10.0).abs() < f64::EPSILON);
    assert!(run.report.crossing.is_reached());
}
