//! Forecast Configuration - operator-tunable forecasting parameters as TOML
//!
//! Every heuristic constant the forecasting pipeline uses is a field here.
//! Each struct implements `Default` with values matching `config::defaults`,
//! so behavior is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::AssetKind;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "WEARCAST_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "wearcast.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the wear forecasting engine.
///
/// Load with `ForecastConfig::load()` which searches:
/// 1. `$WEARCAST_CONFIG` env var
/// 2. `./wearcast.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Maintenance-reset detection
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Polynomial degree search
    #[serde(default)]
    pub fitting: FittingConfig,

    /// Projection horizons
    #[serde(default)]
    pub horizon: HorizonConfig,

    /// Maintenance thresholds per asset kind (mm)
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Fleet wear-rate comparison
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

impl ForecastConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WEARCAST_CONFIG` environment variable
    /// 2. `./wearcast.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded forecast config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded forecast config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Forecast config saved");
        Ok(())
    }

    /// Validate every section, collecting all violations before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Segmentation
// ============================================================================

/// Maintenance-reset detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// A measurement starts a new regime when its wear is below
    /// `previous_wear * reset_drop_ratio`. Must be in (0, 1].
    #[serde(default = "default_reset_drop_ratio")]
    pub reset_drop_ratio: f64,

    /// Points the latest regime needs before it is used on its own.
    /// Shorter latest regimes fall back to the whole series.
    #[serde(default = "default_min_regime_points")]
    pub min_regime_points: usize,
}

fn default_reset_drop_ratio() -> f64 { defaults::RESET_DROP_RATIO }
fn default_min_regime_points() -> usize { defaults::MIN_FIT_POINTS }

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            reset_drop_ratio: default_reset_drop_ratio(),
            min_regime_points: default_min_regime_points(),
        }
    }
}

// ============================================================================
// Fitting
// ============================================================================

/// Polynomial degree search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingConfig {
    /// Highest degree tried by the degree search (also capped at points - 1).
    #[serde(default = "default_max_degree")]
    pub max_degree: usize,

    /// Degree of a freshly constructed, not yet searched model.
    #[serde(default = "default_degree")]
    pub default_degree: usize,
}

fn default_max_degree() -> usize { defaults::MAX_SEARCH_DEGREE }
fn default_degree() -> usize { defaults::DEFAULT_DEGREE }

impl Default for FittingConfig {
    fn default() -> Self {
        Self {
            max_degree: default_max_degree(),
            default_degree: default_degree(),
        }
    }
}

// ============================================================================
// Horizon
// ============================================================================

/// Projection horizons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// Days projected past the latest measurement for a forecast.
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// Window searched by the maintenance-date query.
    #[serde(default = "default_maintenance_horizon_days")]
    pub maintenance_horizon_days: u32,

    /// Sampling interval of the projection table in a forecast report.
    #[serde(default = "default_report_every_n_days")]
    pub report_every_n_days: u32,
}

fn default_days_ahead() -> u32 { defaults::DAYS_AHEAD }
fn default_maintenance_horizon_days() -> u32 { defaults::MAINTENANCE_HORIZON_DAYS }
fn default_report_every_n_days() -> u32 { defaults::REPORT_EVERY_N_DAYS }

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            days_ahead: default_days_ahead(),
            maintenance_horizon_days: default_maintenance_horizon_days(),
            report_every_n_days: default_report_every_n_days(),
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Maintenance wear thresholds in millimeters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Indexer pinion (`INDPIN`)
    #[serde(default = "default_pinion_mm")]
    pub pinion_mm: f64,

    /// Index support roller (`INDROL`)
    #[serde(default = "default_roller_mm")]
    pub roller_mm: f64,

    /// Assets whose kind cannot be parsed from their id
    #[serde(default = "default_other_mm")]
    pub default_mm: f64,
}

fn default_pinion_mm() -> f64 { defaults::PINION_THRESHOLD_MM }
fn default_roller_mm() -> f64 { defaults::ROLLER_THRESHOLD_MM }
fn default_other_mm() -> f64 { defaults::DEFAULT_THRESHOLD_MM }

impl ThresholdConfig {
    /// Threshold that applies to an asset kind.
    pub fn for_kind(&self, kind: AssetKind) -> f64 {
        match kind {
            AssetKind::Pinion => self.pinion_mm,
            AssetKind::Roller => self.roller_mm,
            AssetKind::Other => self.default_mm,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            pinion_mm: default_pinion_mm(),
            roller_mm: default_roller_mm(),
            default_mm: default_other_mm(),
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Fleet wear-rate comparison parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// An asset is an outlier when its rate exceeds `median + k * MAD`.
    #[serde(default = "default_outlier_mad_multiplier")]
    pub outlier_mad_multiplier: f64,

    /// Fewer rated assets than this disables outlier flagging.
    #[serde(default = "default_min_assets_for_outliers")]
    pub min_assets_for_outliers: usize,
}

fn default_outlier_mad_multiplier() -> f64 { defaults::OUTLIER_MAD_MULTIPLIER }
fn default_min_assets_for_outliers() -> usize { defaults::MIN_ASSETS_FOR_OUTLIERS }

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            outlier_mad_multiplier: default_outlier_mad_multiplier(),
            min_assets_for_outliers: default_min_assets_for_outliers(),
        }
    }
}
