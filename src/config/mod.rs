//! Forecast Configuration Module
//!
//! Provides engine configuration loaded from TOML files, replacing the
//! hardcoded forecasting heuristics with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `WEARCAST_CONFIG` environment variable (path to TOML file)
//! 2. `wearcast.toml` in the current working directory
//! 3. Built-in defaults (see [`defaults`])
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(ForecastConfig::load());
//!
//! let ratio = config::get().segmentation.reset_drop_ratio;
//! ```

mod forecast_config;
pub mod defaults;
pub mod validation;

pub use forecast_config::*;

use std::sync::OnceLock;

/// Global forecast configuration, initialized once at startup.
static FORECAST_CONFIG: OnceLock<ForecastConfig> = OnceLock::new();

/// Built-in defaults served by `get()` before `init()`.
static DEFAULT_CONFIG: OnceLock<ForecastConfig> = OnceLock::new();

/// Initialize the global forecast configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: ForecastConfig) {
    if FORECAST_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global forecast configuration.
///
/// Returns the built-in defaults when `init()` has not been called. Reading
/// the defaults does not initialize the global, so a later `init()` still
/// takes effect.
pub fn get() -> &'static ForecastConfig {
    FORECAST_CONFIG
        .get()
        .unwrap_or_else(|| DEFAULT_CONFIG.get_or_init(ForecastConfig::default))
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    FORECAST_CONFIG.get().is_some()
}
