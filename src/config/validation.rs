//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Unknown keys are found by parsing the raw TOML into `toml::Value`,
//! walking the key tree and comparing against the known field names.
//! They only produce warnings. Range violations are hard errors.

use std::collections::HashSet;

use super::ForecastConfig;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `ForecastConfig`.
///
/// Maintained by hand to match the struct hierarchy in `forecast_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        "segmentation",
        "segmentation.reset_drop_ratio",
        "segmentation.min_regime_points",
        "fitting",
        "fitting.max_degree",
        "fitting.default_degree",
        "horizon",
        "horizon.days_ahead",
        "horizon.maintenance_horizon_days",
        "horizon.report_every_n_days",
        "thresholds",
        "thresholds.pinion_mm",
        "thresholds.roller_mm",
        "thresholds.default_mm",
        "comparison",
        "comparison.outlier_mad_multiplier",
        "comparison.min_assets_for_outliers",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so the suggestion is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Parse errors return no warnings; serde reports them afterwards.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Highest degree accepted in `fitting.max_degree`.
const MAX_CONFIGURABLE_DEGREE: usize = 6;

/// Validate value ranges on a parsed `ForecastConfig`.
///
/// Returns every violation found; an empty vector means the config is usable.
pub fn validate_ranges(config: &ForecastConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let ratio = config.segmentation.reset_drop_ratio;
    if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
        errors.push(format!(
            "segmentation.reset_drop_ratio = {ratio} must be in (0, 1]"
        ));
    }
    if config.segmentation.min_regime_points < super::defaults::MIN_FIT_POINTS {
        errors.push(format!(
            "segmentation.min_regime_points = {} must be >= {}",
            config.segmentation.min_regime_points,
            super::defaults::MIN_FIT_POINTS
        ));
    }

    let f = &config.fitting;
    if f.max_degree == 0 || f.max_degree > MAX_CONFIGURABLE_DEGREE {
        errors.push(format!(
            "fitting.max_degree = {} must be in 1..={MAX_CONFIGURABLE_DEGREE}",
            f.max_degree
        ));
    }
    if f.default_degree == 0 || f.default_degree > f.max_degree {
        errors.push(format!(
            "fitting.default_degree = {} must be in 1..=max_degree ({})",
            f.default_degree, f.max_degree
        ));
    }

    let h = &config.horizon;
    for (name, value) in [
        ("horizon.days_ahead", h.days_ahead),
        ("horizon.maintenance_horizon_days", h.maintenance_horizon_days),
        ("horizon.report_every_n_days", h.report_every_n_days),
    ] {
        if value == 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    let t = &config.thresholds;
    for (name, value) in [
        ("thresholds.pinion_mm", t.pinion_mm),
        ("thresholds.roller_mm", t.roller_mm),
        ("thresholds.default_mm", t.default_mm),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} = {value} must be a positive wear depth"));
        }
    }

    let k = config.comparison.outlier_mad_multiplier;
    if !k.is_finite() || k <= 0.0 {
        errors.push(format!(
            "comparison.outlier_mad_multiplier = {k} must be > 0"
        ));
    }

    errors
}

// ============================================================================
// Tests
// ============================================================================
