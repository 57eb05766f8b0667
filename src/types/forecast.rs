//! Forecast outputs: threshold crossings, projections and reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AssetKind;

/// Where projected wear first reaches a maintenance threshold.
///
/// `NotReached` is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThresholdCrossing {
    /// Threshold reached `days_until` days after the forecast anchor, on `date`.
    Reached { date: NaiveDate, days_until: u32 },
    /// Threshold not reached anywhere in the searched window.
    NotReached,
}

impl ThresholdCrossing {
    pub fn is_reached(&self) -> bool {
        matches!(self, Self::Reached { .. })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Reached { date, .. } => Some(*date),
            Self::NotReached => None,
        }
    }

    pub fn days_until(&self) -> Option<u32> {
        match self {
            Self::Reached { days_until, .. } => Some(*days_until),
            Self::NotReached => None,
        }
    }
}

impl std::fmt::Display for ThresholdCrossing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reached { date, days_until } => {
                let unit = if *days_until == 1 { "day" } else { "days" };
                write!(f, "reached in {days_until} {unit} ({date})")
            }
            Self::NotReached => write!(f, "not reached within the horizon"),
        }
    }
}

/// Which points the curve was fit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeSelection {
    /// The regime after the most recent maintenance reset.
    LatestRegime,
    /// The latest regime was too short; the whole normalized series was used.
    FullSeriesFallback,
}

/// A single projected wear value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Elapsed day relative to the series origin
    pub elapsed_day: i64,
    /// Calendar date of the projected day
    pub date: NaiveDate,
    /// Projected wear (mm); may be negative or steep far outside the fit range
    pub wear_mm: f64,
}

/// Everything a forecast produced for one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub asset_id: String,
    pub asset_kind: AssetKind,
    /// Usable measurements before de-duplication
    pub measurement_count: usize,
    pub first_date: NaiveDate,
    /// Latest measurement date; the forecast anchor
    pub last_date: NaiveDate,
    /// Wear at the latest measurement (mm)
    pub current_wear_mm: f64,
    /// Regimes found by the segmenter
    pub regime_count: usize,
    pub selection: RegimeSelection,
    /// Points the selected curve was fit on
    pub fitted_points: usize,
    pub degree: usize,
    /// In-sample coefficient of determination of the selected curve
    pub r_squared: f64,
    pub threshold_mm: f64,
    pub days_ahead: u32,
    /// Sampled projection (every n-th future day plus the last one)
    pub projection: Vec<ProjectionPoint>,
    pub crossing: ThresholdCrossing,
}

/// Answer to "when is maintenance due?".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEstimate {
    pub asset_id: String,
    pub current_wear_mm: f64,
    pub threshold_mm: f64,
    pub horizon_days: u32,
    pub last_date: NaiveDate,
    pub crossing: ThresholdCrossing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_accessors() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let reached = ThresholdCrossing::Reached { date, days_until: 3 };
        assert!(reached.is_reached());
        assert_eq!(reached.date(), Some(date));
        assert_eq!(reached.days_until(), Some(3));

        assert!(!ThresholdCrossing::NotReached.is_reached());
        assert_eq!(ThresholdCrossing::NotReached.date(), None);
    }

    #[test]
    fn test_crossing_display_pluralizes() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let one = ThresholdCrossing::Reached { date, days_until: 1 };
        assert_eq!(one.to_string(), "reached in 1 day (2024-01-02)");
        let many = ThresholdCrossing::Reached { date, days_until: 12 };
        assert!(many.to_string().starts_with("reached in 12 days"));
    }

    #[test]
    fn test_crossing_json_is_tagged() {
        let json = serde_json::to_string(&ThresholdCrossing::NotReached).unwrap();
        assert_eq!(json, r#"{"status":"not_reached"}"#);
    }
}
