//! Maintenance Reset Segmentation
//!
//! Splits a wear series into regimes separated by maintenance resets.
//! A reset is never recorded explicitly; it is inferred when a reading drops
//! below a fraction (`reset_drop_ratio`, default 50%) of the reading before it.
//!
//! Forecasting only uses the latest regime, so wear accumulated before the
//! last service does not bend the curve.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::ForecastError;
use crate::config::{defaults, SegmentationConfig};
use crate::types::{Regime, RegimePoint, RegimeSelection};

/// A de-duplicated, day-sorted series anchored at its earliest date.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    /// Calendar date of elapsed day 0
    pub origin: NaiveDate,
    pub points: Vec<RegimePoint>,
}

impl NormalizedSeries {
    pub fn last_day(&self) -> Option<i64> {
        self.points.last().map(|p| p.elapsed_day)
    }

    /// Calendar date of the latest point.
    pub fn last_date(&self) -> Option<NaiveDate> {
        let days = self.last_day()?;
        self.origin.checked_add_signed(chrono::Duration::days(days))
    }
}

/// The points chosen for fitting and how they were chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastWindow {
    pub points: Regime,
    pub selection: RegimeSelection,
    pub regime_count: usize,
}

/// Maintenance reset detector and segmenter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeSegmenter {
    reset_drop_ratio: f64,
    min_regime_points: usize,
}

impl Default for RegimeSegmenter {
    fn default() -> Self {
        Self {
            reset_drop_ratio: defaults::RESET_DROP_RATIO,
            min_regime_points: defaults::MIN_FIT_POINTS,
        }
    }
}

impl RegimeSegmenter {
    pub fn new(reset_drop_ratio: f64, min_regime_points: usize) -> Self {
        Self { reset_drop_ratio, min_regime_points }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.reset_drop_ratio, config.min_regime_points)
    }

    /// Convert dated readings to elapsed-day points.
    ///
    /// Offsets are relative to the earliest date. Readings sharing a day
    /// collapse to the last one in input order. Returns `None` for no input.
    pub fn normalize(readings: &[(NaiveDate, f64)]) -> Option<NormalizedSeries> {
        let origin = readings.iter().map(|(date, _)| *date).min()?;

        let mut by_day = BTreeMap::new();
        for (date, wear) in readings {
            by_day.insert((*date - origin).num_days(), *wear);
        }

        Some(NormalizedSeries {
            origin,
            points: Self::collect(by_day),
        })
    }

    /// Dedup (last wins) and sort already-offset points.
    ///
    /// Idempotent: normalized input comes back unchanged.
    pub fn normalize_points(points: &[RegimePoint]) -> Vec<RegimePoint> {
        let by_day: BTreeMap<i64, f64> = points.iter().map(|p| (p.elapsed_day, p.wear_mm)).collect();
        Self::collect(by_day)
    }

    fn collect(by_day: BTreeMap<i64, f64>) -> Vec<RegimePoint> {
        by_day.into_iter().map(RegimePoint::from).collect()
    }

    /// Split sorted points into regimes at every reset.
    ///
    /// The point that drops starts the new regime. No drop means one regime
    /// holding every point; no points means no regimes.
    pub fn split(&self, points: &[RegimePoint]) -> Vec<Regime> {
        let Some(first) = points.first() else {
            return Vec::new();
        };

        let mut regimes = Vec::new();
        let mut current = vec![*first];

        for pair in points.windows(2) {
            let (prev, point) = (pair[0], pair[1]);
            if self.is_reset(prev.wear_mm, point.wear_mm) {
                debug!(
                    elapsed_day = point.elapsed_day,
                    from_mm = prev.wear_mm,
                    to_mm = point.wear_mm,
                    "Maintenance reset detected"
                );
                regimes.push(Regime::new(std::mem::take(&mut current)));
            }
            current.push(point);
        }
        regimes.push(Regime::new(current));

        regimes
    }

    fn is_reset(&self, previous_mm: f64, wear_mm: f64) -> bool {
        wear_mm < previous_mm * self.reset_drop_ratio
    }

    /// Pick the points to fit: the latest regime if it is long enough,
    /// otherwise the whole normalized series.
    ///
    /// # Errors
    /// `InsufficientData` when even the whole series has fewer than 3 points.
    pub fn select_for_forecast(&self, points: &[RegimePoint]) -> Result<ForecastWindow, ForecastError> {
        if points.len() < defaults::MIN_FIT_POINTS {
            return Err(ForecastError::InsufficientData {
                points: points.len(),
                required: defaults::MIN_FIT_POINTS,
            });
        }

        let mut regimes = self.split(points);
        let regime_count = regimes.len();

        match regimes.pop() {
            Some(latest) if latest.len() >= self.min_regime_points => Ok(ForecastWindow {
                points: latest,
                selection: RegimeSelection::LatestRegime,
                regime_count,
            }),
            latest => {
                debug!(
                    regime_count,
                    latest_points = latest.map_or(0, |r| r.len()),
                    total_points = points.len(),
                    "Latest regime too short, falling back to full series"
                );
                Ok(ForecastWindow {
                    points: Regime::new(points.to_vec()),
                    selection: RegimeSelection::FullSeriesFallback,
                    regime_count,
                })
            }
        }
    }
}
