//! Elapsed-day wear points and regimes.

use serde::{Deserialize, Serialize};

/// A wear reading positioned by days elapsed since the series origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimePoint {
    pub elapsed_day: i64,
    pub wear_mm: f64,
}

impl RegimePoint {
    pub fn new(elapsed_day: i64, wear_mm: f64) -> Self {
        Self { elapsed_day, wear_mm }
    }
}

impl From<(i64, f64)> for RegimePoint {
    fn from((elapsed_day, wear_mm): (i64, f64)) -> Self {
        Self::new(elapsed_day, wear_mm)
    }
}

/// A contiguous run of points between maintenance resets.
///
/// Points are sorted by `elapsed_day` with no duplicate days. Regimes are
/// derived on every forecast and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub points: Vec<RegimePoint>,
}

impl Regime {
    pub fn new(points: Vec<RegimePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Elapsed days as regression inputs.
    #[allow(clippy::cast_precision_loss)]
    pub fn days(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.elapsed_day as f64).collect()
    }

    /// Wear values as regression targets.
    pub fn wear(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.wear_mm).collect()
    }

    pub fn first_day(&self) -> Option<i64> {
        self.points.first().map(|p| p.elapsed_day)
    }

    pub fn last_day(&self) -> Option<i64> {
        self.points.last().map(|p| p.elapsed_day)
    }
}
