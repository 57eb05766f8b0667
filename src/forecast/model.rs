//! Polynomial wear curves.
//!
//! [`FittedCurve`] is the immutable result of one fit: the basis transform
//! and its coefficients, which only make sense together.
//! [`WearPredictionModel`] wraps an optional curve as the two-state
//! (untrained / trained) model callers thread through a forecast request.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{basis::PolynomialBasis, least_squares, ForecastError};
use crate::config::defaults::MIN_FIT_POINTS;
use crate::types::ThresholdCrossing;

/// A polynomial fitted to one regime's (elapsed_day, wear) points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedCurve {
    basis: PolynomialBasis,
    coefficients: Vec<f64>,
}

impl FittedCurve {
    /// Least-squares fit of a degree-`degree` polynomial.
    ///
    /// # Errors
    /// - `InvalidInput` for mismatched lengths or non-finite values
    /// - `InsufficientData` for fewer than 3 points
    /// - `InvalidDegree` unless `1 <= degree < points`
    /// - `SingularSystem` when the points cannot determine the curve
    pub fn fit(days: &[f64], wear: &[f64], degree: usize) -> Result<Self, ForecastError> {
        if days.len() != wear.len() {
            return Err(ForecastError::InvalidInput(format!(
                "{} days but {} wear values",
                days.len(),
                wear.len()
            )));
        }
        if days.len() < MIN_FIT_POINTS {
            return Err(ForecastError::InsufficientData {
                points: days.len(),
                required: MIN_FIT_POINTS,
            });
        }
        if days.iter().chain(wear).any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidInput("non-finite day or wear value".to_string()));
        }
        if degree == 0 || degree >= days.len() {
            return Err(ForecastError::InvalidDegree { degree, points: days.len() });
        }

        let basis = PolynomialBasis::fit(days, degree);
        let rows = basis.transform(days);
        let coefficients =
            least_squares::solve(&rows, wear).ok_or(ForecastError::SingularSystem { degree })?;

        debug!(degree, points = days.len(), "Fitted wear curve");
        Ok(Self { basis, coefficients })
    }

    /// Reassemble a curve from stored parts.
    ///
    /// Returns `None` if the parts are inconsistent with each other.
    pub fn from_parts(basis: PolynomialBasis, coefficients: Vec<f64>) -> Option<Self> {
        let consistent = basis.is_well_formed()
            && basis.degree() >= 1
            && coefficients.len() == basis.width()
            && coefficients.iter().all(|c| c.is_finite());
        consistent.then_some(Self { basis, coefficients })
    }

    pub fn degree(&self) -> usize {
        self.basis.degree()
    }

    pub fn basis(&self) -> &PolynomialBasis {
        &self.basis
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Projected wear at one elapsed day. Unclamped outside the fit range.
    pub fn evaluate(&self, day: f64) -> f64 {
        self.basis
            .expand(day)
            .iter()
            .zip(&self.coefficients)
            .map(|(feature, coefficient)| feature * coefficient)
            .sum()
    }

    /// Projected wear for each day, in input order.
    pub fn predict(&self, days: &[f64]) -> Vec<f64> {
        days.iter().map(|&d| self.evaluate(d)).collect()
    }

    /// First day in `[start_day, start_day + days_ahead]` whose projection
    /// reaches `threshold`.
    ///
    /// The calendar date is `start_date` plus the day's index in that window,
    /// and the index is reported as `days_until`.
    ///
    /// # Errors
    /// `InvalidInput` if the crossing date falls outside the calendar range.
    #[allow(clippy::cast_precision_loss)]
    pub fn threshold_crossing(
        &self,
        start_day: i64,
        days_ahead: u32,
        start_date: NaiveDate,
        threshold: f64,
    ) -> Result<ThresholdCrossing, ForecastError> {
        let crossing = (0..=days_ahead).find(|&offset| {
            let day = start_day + i64::from(offset);
            self.evaluate(day as f64) >= threshold
        });

        match crossing {
            Some(days_until) => {
                let date = start_date
                    .checked_add_days(Days::new(u64::from(days_until)))
                    .ok_or_else(|| {
                        ForecastError::InvalidInput(format!(
                            "{start_date} + {days_until} days is out of calendar range"
                        ))
                    })?;
                Ok(ThresholdCrossing::Reached { date, days_until })
            }
            None => Ok(ThresholdCrossing::NotReached),
        }
    }
}

/// Wear prediction model with an explicit untrained / trained state.
///
/// A failed `fit` leaves the previous state untouched; a successful one
/// replaces it entirely. Each forecast request should own its model.
#[derive(Debug, Clone, PartialEq)]
pub struct WearPredictionModel {
    degree: usize,
    curve: Option<FittedCurve>,
}

impl WearPredictionModel {
    /// Untrained model that will fit polynomials of `degree`.
    pub fn new(degree: usize) -> Self {
        Self { degree, curve: None }
    }

    /// Trained model wrapping an existing curve.
    pub fn from_curve(curve: FittedCurve) -> Self {
        Self {
            degree: curve.degree(),
            curve: Some(curve),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn is_trained(&self) -> bool {
        self.curve.is_some()
    }

    /// The fitted curve, if trained.
    ///
    /// # Errors
    /// `ModelNotTrained` before a successful fit.
    pub fn curve(&self) -> Result<&FittedCurve, ForecastError> {
        self.curve.as_ref().ok_or(ForecastError::ModelNotTrained)
    }

    pub fn into_curve(self) -> Option<FittedCurve> {
        self.curve
    }

    /// Fit the configured degree to `(days, wear)`.
    ///
    /// # Errors
    /// See [`FittedCurve::fit`]. On error the model keeps its previous state.
    pub fn fit(&mut self, days: &[f64], wear: &[f64]) -> Result<(), ForecastError> {
        let curve = FittedCurve::fit(days, wear, self.degree)?;
        self.curve = Some(curve);
        Ok(())
    }

    /// Projected wear per input day.
    ///
    /// # Errors
    /// `ModelNotTrained` before a successful fit.
    pub fn predict(&self, days: &[f64]) -> Result<Vec<f64>, ForecastError> {
        Ok(self.curve()?.predict(days))
    }

    /// See [`FittedCurve::threshold_crossing`].
    ///
    /// # Errors
    /// `ModelNotTrained` before a successful fit.
    pub fn calculate_threshold_crossing(
        &self,
        start_day: i64,
        days_ahead: u32,
        start_date: NaiveDate,
        threshold: f64,
    ) -> Result<ThresholdCrossing, ForecastError> {
        self.curve()?
            .threshold_crossing(start_day, days_ahead, start_date, threshold)
    }

    /// Replace the whole state with a restored curve.
    pub(crate) fn replace_curve(&mut self, curve: FittedCurve) {
        self.degree = curve.degree();
        self.curve = Some(curve);
    }
}

impl Default for WearPredictionModel {
    /// Untrained model at the configured `fitting.default_degree`.
    fn default() -> Self {
        Self::new(crate::config::get().fitting.default_degree)
    }
}
