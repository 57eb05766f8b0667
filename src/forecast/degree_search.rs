//! Polynomial degree selection by in-sample R².
//!
//! Candidates are tried in ascending order. Tie rule: a higher degree replaces
//! the best only when its R² exceeds the best by more than
//! [`R2_TIE_TOLERANCE`], so gains within rounding noise keep the lower degree.
//! Degrees whose fit fails are skipped rather than aborting the search.
//!
//! [`fit_fixed_degree`] scores a single degree with no search, for windows
//! too short to trust a search (it would pick the interpolating degree).

use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::debug;

use super::{model::FittedCurve, ForecastError};

/// R² gains at or below this are rounding noise, not improvement.
pub const R2_TIE_TOLERANCE: f64 = 1e-10;

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Returns 0 when the observations have no variance (`SS_tot = 0`).
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() || observed.len() != predicted.len() {
        return 0.0;
    }
    let mean = observed.iter().mean();
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Degrees worth trying for `points` observations: `1..=min(max_degree, points - 1)`.
pub fn candidate_degrees(points: usize, max_degree: usize) -> Vec<usize> {
    (1..=max_degree.min(points.saturating_sub(1))).collect()
}

/// One tried degree and how it scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeCandidate {
    pub degree: usize,
    /// `None` when the fit at this degree failed
    pub r_squared: Option<f64>,
}

/// The winning curve plus the scores of every candidate tried.
#[derive(Debug, Clone)]
pub struct DegreeSearchOutcome {
    pub degree: usize,
    pub curve: FittedCurve,
    pub r_squared: f64,
    pub candidates: Vec<DegreeCandidate>,
}

/// Fit every candidate degree and keep the first with the highest R².
///
/// # Errors
/// `InsufficientData` when there are fewer than 3 points; otherwise the error
/// of the last failed candidate if no degree could be fit at all.
pub fn search_best_degree(
    days: &[f64],
    wear: &[f64],
    degrees: &[usize],
) -> Result<DegreeSearchOutcome, ForecastError> {
    let mut best: Option<(usize, FittedCurve, f64)> = None;
    let mut candidates = Vec::with_capacity(degrees.len());
    let mut last_error = ForecastError::InvalidInput("no candidate degrees".to_string());

    for &degree in degrees {
        match FittedCurve::fit(days, wear, degree) {
            Ok(curve) => {
                let score = r_squared(wear, &curve.predict(days));
                debug!(degree, r_squared = score, "Scored candidate degree");
                candidates.push(DegreeCandidate { degree, r_squared: Some(score) });

                let improves = best.as_ref().map_or(true, |(_, _, s)| score > *s + R2_TIE_TOLERANCE);
                if improves {
                    best = Some((degree, curve, score));
                }
            }
            Err(e @ ForecastError::InsufficientData { .. }) => return Err(e),
            Err(e) => {
                debug!(degree, error = %e, "Skipping candidate degree");
                candidates.push(DegreeCandidate { degree, r_squared: None });
                last_error = e;
            }
        }
    }

    let (degree, curve, r_squared) = best.ok_or(last_error)?;
    Ok(DegreeSearchOutcome { degree, curve, r_squared, candidates })
}

/// Fit at `degree`, capped at `points - 1`, without searching.
///
/// # Errors
/// Any [`FittedCurve::fit`] error.
pub fn fit_fixed_degree(days: &[f64], wear: &[f64], degree: usize) -> Result<DegreeSearchOutcome, ForecastError> {
    let degree = degree.min(days.len().saturating_sub(1)).max(1);
    let curve = FittedCurve::fit(days, wear, degree)?;
    let r_squared = r_squared(wear, &curve.predict(days));
    debug!(degree, r_squared, "Fitted fixed degree");

    Ok(DegreeSearchOutcome {
        degree,
        curve,
        r_squared,
        candidates: vec![DegreeCandidate { degree, r_squared: Some(r_squared) }],
    })
}
