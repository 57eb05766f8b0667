//! Polynomial basis expansion.
//!
//! Elapsed days are mapped onto `[-1, 1]` over the fit range before being
//! raised to powers, which keeps the normal equations well conditioned for
//! series spanning years. The mapping is part of the fitted model: curves
//! fit with one basis are only meaningful when evaluated with the same one.

use serde::{Deserialize, Serialize};

/// Feature transform `x -> [1, t, t², …, t^degree]` with `t = (x - center) / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialBasis {
    degree: usize,
    center: f64,
    scale: f64,
}

impl PolynomialBasis {
    /// Build a basis of `degree` fitted to the span of `xs`.
    ///
    /// A zero-width span keeps `scale = 1`; the resulting design matrix is
    /// then rank-deficient and the solver reports it.
    pub fn fit(xs: &[f64], degree: usize) -> Self {
        let (min, max) = xs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));

        if !min.is_finite() || !max.is_finite() {
            return Self { degree, center: 0.0, scale: 1.0 };
        }

        let half_range = (max - min) / 2.0;
        Self {
            degree,
            center: min + half_range,
            scale: if half_range > 0.0 { half_range } else { 1.0 },
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of features produced per input (bias column included).
    pub fn width(&self) -> usize {
        self.degree + 1
    }

    /// A basis restored from storage must have a usable scale.
    pub fn is_well_formed(&self) -> bool {
        self.center.is_finite() && self.scale.is_finite() && self.scale > 0.0
    }

    /// Expand a single input into its feature row.
    pub fn expand(&self, x: f64) -> Vec<f64> {
        let t = (x - self.center) / self.scale;
        let mut row = Vec::with_capacity(self.width());
        let mut power = 1.0;
        for _ in 0..self.width() {
            row.push(power);
            power *= t;
        }
        row
    }

    /// Expand every input into a design matrix (one row per input).
    pub fn transform(&self, xs: &[f64]) -> Vec<Vec<f64>> {
        xs.iter().map(|&x| self.expand(x)).collect()
    }
}
