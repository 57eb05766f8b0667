//! Forecasting error types.

use thiserror::Error;

/// Errors from fitting and querying wear curves.
///
/// All are deterministic: re-running with the same input reproduces them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    /// Fewer usable points than fitting needs.
    #[error("need at least {required} data points for prediction, got {points}")]
    InsufficientData { points: usize, required: usize },

    /// `predict` or a threshold query ran before a successful fit.
    #[error("model not trained")]
    ModelNotTrained,

    /// Degree is zero or would interpolate the points exactly.
    #[error("polynomial degree {degree} is invalid for {points} points (need 1 <= degree < points)")]
    InvalidDegree { degree: usize, points: usize },

    /// The least-squares system has no unique solution (e.g. repeated days).
    #[error("least-squares system for degree {degree} is singular")]
    SingularSystem { degree: usize },

    /// Malformed caller input (mismatched lengths, non-finite values).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
