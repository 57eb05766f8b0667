//! Wear model checkpoints.
//!
//! Serializable snapshots of a fitted curve, enabling:
//! - Opaque byte save/load for a host that stores models itself
//! - Disk persistence (atomic save/load)
//!
//! Snapshots carry a format version. Any other version is rejected and the
//! model has to be re-fit.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::basis::PolynomialBasis;
use super::model::{FittedCurve, WearPredictionModel};

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Errors from saving or restoring a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("checkpoint version {found} is not supported (expected {expected}); re-fit the model")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("corrupt checkpoint: {0}")]
    Corrupt(String),

    #[error("cannot checkpoint an untrained model")]
    NotTrained,
}

/// Snapshot of one fitted wear curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCheckpoint {
    /// Format version for forward compatibility.
    pub version: u32,
    /// Polynomial degree; must match the basis.
    pub degree: usize,
    /// Input transform the coefficients were fit against.
    pub basis: PolynomialBasis,
    /// Least-squares coefficients, lowest power first.
    pub coefficients: Vec<f64>,
    pub metadata: CheckpointMetadata,
}

/// Provenance attached to a checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Asset the curve was fit for (empty when unknown).
    #[serde(default)]
    pub asset_id: String,
    /// Points the curve was fit on.
    #[serde(default)]
    pub fitted_points: usize,
    /// In-sample R² at fit time.
    #[serde(default)]
    pub r_squared: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl CheckpointMetadata {
    pub fn new(asset_id: impl Into<String>, fitted_points: usize, r_squared: Option<f64>) -> Self {
        Self {
            asset_id: asset_id.into(),
            fitted_points,
            r_squared: r_squared.filter(|r| r.is_finite()),
            created_at: Utc::now(),
        }
    }
}

impl Default for CheckpointMetadata {
    fn default() -> Self {
        Self::new(String::new(), 0, None)
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl ModelCheckpoint {
    pub fn new(curve: &FittedCurve, metadata: CheckpointMetadata) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            degree: curve.degree(),
            basis: *curve.basis(),
            coefficients: curve.coefficients().to_vec(),
            metadata,
        }
    }

    /// Rebuild the fitted curve, checking the parts agree.
    ///
    /// # Errors
    /// `Corrupt` when degree, basis and coefficients are inconsistent.
    pub fn to_curve(&self) -> Result<FittedCurve, CheckpointError> {
        if self.degree != self.basis.degree() {
            return Err(CheckpointError::Corrupt(format!(
                "degree {} does not match basis degree {}",
                self.degree,
                self.basis.degree()
            )));
        }
        FittedCurve::from_parts(self.basis, self.coefficients.clone()).ok_or_else(|| {
            CheckpointError::Corrupt(format!(
                "{} coefficients are not a valid degree-{} curve",
                self.coefficients.len(),
                self.degree
            ))
        })
    }

    /// # Errors
    /// `Serialization` if JSON encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate a checkpoint.
    ///
    /// The version is checked before the rest of the payload, so a snapshot
    /// from another format version reports `VersionMismatch` rather than a
    /// field error.
    ///
    /// # Errors
    /// `Serialization`, `VersionMismatch` or `Corrupt`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let probe: VersionProbe = serde_json::from_slice(bytes)?;
        if probe.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                found: probe.version,
                expected: CHECKPOINT_VERSION,
            });
        }

        let checkpoint: Self = serde_json::from_slice(bytes)?;
        checkpoint.to_curve()?;
        Ok(checkpoint)
    }
}

impl WearPredictionModel {
    /// Snapshot the trained curve as an opaque byte blob.
    ///
    /// # Errors
    /// `NotTrained` before a successful fit.
    pub fn save(&self, metadata: CheckpointMetadata) -> Result<Vec<u8>, CheckpointError> {
        let curve = self.curve().map_err(|_| CheckpointError::NotTrained)?;
        ModelCheckpoint::new(curve, metadata).to_bytes()
    }

    /// Replace this model with one restored from `bytes`.
    ///
    /// All-or-nothing: on error the model keeps its previous state.
    ///
    /// # Errors
    /// See [`ModelCheckpoint::from_bytes`].
    pub fn load(&mut self, bytes: &[u8]) -> Result<CheckpointMetadata, CheckpointError> {
        let checkpoint = ModelCheckpoint::from_bytes(bytes)?;
        let curve = checkpoint.to_curve()?;
        self.replace_curve(curve);
        Ok(checkpoint.metadata)
    }
}

/// Save a checkpoint to disk atomically (write temp file, then rename).
///
/// # Errors
/// `Io` or `Serialization`.
pub fn save_to_disk(checkpoint: &ModelCheckpoint, path: &Path) -> Result<(), CheckpointError> {
    let json = serde_json::to_vec_pretty(checkpoint)?;

    let tmp_path = path.with_extension("json.tmp");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path)?;

    info!(
        path = %path.display(),
        asset_id = %checkpoint.metadata.asset_id,
        degree = checkpoint.degree,
        "Saved model checkpoint"
    );
    Ok(())
}

/// Load and validate a checkpoint from disk.
///
/// # Errors
/// `Io`, `Serialization`, `VersionMismatch` or `Corrupt`.
pub fn load_from_disk(path: &Path) -> Result<ModelCheckpoint, CheckpointError> {
    let data = std::fs::read(path)?;
    let checkpoint = ModelCheckpoint::from_bytes(&data)?;
    debug!(path = %path.display(), degree = checkpoint.degree, "Loaded model checkpoint");
    Ok(checkpoint)
}
