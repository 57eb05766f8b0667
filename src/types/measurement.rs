//! Wear measurements and asset identity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One recorded wear reading for an asset.
///
/// Supplied by the measurement store; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Asset identifier, e.g. `TUL1-INDPIN-03`
    pub asset_id: String,
    /// Calendar day of the reading
    pub date: NaiveDate,
    /// Accumulated material loss (mm)
    pub wear_mm: f64,
    /// Free-text notes (maintenance performed, observations)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Measurement {
    pub fn new(asset_id: impl Into<String>, date: NaiveDate, wear_mm: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            date,
            wear_mm,
            notes: String::new(),
        }
    }

    /// Attach notes to the reading.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// A usable reading has a finite, non-negative wear value.
    pub fn is_valid(&self) -> bool {
        self.wear_mm.is_finite() && self.wear_mm >= 0.0
    }
}

/// Kind of mechanical component being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Indexer pinion gear (`INDPIN`)
    Pinion,
    /// Index support roller (`INDROL`)
    Roller,
    /// Anything else
    Other,
}

impl AssetKind {
    /// Type code used inside asset identifiers.
    pub fn code(self) -> &'static str {
        match self {
            Self::Pinion => "INDPIN",
            Self::Roller => "INDROL",
            Self::Other => "OTHER",
        }
    }

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Pinion => "Indexer Pinion",
            Self::Roller => "Index Support Roller",
            Self::Other => "Unclassified Asset",
        }
    }

    /// Parse the kind from an asset id of the form `<unit>-<KIND>-<NN>`.
    ///
    /// Any dash-separated segment matching a type code counts; ids without
    /// one are `Other`.
    pub fn from_asset_id(asset_id: &str) -> Self {
        asset_id
            .split('-')
            .find_map(|segment| match segment.to_ascii_uppercase().as_str() {
                "INDPIN" => Some(Self::Pinion),
                "INDROL" => Some(Self::Roller),
                _ => None,
            })
            .unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
