//! Externally resolved access / risk signals (geospatial + document tagging).

use serde::{Deserialize, Serialize};

/// Per-well signals computed outside the core and passed in as resolved values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessSignals {
    /// Site access score in [0, 1]; `None` when no access assessment exists
    #[serde(default)]
    pub access_score: Option<f64>,
    /// Location precision: `Some(true)` = surveyed coordinate, `Some(false)` = PLSS only.
    /// `None` defers to the presence of coordinates on the well identity.
    #[serde(default)]
    pub precise_location: Option<bool>,
    #[serde(default)]
    pub has_completion_doc: bool,
    #[serde(default)]
    pub has_permit_doc: bool,
}

impl AccessSignals {
    /// Completion report or permit on file.
    pub fn has_document_evidence(&self) -> bool {
        self.has_completion_doc || self.has_permit_doc
    }

    /// Access score clamped to [0, 1]; non-finite values read as missing.
    pub fn access(&self) -> Option<f64> {
        self.access_score
            .filter(|a| a.is_finite())
            .map(|a| a.clamp(0.0, 1.0))
    }
}
