//! Run-level error report: every per-well problem, keyed by well id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::features::DataError;

/// Per-well problems collected during one run. Nothing in here aborts the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Wells dropped before feature extraction, with the reason
    pub errors: BTreeMap<String, String>,
    /// Cell and row problems that did not exclude a well (bad signal or
    /// location cells, rows for wells outside the universe)
    pub rejected_rows: Vec<DataError>,
    /// Production rows whose well is not in the universe
    pub unknown_well_rows: usize,
    /// Wells whose decline fit fell back to the heuristic forecast
    pub fit_fallbacks: usize,
}

impl RunReport {
    /// Record a well-level failure. A second reason for the same well is appended.
    pub fn record_well(&mut self, err: &DataError) {
        warn!(well_id = %err.well_id(), error = %err, "Well excluded from candidate set");
        self.errors
            .entry(err.well_id().to_string())
            .and_modify(|reason| {
                reason.push_str("; ");
                reason.push_str(&err.to_string());
            })
            .or_insert_with(|| err.to_string());
    }

    pub fn record_row(&mut self, err: DataError) {
        warn!(well_id = %err.well_id(), error = %err, "Input row problem");
        self.rejected_rows.push(err);
    }

    pub fn is_excluded(&self, well_id: &str) -> bool {
        self.errors.contains_key(well_id)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.rejected_rows.is_empty() && self.unknown_well_rows == 0
    }

    /// `(well_id, kind, reason)` rows: excluded wells first, then dropped rows,
    /// both in well-id order.
    pub fn rows(&self) -> Vec<(String, &'static str, String)> {
        let mut rows: Vec<(String, &'static str, String)> = self
            .errors
            .iter()
            .map(|(id, reason)| (id.clone(), "well_excluded", reason.clone()))
            .collect();
        let mut dropped: Vec<(String, &'static str, String)> = self
            .rejected_rows
            .iter()
            .map(|e| (e.well_id().to_string(), "row_dropped", e.to_string()))
            .collect();
        dropped.sort();
        rows.extend(dropped);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_for_one_well_are_joined() {
        let mut report = RunReport::default();
        report.record_well(&DataError::InvalidField {
            well_id: "W9".into(),
            field: "gas".into(),
            value: "n/a".into(),
        });
        report.record_well(&DataError::NoProductionRecords { well_id: "W9".into() });
        assert_eq!(report.error_count(), 1);
        let reason = &report.errors["W9"];
        assert!(reason.contains("field 'gas' is not numeric"));
        assert!(reason.contains("; well W9: no usable production records"));
    }

    #[test]
    fn test_rows_are_sorted_by_well() {
        let mut report = RunReport::default();
        report.record_row(DataError::UnparseableDate {
            well_id: "B".into(),
            value: "bad".into(),
        });
        report.record_row(DataError::UnparseableDate {
            well_id: "A".into(),
            value: "bad".into(),
        });
        report.record_well(&DataError::NoProductionRecords { well_id: "Z".into() });
        let ids: Vec<String> = report.rows().into_iter().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec!["Z", "A", "B"]);
        assert!(!report.is_empty());
        assert!(report.is_excluded("Z"));
    }
}
