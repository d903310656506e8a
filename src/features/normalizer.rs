//! Production Normalizer
//!
//! Reduces raw provider rows to one canonical record per (well, month).
//! Volume fields resolve through a small policy table (primary field, then the
//! reported-total fallback, then zero), duplicate months are summed, and months
//! the provider never reported stay absent so coverage metrics can tell
//! "reported zero" from "not reported".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductionRecord, ProductionSeries, RawProductionRow, ReportMonth};

// ============================================================================
// Error Types
// ============================================================================

/// Per-well data problems. A well carrying one of these is excluded from the
/// candidate set and listed in the run report; it is never scored as zero.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DataError {
    #[error("well {well_id}: no usable production records")]
    NoProductionRecords { well_id: String },

    #[error("well {well_id}: unparseable report date '{value}'")]
    UnparseableDate { well_id: String, value: String },

    #[error("well {well_id}: field '{field}' is not numeric ('{value}')")]
    InvalidField {
        well_id: String,
        field: String,
        value: String,
    },

    #[error("well {well_id}: production rows for a well outside the candidate universe")]
    UnknownWell { well_id: String },
}

/// Production columns a well is scored from. A non-numeric cell in one of
/// these excludes the well rather than reading as zero.
pub const PRODUCTION_FIELDS: [&str; 6] = ["gas", "gas_total", "oil", "oil_total", "water", "days"];

impl DataError {
    /// Whether this error removes the whole well from the candidate set.
    /// Unknown-well rows and bad signal or location cells only drop the cell.
    pub fn excludes_well(&self) -> bool {
        match self {
            DataError::NoProductionRecords { .. } | DataError::UnparseableDate { .. } => true,
            DataError::InvalidField { field, .. } => PRODUCTION_FIELDS.contains(&field.as_str()),
            DataError::UnknownWell { .. } => false,
        }
    }

    pub fn well_id(&self) -> &str {
        match self {
            DataError::NoProductionRecords { well_id }
            | DataError::UnparseableDate { well_id, .. }
            | DataError::InvalidField { well_id, .. }
            | DataError::UnknownWell { well_id } => well_id,
        }
    }
}

// ============================================================================
// Field Policy
// ============================================================================

/// Canonical volume columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeField {
    Gas,
    Oil,
    Water,
}

type FieldGetter = fn(&RawProductionRow) -> Option<f64>;

/// Resolution rule for one canonical volume: primary field, optional fallback,
/// zero when both are null.
pub struct FieldRule {
    pub field: VolumeField,
    pub primary: FieldGetter,
    pub fallback: Option<FieldGetter>,
}

fn gas(r: &RawProductionRow) -> Option<f64> {
    r.gas
}
fn gas_total(r: &RawProductionRow) -> Option<f64> {
    r.gas_total
}
fn oil(r: &RawProductionRow) -> Option<f64> {
    r.oil
}
fn oil_total(r: &RawProductionRow) -> Option<f64> {
    r.oil_total
}
fn water(r: &RawProductionRow) -> Option<f64> {
    r.water
}

/// field → fallback field → zero
pub const VOLUME_POLICY: [FieldRule; 3] = [
    FieldRule {
        field: VolumeField::Gas,
        primary: gas,
        fallback: Some(gas_total),
    },
    FieldRule {
        field: VolumeField::Oil,
        primary: oil,
        fallback: Some(oil_total),
    },
    FieldRule {
        field: VolumeField::Water,
        primary: water,
        fallback: None,
    },
];

impl FieldRule {
    /// Resolve this field on one row. NaN and infinities count as null.
    pub fn resolve(&self, row: &RawProductionRow) -> f64 {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        finite((self.primary)(row))
            .or_else(|| self.fallback.and_then(|f| finite(f(row))))
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Normalizer
// ============================================================================

#[derive(Default)]
struct MonthAccumulator {
    gas: f64,
    oil: f64,
    water: f64,
    days: Option<f64>,
}

pub struct ProductionNormalizer;

impl ProductionNormalizer {
    /// Group raw rows by well id. Row order within a well is preserved.
    pub fn group_by_well(rows: Vec<RawProductionRow>) -> BTreeMap<String, Vec<RawProductionRow>> {
        let mut grouped: BTreeMap<String, Vec<RawProductionRow>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.well_id.clone()).or_default().push(row);
        }
        grouped
    }

    /// Reduce one well's raw rows to a canonical ascending series.
    ///
    /// Duplicate months are summed per field and then clamped at zero (negative
    /// rows are corrections). Reported days take the maximum across duplicates.
    /// A row with an unparseable date fails the whole well: its volume cannot
    /// be placed, so any series built without it would understate production.
    pub fn normalize_well(well_id: &str, rows: &[RawProductionRow]) -> Result<ProductionSeries, DataError> {
        let mut months: BTreeMap<ReportMonth, MonthAccumulator> = BTreeMap::new();

        for row in rows {
            let month = ReportMonth::parse(&row.report_date).ok_or_else(|| DataError::UnparseableDate {
                well_id: well_id.to_string(),
                value: row.report_date.clone(),
            })?;

            let acc = months.entry(month).or_default();
            for rule in &VOLUME_POLICY {
                let value = rule.resolve(row);
                match rule.field {
                    VolumeField::Gas => acc.gas += value,
                    VolumeField::Oil => acc.oil += value,
                    VolumeField::Water => acc.water += value,
                }
            }
            if let Some(days) = row.days.filter(|d| d.is_finite() && *d >= 0.0) {
                acc.days = Some(acc.days.map_or(days, |d| d.max(days)));
            }
        }

        if months.is_empty() {
            return Err(DataError::NoProductionRecords {
                well_id: well_id.to_string(),
            });
        }

        let records = months
            .into_iter()
            .map(|(month, acc)| ProductionRecord {
                well_id: well_id.to_string(),
                month,
                gas_volume: acc.gas.max(0.0),
                oil_volume: acc.oil.max(0.0),
                water_volume: acc.water.max(0.0),
                days_reported: acc.days,
            })
            .collect();

        Ok(ProductionSeries::from_canonical(well_id.to_string(), records))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, gas: Option<f64>) -> RawProductionRow {
        RawProductionRow {
            well_id: "W1".into(),
            report_date: date.into(),
            gas,
            ..Default::default()
        }
    }

    #[test]
    fn test_duplicate_months_are_summed() {
        let rows = vec![row("2020-01-01", Some(1000.0)), row("2020-01-01", Some(1500.0))];
        let out = ProductionNormalizer::normalize_well("W1", &rows).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.records()[0].gas_volume, 2500.0);
    }

    #[test]
    fn test_null_primary_falls_back_to_total_then_zero() {
        let mut with_total = row("2020-02", None);
        with_total.gas_total = Some(800.0);
        let rows = vec![with_total, row("2020-03", None), row("2020-04", Some(f64::NAN))];
        let out = ProductionNormalizer::normalize_well("W1", &rows).unwrap();
        let gas: Vec<f64> = out.records().iter().map(|r| r.gas_volume).collect();
        assert_eq!(gas, vec![800.0, 0.0, 0.0]);
    }

    #[test]
    fn test_water_has_no_fallback() {
        assert!(VOLUME_POLICY
            .iter()
            .any(|r| r.field == VolumeField::Water && r.fallback.is_none()));
    }

    #[test]
    fn test_missing_months_stay_absent_and_sorted() {
        let rows = vec![row("2020-05", Some(3.0)), row("2020-01", Some(1.0))];
        let out = ProductionNormalizer::normalize_well("W1", &rows).unwrap();
        let months: Vec<String> = out.records().iter().map(|r| r.month.to_string()).collect();
        assert_eq!(months, vec!["2020-01", "2020-05"]);
    }

    #[test]
    fn test_negative_corrections_clamp_at_zero() {
        let rows = vec![row("2020-01", Some(500.0)), row("2020-01", Some(-800.0))];
        let out = ProductionNormalizer::normalize_well("W1", &rows).unwrap();
        assert_eq!(out.records()[0].gas_volume, 0.0);
    }

    #[test]
    fn test_duplicate_days_take_maximum() {
        let mut a = row("2020-01", Some(100.0));
        a.days = Some(10.0);
        let mut b = row("2020-01", Some(100.0));
        b.days = Some(25.0);
        let out = ProductionNormalizer::normalize_well("W1", &[a, b]).unwrap();
        assert_eq!(out.records()[0].days_reported, Some(25.0));
    }

    #[test]
    fn test_no_rows_is_data_error() {
        let err = ProductionNormalizer::normalize_well("W9", &[]).unwrap_err();
        assert_eq!(
            err,
            DataError::NoProductionRecords {
                well_id: "W9".into()
            }
        );
    }

    #[test]
    fn test_unparseable_date_fails_the_well() {
        let rows = vec![row("2021-06", Some(2.0)), row("garbage", Some(1.0)), row("2021-07", Some(2.0))];
        assert_eq!(
            ProductionNormalizer::normalize_well("W1", &rows).unwrap_err(),
            DataError::UnparseableDate {
                well_id: "W1".into(),
                value: "garbage".into(),
            }
        );

        let non_ascii = vec![row("2020-01-0\u{e9}", Some(1.0))];
        assert!(matches!(
            ProductionNormalizer::normalize_well("W1", &non_ascii),
            Err(DataError::UnparseableDate { .. })
        ));
    }

    #[test]
    fn test_production_field_errors_exclude_the_well() {
        let invalid = |field: &str| DataError::InvalidField {
            well_id: "W1".into(),
            field: field.into(),
            value: "n/a".into(),
        };
        assert!(invalid("gas").excludes_well());
        assert!(invalid("days").excludes_well());
        assert!(!invalid("latitude").excludes_well());
        assert!(!invalid("access_score").excludes_well());
        assert!(!DataError::UnknownWell { well_id: "W1".into() }.excludes_well());
    }

    #[test]
    fn test_group_by_well_is_sorted_by_id() {
        let mut b = row("2020-01", Some(1.0));
        b.well_id = "B".into();
        let mut a = row("2020-01", Some(1.0));
        a.well_id = "A".into();
        let grouped = ProductionNormalizer::group_by_well(vec![b, a]);
        assert_eq!(grouped.keys().cloned().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
