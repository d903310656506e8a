//! Monthly production types: raw provider rows and the canonical per-well series.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Report Month
// ============================================================================

/// A calendar month (first-of-month normalized report period).
///
/// Ordering is chronological. Month arithmetic goes through [`ReportMonth::ordinal`]
/// so gaps between two months are exact calendar-month counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    /// Build a month, returning `None` when `month` is outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a provider report date.
    ///
    /// Accepts `YYYY-MM`, `YYYY-MM-DD` and ISO datetimes (`YYYY-MM-DDTHH:MM:SS...`);
    /// the day component is discarded.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(day_part) = raw.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(day_part, "%Y-%m-%d") {
                return Some(Self::from_date(date));
            }
        }
        let (year, month) = raw.split_once('-')?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Months since year 0, used for gap and window arithmetic.
    pub const fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        Self {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// Shift by a signed number of calendar months.
    pub fn offset(&self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    /// Calendar months from `earlier` to `self` (negative if `earlier` is later).
    pub const fn months_since(&self, earlier: &Self) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    /// Number of calendar days in this month.
    pub fn days_in_month(&self) -> f64 {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1);
        let next = self.offset(1);
        let next_first = NaiveDate::from_ymd_opt(next.year, next.month, 1);
        match (first, next_first) {
            (Some(a), Some(b)) => (b - a).num_days() as f64,
            _ => 30.0,
        }
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReportMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid report month '{s}' (expected YYYY-MM)"))
    }
}

impl TryFrom<String> for ReportMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportMonth> for String {
    fn from(value: ReportMonth) -> Self {
        value.to_string()
    }
}

// ============================================================================
// Raw Provider Rows
// ============================================================================

/// One raw monthly production row as delivered by the data provider.
///
/// Duplicates for the same (well, month) are expected. `None` means the
/// provider left the field empty; `*_total` fields are the alternate
/// reported-total columns used when the primary volume is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProductionRow {
    pub well_id: String,
    pub report_date: String,
    pub gas: Option<f64>,
    pub gas_total: Option<f64>,
    pub oil: Option<f64>,
    pub oil_total: Option<f64>,
    pub water: Option<f64>,
    pub days: Option<f64>,
}

// ============================================================================
// Canonical Series
// ============================================================================

/// Canonical single record per (well, month) after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub well_id: String,
    pub month: ReportMonth,
    /// Gas volume (MCF)
    pub gas_volume: f64,
    /// Oil volume (BBL)
    pub oil_volume: f64,
    /// Water volume (BBL)
    pub water_volume: f64,
    /// Producing days reported for the month, if the provider supplied them
    pub days_reported: Option<f64>,
}

impl ProductionRecord {
    /// Daily-equivalent gas rate (MCF/d).
    ///
    /// Uses reported days when positive, otherwise the calendar length of the month.
    pub fn gas_rate_mcf_d(&self) -> f64 {
        let days = match self.days_reported {
            Some(d) if d > 0.0 => d,
            _ => self.month.days_in_month(),
        };
        self.gas_volume / days
    }

    pub fn is_producing(&self) -> bool {
        self.gas_volume > 0.0
    }
}

/// Ordered, gap-preserving monthly series for one well.
///
/// Months with no report are absent (not zero). Invariant: `records` is
/// strictly ascending by month with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSeries {
    pub well_id: String,
    records: Vec<ProductionRecord>,
}

impl ProductionSeries {
    /// Build from records already reduced to one per month; sorts by month.
    pub(crate) fn from_canonical(well_id: String, mut records: Vec<ProductionRecord>) -> Self {
        records.sort_by_key(|r| r.month);
        records.dedup_by_key(|r| r.month);
        Self { well_id, records }
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn first_month(&self) -> Option<ReportMonth> {
        self.records.first().map(|r| r.month)
    }

    pub fn latest_month(&self) -> Option<ReportMonth> {
        self.records.last().map(|r| r.month)
    }

    /// Latest month with non-zero gas.
    pub fn last_producing(&self) -> Option<&ProductionRecord> {
        self.records.iter().rev().find(|r| r.is_producing())
    }

    pub fn get(&self, month: ReportMonth) -> Option<&ProductionRecord> {
        self.records
            .binary_search_by_key(&month, |r| r.month)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records with `start <= month <= end`, in order.
    pub fn range(&self, start: ReportMonth, end: ReportMonth) -> &[ProductionRecord] {
        let lo = self.records.partition_point(|r| r.month < start);
        let hi = self.records.partition_point(|r| r.month <= end);
        if lo >= hi {
            &[]
        } else {
            &self.records[lo..hi]
        }
    }

    /// Copy of the series truncated to months at or before `as_of`.
    pub fn truncated(&self, as_of: ReportMonth) -> Self {
        let hi = self.records.partition_point(|r| r.month <= as_of);
        Self {
            well_id: self.well_id.clone(),
            records: self.records[..hi].to_vec(),
        }
    }

    pub fn total_gas(&self) -> f64 {
        self.records.iter().map(|r| r.gas_volume).sum()
    }

    /// Highest monthly daily-equivalent gas rate ever observed (MCF/d).
    pub fn max_gas_rate(&self) -> f64 {
        self.records
            .iter()
            .map(ProductionRecord::gas_rate_mcf_d)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> ReportMonth {
        ReportMonth::parse(s).unwrap()
    }

    #[test]
    fn test_parse_accepts_provider_formats() {
        assert_eq!(month("2012-03"), ReportMonth::new(2012, 3).unwrap());
        assert_eq!(month("2012-03-17"), ReportMonth::new(2012, 3).unwrap());
        assert_eq!(month("2012-03-01T00:00:00Z"), ReportMonth::new(2012, 3).unwrap());
        assert!(ReportMonth::parse("2012-13").is_none());
        assert!(ReportMonth::parse("March 2012").is_none());
        assert!(ReportMonth::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_non_ascii_without_panicking() {
        assert!(ReportMonth::parse("2020-01-0\u{e9}").is_none());
        assert!(ReportMonth::parse("2020-0\u{e9}").is_none());
        assert!(ReportMonth::parse("\u{2014}\u{2014}\u{2014}\u{2014}").is_none());
    }

    #[test]
    fn test_month_arithmetic_crosses_years() {
        let m = month("2020-11");
        assert_eq!(m.offset(3), month("2021-02"));
        assert_eq!(m.offset(-11), month("2019-12"));
        assert_eq!(month("2021-02").months_since(&m), 3);
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(month("2020-02").days_in_month(), 29.0);
        assert_eq!(month("2021-02").days_in_month(), 28.0);
        assert_eq!(month("2021-12").days_in_month(), 31.0);
    }

    #[test]
    fn test_gas_rate_prefers_reported_days() {
        let mut rec = ProductionRecord {
            well_id: "W".into(),
            month: month("2021-04"),
            gas_volume: 3000.0,
            oil_volume: 0.0,
            water_volume: 0.0,
            days_reported: Some(15.0),
        };
        assert_eq!(rec.gas_rate_mcf_d(), 200.0);
        rec.days_reported = None;
        assert_eq!(rec.gas_rate_mcf_d(), 100.0);
        rec.days_reported = Some(0.0);
        assert_eq!(rec.gas_rate_mcf_d(), 100.0);
    }

    #[test]
    fn test_series_range_and_lookup() {
        let recs = ["2020-01", "2020-02", "2020-05"]
            .iter()
            .map(|m| ProductionRecord {
                well_id: "W".into(),
                month: month(m),
                gas_volume: 1.0,
                oil_volume: 0.0,
                water_volume: 0.0,
                days_reported: None,
            })
            .collect();
        let series = ProductionSeries::from_canonical("W".into(), recs);
        assert_eq!(series.range(month("2020-02"), month("2020-04")).len(), 1);
        assert!(series.get(month("2020-03")).is_none());
        assert_eq!(series.truncated(month("2020-02")).len(), 2);
        assert!(series.range(month("2021-01"), month("2020-01")).is_empty());
    }

    #[test]
    fn test_report_month_serde_as_string() {
        let json = serde_json::to_string(&month("2019-07")).unwrap();
        assert_eq!(json, "\"2019-07\"");
        let back: ReportMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month("2019-07"));
    }
}
