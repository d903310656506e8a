//! Window Feature Extractor
//!
//! Trailing-window aggregates over the canonical series. Absent months add
//! nothing to sums and are excluded from count-based statistics, while the
//! non-zero fraction always divides by the full window length.

use statrs::statistics::Statistics;

use crate::config::defaults::CV_CAP;
use crate::config::{RankingConfig, WindowAnchor};
use crate::types::feature_names as names;
use crate::types::{FeatureVector, ProductionRecord, ProductionSeries, ReportMonth};

/// Coefficient of variation (population std / mean) of non-zero volumes.
///
/// Exactly 0 when fewer than two non-zero values exist or the mean is not
/// positive, so it never produces NaN or infinity.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let nonzero: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if nonzero.len() < 2 {
        return 0.0;
    }
    let mean = nonzero.iter().mean();
    if !(mean > 0.0) {
        return 0.0;
    }
    let cv = nonzero.iter().population_std_dev() / mean;
    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}

/// Stability complement of a CV: 1 at CV 0, 0 at or beyond the cap.
pub fn stability(cv: f64) -> f64 {
    1.0 - cv.clamp(0.0, CV_CAP) / CV_CAP
}

/// Blend of short-window stability, uptime and end-of-window strength, in [0, 1].
pub fn consistency_score(cv: f64, nonzero_frac: f64, last_to_peak: f64) -> f64 {
    let score = 0.5 * stability(cv)
        + 0.25 * nonzero_frac.clamp(0.0, 1.0)
        + 0.25 * last_to_peak.clamp(0.0, 1.0);
    score.clamp(0.0, 1.0)
}

/// Aggregates for one trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub months: usize,
    pub gas: f64,
    pub nonzero_months: usize,
    pub nonzero_frac: f64,
    pub cv: f64,
    /// Last reported month's volume over the window peak, clamped to [0, 1]
    pub last_to_peak: f64,
}

impl WindowStats {
    /// Compute stats for the `months`-long window ending at `end` (inclusive).
    pub fn compute(series: &ProductionSeries, end: ReportMonth, months: usize) -> Self {
        let start = end.offset(1 - months as i64);
        let records = series.range(start, end);
        Self::from_records(records, months)
    }

    pub(crate) fn from_records(records: &[ProductionRecord], months: usize) -> Self {
        let volumes: Vec<f64> = records.iter().map(|r| r.gas_volume).collect();
        let nonzero_months = volumes.iter().filter(|v| **v > 0.0).count();
        let peak = volumes.iter().copied().fold(0.0, f64::max);
        let last = volumes.last().copied().unwrap_or(0.0);
        let last_to_peak = if peak > 0.0 {
            (last / peak).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            months,
            gas: volumes.iter().sum(),
            nonzero_months,
            nonzero_frac: if months > 0 {
                nonzero_months as f64 / months as f64
            } else {
                0.0
            },
            cv: coefficient_of_variation(&volumes),
            last_to_peak,
        }
    }
}

pub struct WindowFeatureExtractor;

impl WindowFeatureExtractor {
    /// Month the trailing windows end at for this well.
    pub fn anchor(series: &ProductionSeries, as_of: ReportMonth, anchor: WindowAnchor) -> ReportMonth {
        match anchor {
            WindowAnchor::AsOf => as_of,
            WindowAnchor::LatestReport => series.latest_month().unwrap_or(as_of),
        }
    }

    /// Window aggregates, recency, coverage and consistency for one well.
    ///
    /// `series` must already be truncated at `as_of`.
    pub fn extract(series: &ProductionSeries, as_of: ReportMonth, config: &RankingConfig) -> FeatureVector {
        let mut fv = FeatureVector::new();
        let windows = &config.windows;
        let end = Self::anchor(series, as_of, windows.anchor);

        for &months in &windows.months {
            let stats = WindowStats::compute(series, end, months);
            fv.set(names::gas_window(months), stats.gas);
            fv.set(names::nonzero_frac_window(months), stats.nonzero_frac);
            fv.set(names::cv_window(months), stats.cv);
        }

        let short = WindowStats::compute(series, end, windows.short_months);
        fv.set(names::LAST_TO_PEAK_RATIO_SHORT, short.last_to_peak);
        let consistency = if short.nonzero_months == 0 {
            0.0
        } else {
            consistency_score(short.cv, short.nonzero_frac, short.last_to_peak)
        };
        fv.set(names::CONSISTENCY_SCORE, consistency);

        match series.last_producing() {
            Some(last) => fv.set(names::MONTHS_SINCE_PROD, as_of.months_since(&last.month) as f64),
            None => fv.set_undefined(names::MONTHS_SINCE_PROD),
        }

        fv.set(names::DQ_PROD_COV, Self::coverage(series, end, windows.coverage_months));
        fv.set(names::GAS_ALL_TIME, series.total_gas());
        fv.set(
            names::NONZERO_MONTHS_ALL,
            series.records().iter().filter(|r| r.is_producing()).count() as f64,
        );
        fv
    }

    /// Fraction of the trailing `months` that carry any report (zero or not).
    pub fn coverage(series: &ProductionSeries, end: ReportMonth, months: usize) -> f64 {
        if months == 0 {
            return 0.0;
        }
        let start = end.offset(1 - months as i64);
        (series.range(start, end).len() as f64 / months as f64).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[(&str, f64)]) -> ProductionSeries {
        let records = values
            .iter()
            .map(|(m, g)| ProductionRecord {
                well_id: "W".into(),
                month: ReportMonth::parse(m).unwrap(),
                gas_volume: *g,
                oil_volume: 0.0,
                water_volume: 0.0,
                days_reported: None,
            })
            .collect();
        ProductionSeries::from_canonical("W".into(), records)
    }

    fn month(s: &str) -> ReportMonth {
        ReportMonth::parse(s).unwrap()
    }

    #[test]
    fn test_cv_guard_below_two_nonzero_months() {
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0, 500.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cv_is_population_std_over_mean() {
        // mean 2, population std 1
        let cv = coefficient_of_variation(&[1.0, 3.0, 0.0]);
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nonzero_frac_divides_by_full_window() {
        let s = series(&[("2020-10", 100.0), ("2020-11", 0.0), ("2020-12", 50.0)]);
        let stats = WindowStats::compute(&s, month("2020-12"), 12);
        assert_eq!(stats.nonzero_months, 2);
        assert_eq!(stats.nonzero_frac, 2.0 / 12.0);
        assert_eq!(stats.gas, 150.0);
        assert_eq!(stats.last_to_peak, 0.5);
    }

    #[test]
    fn test_window_excludes_months_before_start() {
        let s = series(&[("2019-12", 999.0), ("2020-01", 1.0), ("2020-12", 2.0)]);
        let stats = WindowStats::compute(&s, month("2020-12"), 12);
        assert_eq!(stats.gas, 3.0);
    }

    #[test]
    fn test_months_since_prod_and_undefined_sentinel() {
        let config = RankingConfig::default();
        let s = series(&[("2020-01", 10.0), ("2020-06", 0.0)]);
        let fv = WindowFeatureExtractor::extract(&s, month("2021-01"), &config);
        assert_eq!(fv.get(names::MONTHS_SINCE_PROD), Some(12.0));

        let dead = series(&[("2020-01", 0.0)]);
        let fv = WindowFeatureExtractor::extract(&dead, month("2021-01"), &config);
        assert_eq!(fv.get(names::MONTHS_SINCE_PROD), None);
        assert_eq!(fv.raw(names::MONTHS_SINCE_PROD), Some(crate::types::UNDEFINED));
        assert_eq!(fv.get(names::CONSISTENCY_SCORE), Some(0.0));
    }

    #[test]
    fn test_coverage_counts_reported_zero_months() {
        let s = series(&[("2020-01", 0.0), ("2020-02", 0.0), ("2020-03", 5.0)]);
        let cov = WindowFeatureExtractor::coverage(&s, month("2020-03"), 36);
        assert!((cov - 3.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_anchor_modes() {
        let s = series(&[("2020-03", 5.0)]);
        assert_eq!(
            WindowFeatureExtractor::anchor(&s, month("2022-01"), WindowAnchor::LatestReport),
            month("2020-03")
        );
        assert_eq!(
            WindowFeatureExtractor::anchor(&s, month("2022-01"), WindowAnchor::AsOf),
            month("2022-01")
        );
    }

    #[test]
    fn test_consistency_score_of_flat_full_window() {
        let values: Vec<(String, f64)> = (1..=12).map(|m| (format!("2020-{m:02}"), 100.0)).collect();
        let refs: Vec<(&str, f64)> = values.iter().map(|(m, g)| (m.as_str(), *g)).collect();
        let s = series(&refs);
        let fv = WindowFeatureExtractor::extract(&s, month("2020-12"), &RankingConfig::default());
        assert!((fv.get_or_zero(names::CONSISTENCY_SCORE) - 1.0).abs() < 1e-12);
        assert_eq!(fv.get(&names::nonzero_frac_window(12)), Some(1.0));
        assert_eq!(fv.get(&names::cv_window(12)), Some(0.0));
    }
}
