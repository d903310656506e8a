//! Pre-Shut-In Analyzer
//!
//! Finds the month production stopped for good and characterises the window
//! leading up to it. A strong, steady well that stopped abruptly points to a
//! non-reservoir cause (operator distress, economics) rather than depletion.

use serde::{Deserialize, Serialize};

use super::windows::{coefficient_of_variation, WindowStats};
use crate::config::{RateProxyKind, ShutInConfig};
use crate::types::feature_names as names;
use crate::types::{FeatureVector, ProductionRecord, ProductionSeries, ReportMonth};

// ============================================================================
// Rate Proxy
// ============================================================================

/// Approximates the ~90-day producing rate just before the stop from monthly data.
pub trait RateProxy {
    /// Daily gas rate (MCF/d) near `stop`; `None` when nothing usable precedes it.
    fn rate_mcf_d(&self, series: &ProductionSeries, stop: ReportMonth, months: usize) -> Option<f64>;
}

/// Mean daily-equivalent rate of the last N non-zero months at or before the stop.
pub struct LastNonzeroMonths;

impl RateProxy for LastNonzeroMonths {
    fn rate_mcf_d(&self, series: &ProductionSeries, stop: ReportMonth, months: usize) -> Option<f64> {
        let upto = series.records().partition_point(|r| r.month <= stop);
        let rates: Vec<f64> = series.records()[..upto]
            .iter()
            .rev()
            .filter(|r| r.is_producing())
            .take(months)
            .map(ProductionRecord::gas_rate_mcf_d)
            .collect();
        if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        }
    }
}

/// Total volume over total days in the N calendar months ending at the stop.
/// Unreported months contribute their calendar days and no volume.
pub struct CalendarQuarter;

impl RateProxy for CalendarQuarter {
    fn rate_mcf_d(&self, series: &ProductionSeries, stop: ReportMonth, months: usize) -> Option<f64> {
        let mut volume = 0.0;
        let mut days = 0.0;
        for back in 0..months {
            let month = stop.offset(-(back as i64));
            match series.get(month) {
                Some(rec) => {
                    volume += rec.gas_volume;
                    days += match rec.days_reported {
                        Some(d) if d > 0.0 => d,
                        _ => month.days_in_month(),
                    };
                }
                None => days += month.days_in_month(),
            }
        }
        (days > 0.0 && volume > 0.0).then(|| volume / days)
    }
}

pub fn rate_proxy(kind: RateProxyKind) -> &'static dyn RateProxy {
    match kind {
        RateProxyKind::LastNonzeroMonths => &LastNonzeroMonths,
        RateProxyKind::CalendarQuarter => &CalendarQuarter,
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Behaviour over the window ending at the shut-in month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreShutInMetrics {
    /// Last producing month before the terminal zero run
    pub stop_month: ReportMonth,
    /// Months of zero/absent production from the stop month to the as-of month
    pub zero_run_months: i64,
    pub avg_mcf: f64,
    pub peak_mcf: f64,
    pub q90_mcf_d: f64,
    pub cv: f64,
    pub nonzero_frac: f64,
    pub last_to_peak_ratio: f64,
    pub abrupt_stop: bool,
}

pub struct PreShutInAnalyzer;

impl PreShutInAnalyzer {
    /// Shut-in month: the last producing month, provided every month after it up
    /// to `as_of` is zero or absent for at least `min_zero_run_months`.
    pub fn transition_month(
        series: &ProductionSeries,
        as_of: ReportMonth,
        min_zero_run_months: usize,
    ) -> Option<ReportMonth> {
        let last = series.last_producing()?;
        let run = as_of.months_since(&last.month);
        (run >= min_zero_run_months as i64).then_some(last.month)
    }

    /// `None` when the well is still producing or never produced.
    pub fn analyze(
        series: &ProductionSeries,
        as_of: ReportMonth,
        config: &ShutInConfig,
        abrupt_threshold: f64,
    ) -> Option<PreShutInMetrics> {
        let stop = Self::transition_month(series, as_of, config.min_zero_run_months)?;
        let window = config.pre_window_months;
        let stats = WindowStats::compute(series, stop, window);
        let records = series.range(stop.offset(1 - window as i64), stop);

        let nonzero: Vec<f64> = records
            .iter()
            .filter(|r| r.is_producing())
            .map(|r| r.gas_volume)
            .collect();
        let peak = nonzero.iter().copied().fold(0.0, f64::max);
        let avg = if nonzero.is_empty() {
            0.0
        } else {
            nonzero.iter().sum::<f64>() / nonzero.len() as f64
        };

        let last_volume = series.get(stop).map_or(0.0, |r| r.gas_volume);
        let last_to_peak = if peak > 0.0 {
            (last_volume / peak).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let q90 = rate_proxy(config.rate_proxy)
            .rate_mcf_d(series, stop, config.rate_tail_months)
            .unwrap_or(0.0);

        Some(PreShutInMetrics {
            stop_month: stop,
            zero_run_months: as_of.months_since(&stop),
            avg_mcf: avg,
            peak_mcf: peak,
            q90_mcf_d: q90,
            cv: coefficient_of_variation(&nonzero),
            nonzero_frac: stats.nonzero_frac,
            last_to_peak_ratio: last_to_peak,
            abrupt_stop: last_to_peak >= abrupt_threshold,
        })
    }

    /// Write pre-stop features; every one is the undefined sentinel without a transition.
    pub fn write_features(metrics: Option<&PreShutInMetrics>, fv: &mut FeatureVector) {
        let keys = [
            names::PRE_STOP_AVG_MCF,
            names::PRE_STOP_PEAK_MCF,
            names::PRE_STOP_Q90_MCF_D,
            names::PRE_STOP_CV,
            names::PRE_STOP_NONZERO_FRAC,
            names::PRE_STOP_LAST_TO_PEAK_RATIO,
            names::ABRUPT_STOP_FLAG,
        ];
        match metrics {
            Some(m) => {
                let values = [
                    m.avg_mcf,
                    m.peak_mcf,
                    m.q90_mcf_d,
                    m.cv,
                    m.nonzero_frac,
                    m.last_to_peak_ratio,
                    if m.abrupt_stop { 1.0 } else { 0.0 },
                ];
                for (key, value) in keys.into_iter().zip(values) {
                    fv.set(key, value);
                }
            }
            None => {
                for key in keys {
                    fv.set_undefined(key);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> ReportMonth {
        ReportMonth::parse(s).unwrap()
    }

    /// Consecutive monthly volumes starting at `start`.
    fn series_from(start: &str, volumes: &[f64]) -> ProductionSeries {
        let start = month(start);
        let records = volumes
            .iter()
            .enumerate()
            .map(|(i, g)| ProductionRecord {
                well_id: "W".into(),
                month: start.offset(i as i64),
                gas_volume: *g,
                oil_volume: 0.0,
                water_volume: 0.0,
                days_reported: Some(30.0),
            })
            .collect();
        ProductionSeries::from_canonical("W".into(), records)
    }

    fn analyze(series: &ProductionSeries, as_of: &str) -> Option<PreShutInMetrics> {
        let config = ShutInConfig::default();
        PreShutInAnalyzer::analyze(series, month(as_of), &config, config.abrupt_ratio_threshold)
    }

    #[test]
    fn test_still_producing_has_no_transition() {
        let s = series_from("2020-01", &[100.0; 24]);
        assert!(analyze(&s, "2021-12").is_none());
    }

    #[test]
    fn test_short_zero_run_is_not_shut_in() {
        let mut v = vec![100.0; 12];
        v.extend([0.0; 5]);
        let s = series_from("2020-01", &v);
        // last producing 2020-12, as-of 2021-05 -> run of 5
        assert!(analyze(&s, "2021-05").is_none());
        assert!(analyze(&s, "2021-06").is_some());
    }

    #[test]
    fn test_never_produced_is_undefined() {
        let s = series_from("2020-01", &[0.0; 12]);
        assert!(analyze(&s, "2022-01").is_none());
        let mut fv = FeatureVector::new();
        PreShutInAnalyzer::write_features(None, &mut fv);
        assert_eq!(fv.get(names::PRE_STOP_PEAK_MCF), None);
        assert!(!fv.flag(names::ABRUPT_STOP_FLAG));
    }

    #[test]
    fn test_abrupt_stop_at_peak() {
        // 43 producing months ramping to 41000, then zeros
        let mut v: Vec<f64> = (1..=43).map(|i| 41_000.0 * i as f64 / 43.0).collect();
        v.extend([0.0; 8]);
        let s = series_from("2015-01", &v);
        let m = analyze(&s, "2019-03").unwrap();
        assert_eq!(m.stop_month, month("2018-07"));
        assert!((m.peak_mcf - 41_000.0).abs() < 1e-6);
        assert!((m.last_to_peak_ratio - 1.0).abs() < 1e-12);
        assert!(m.abrupt_stop);
        assert_eq!(m.nonzero_frac, 1.0);
    }

    #[test]
    fn test_gradual_decline_is_not_abrupt() {
        let mut v: Vec<f64> = (0..12).map(|i| 10_000.0 * 0.8_f64.powi(i)).collect();
        v.extend([0.0; 6]);
        let s = series_from("2020-01", &v);
        let m = analyze(&s, "2021-06").unwrap();
        assert!(m.last_to_peak_ratio < 0.5);
        assert!(!m.abrupt_stop);
    }

    #[test]
    fn test_q90_proxy_uses_last_three_nonzero_months() {
        // last three non-zero months: 900, 600, 300 over 30 days -> mean 20 MCF/d
        let mut v = vec![3000.0, 900.0, 0.0, 600.0, 300.0];
        v.extend([0.0; 6]);
        let s = series_from("2020-01", &v);
        let m = analyze(&s, "2020-12").unwrap();
        assert!((m.q90_mcf_d - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_calendar_quarter_proxy_counts_gaps_as_days() {
        let s = series_from("2020-01", &[3000.0, 0.0, 3000.0]);
        let rate = CalendarQuarter.rate_mcf_d(&s, month("2020-03"), 3).unwrap();
        // 6000 MCF over 90 reported days
        assert!((rate - 6000.0 / 90.0).abs() < 1e-9);
        assert!(LastNonzeroMonths.rate_mcf_d(&s, month("2019-01"), 3).is_none());
    }
}
