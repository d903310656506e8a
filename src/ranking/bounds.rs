//! Population-relative normalization bounds.
//!
//! Bounds are derived once per run from the non-excluded candidates and passed
//! explicitly into per-well scoring. Nothing here is global.

use serde::{Deserialize, Serialize};

use crate::config::defaults::QUANTILE_SPAN_FLOOR;
use crate::config::RankingConfig;
use crate::features::WellAnalysis;
use crate::types::feature_names as names;

/// Linear-interpolated quantile of an ascending slice; `None` when empty.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Robust min-max bounds for one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormBounds {
    pub lo: f64,
    pub hi: f64,
}

impl NormBounds {
    /// Bounds over the defined values; (0, 0) when there are none.
    pub fn from_values(mut values: Vec<f64>, lower_q: f64, upper_q: f64) -> Self {
        values.retain(|v| v.is_finite());
        values.sort_by(f64::total_cmp);
        Self {
            lo: quantile(&values, lower_q).unwrap_or(0.0),
            hi: quantile(&values, upper_q).unwrap_or(0.0),
        }
    }

    /// `(x − lo) / (hi − lo)` clipped to [0, 1], with the span floored.
    pub fn normalize(&self, x: f64) -> f64 {
        let span = (self.hi - self.lo).max(QUANTILE_SPAN_FLOOR);
        ((x - self.lo) / span).clamp(0.0, 1.0)
    }
}

/// Bounds for every normalized score term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationBounds {
    pub pre_stop_q90: NormBounds,
    pub pre_stop_peak: NormBounds,
    pub gas_recent: NormBounds,
}

impl PopulationBounds {
    pub fn from_population<'a>(
        population: impl IntoIterator<Item = &'a WellAnalysis> + Clone,
        config: &RankingConfig,
    ) -> Self {
        let lq = config.normalization.lower_quantile;
        let uq = config.normalization.upper_quantile;
        let gas_key = names::gas_window(config.weights.gas_window_months);
        let collect = |key: &str| -> Vec<f64> {
            population
                .clone()
                .into_iter()
                .filter_map(|a| a.features.get(key))
                .collect()
        };
        Self {
            pre_stop_q90: NormBounds::from_values(collect(names::PRE_STOP_Q90_MCF_D), lq, uq),
            pre_stop_peak: NormBounds::from_values(collect(names::PRE_STOP_PEAK_MCF), lq, uq),
            gas_recent: NormBounds::from_values(collect(&gas_key), lq, uq),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates_linearly() {
        let v = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        assert_eq!(quantile(&v, 0.10), Some(10.0));
        assert_eq!(quantile(&v, 0.90), Some(90.0));
        assert_eq!(quantile(&[1.0, 2.0], 0.5), Some(1.5));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.9), Some(7.0));
    }

    #[test]
    fn test_normalize_clips_to_unit_interval() {
        let b = NormBounds { lo: 10.0, hi: 90.0 };
        assert_eq!(b.normalize(50.0), 0.5);
        assert_eq!(b.normalize(-5.0), 0.0);
        assert_eq!(b.normalize(500.0), 1.0);
    }

    #[test]
    fn test_degenerate_span_uses_floor() {
        let b = NormBounds { lo: 5.0, hi: 5.0 };
        assert_eq!(b.normalize(5.0), 0.0);
        assert_eq!(b.normalize(5.1), 1.0);
        assert!(b.normalize(4.0).is_finite());
    }

    #[test]
    fn test_from_values_ignores_non_finite() {
        let b = NormBounds::from_values(vec![f64::NAN, 1.0, 3.0], 0.0, 1.0);
        assert_eq!(b, NormBounds { lo: 1.0, hi: 3.0 });
    }
}
