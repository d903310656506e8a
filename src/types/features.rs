//! FeatureVector: flat, NaN-safe per-well features.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel stored for features whose inputs do not exist.
///
/// Every real feature is non-negative, so the sentinel never collides with a
/// computed value. NaN is never stored.
pub const UNDEFINED: f64 = -1.0;

/// Canonical feature names that do not depend on window length.
pub mod feature_names {
    pub const MONTHS_SINCE_PROD: &str = "months_since_prod";
    pub const DQ_PROD_COV: &str = "dq_prod_cov";
    pub const LAST_TO_PEAK_RATIO_SHORT: &str = "last_to_peak_ratio_short";
    pub const CONSISTENCY_SCORE: &str = "consistency_score";
    pub const GAS_ALL_TIME: &str = "gas_all_time";
    pub const NONZERO_MONTHS_ALL: &str = "nonzero_months_all";

    pub const PRE_STOP_AVG_MCF: &str = "pre_stop_avg_mcf";
    pub const PRE_STOP_PEAK_MCF: &str = "pre_stop_peak_mcf";
    pub const PRE_STOP_Q90_MCF_D: &str = "pre_stop_q90_mcf_d";
    pub const PRE_STOP_CV: &str = "pre_stop_cv";
    pub const PRE_STOP_NONZERO_FRAC: &str = "pre_stop_nonzero_frac";
    pub const PRE_STOP_LAST_TO_PEAK_RATIO: &str = "pre_stop_last_to_peak_ratio";
    pub const ABRUPT_STOP_FLAG: &str = "abrupt_stop_flag";

    pub const Q30_MCF_D: &str = "q30_mcf_d";
    pub const Q90_MCF_D: &str = "q90_mcf_d";
    pub const Q180_MCF_D: &str = "q180_mcf_d";
    pub const Q90_EFFECTIVE_MCF_D: &str = "q90_effective_mcf_d";
    pub const EUR_GAS_MCF: &str = "eur_gas_mcf";
    pub const DCA_R_SQUARED: &str = "dca_r_squared";
    pub const DCA_CONFIDENCE: &str = "dca_confidence";

    pub const DQ_LOC: &str = "dq_loc";
    pub const DQ_FIT: &str = "dq_fit";
    pub const DQ_PRE_STOP: &str = "dq_pre_stop";
    pub const DQ_SCORE: &str = "dq_score";

    pub const CATEGORY_SCORE: &str = "category_score";

    pub fn gas_window(months: usize) -> String {
        format!("gas_{months}m")
    }

    pub fn nonzero_frac_window(months: usize) -> String {
        format!("nonzero_frac_{months}m")
    }

    pub fn cv_window(months: usize) -> String {
        format!("cv_{months}m")
    }
}

/// One well's features, keyed by name.
///
/// Values are always finite; missing inputs are stored as [`UNDEFINED`].
/// Immutable once the extraction stage returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; non-finite input is recorded as [`UNDEFINED`].
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let value = if value.is_finite() { value } else { UNDEFINED };
        self.values.insert(name.into(), value);
    }

    pub fn set_undefined(&mut self, name: impl Into<String>) {
        self.values.insert(name.into(), UNDEFINED);
    }

    pub fn set_flag(&mut self, name: impl Into<String>, flag: bool) {
        self.set(name, if flag { 1.0 } else { 0.0 });
    }

    /// Merge another vector's entries into this one.
    pub fn extend(&mut self, other: Self) {
        self.values.extend(other.values);
    }

    /// Raw stored value (may be the sentinel); `None` if the feature was never set.
    pub fn raw(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Defined value only; `None` for unset or sentinel features.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.raw(name).filter(|v| *v != UNDEFINED)
    }

    /// Defined value or zero (the "zero contribution" reading used by scoring).
    pub fn get_or_zero(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v >= 0.5)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_become_sentinel() {
        let mut fv = FeatureVector::new();
        fv.set("a", f64::NAN);
        fv.set("b", f64::INFINITY);
        fv.set("c", 2.5);
        assert_eq!(fv.raw("a"), Some(UNDEFINED));
        assert_eq!(fv.get("b"), None);
        assert_eq!(fv.get("c"), Some(2.5));
        assert_eq!(fv.get_or_zero("a"), 0.0);
        assert_eq!(fv.get("missing"), None);
    }

    #[test]
    fn test_flags_read_back() {
        let mut fv = FeatureVector::new();
        fv.set_flag("on", true);
        fv.set_flag("off", false);
        fv.set_undefined("unknown");
        assert!(fv.flag("on"));
        assert!(!fv.flag("off"));
        assert!(!fv.flag("unknown"));
    }
}
