//! Data-Quality Scorer
//!
//! Pure aggregation of coverage signals already computed upstream. The result
//! feeds the score (coverage term), the penalties (coarse location) and the
//! shortlist gates.

use serde::{Deserialize, Serialize};

use crate::types::feature_names as names;
use crate::types::{AccessSignals, FeatureVector, WellIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Fraction of the coverage window with any report
    pub prod_coverage: f64,
    /// Surveyed coordinate (true) versus PLSS-only (false)
    pub location_precise: bool,
    /// Decline forecast came from an accepted curve fit
    pub fit_confident: bool,
    /// A shut-in transition was found and pre-stop metrics exist
    pub pre_stop_defined: bool,
    /// Mean of the four indicators, in [0, 1]
    pub score: f64,
}

impl DataQuality {
    pub fn assess(
        well: &WellIdentity,
        signals: &AccessSignals,
        prod_coverage: f64,
        fit_confident: bool,
        pre_stop_defined: bool,
    ) -> Self {
        let location_precise = signals
            .precise_location
            .unwrap_or_else(|| well.has_coordinates());
        let prod_coverage = if prod_coverage.is_finite() {
            prod_coverage.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let score = (prod_coverage
            + flag(location_precise)
            + flag(fit_confident)
            + flag(pre_stop_defined))
            / 4.0;
        Self {
            prod_coverage,
            location_precise,
            fit_confident,
            pre_stop_defined,
            score,
        }
    }

    /// Human-readable gaps, in a fixed order.
    pub fn flags(&self, min_prod_coverage: f64) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.prod_coverage < min_prod_coverage {
            flags.push("sparse_reporting");
        }
        if !self.location_precise {
            flags.push("coarse_location");
        }
        if !self.fit_confident {
            flags.push("low_confidence_forecast");
        }
        if !self.pre_stop_defined {
            flags.push("no_shut_in_transition");
        }
        flags
    }

    pub fn write_features(&self, fv: &mut FeatureVector) {
        fv.set_flag(names::DQ_LOC, self.location_precise);
        fv.set_flag(names::DQ_FIT, self.fit_confident);
        fv.set_flag(names::DQ_PRE_STOP, self.pre_stop_defined);
        fv.set(names::DQ_SCORE, self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well() -> WellIdentity {
        WellIdentity::from_raw_api("W1", "35-039-21577", "CUSTER", "OK")
    }

    #[test]
    fn test_signal_overrides_identity_coordinates() {
        let mut w = well();
        w.latitude = Some(35.5);
        w.longitude = Some(-98.7);
        let plss = AccessSignals {
            precise_location: Some(false),
            ..Default::default()
        };
        assert!(!DataQuality::assess(&w, &plss, 1.0, true, true).location_precise);
        assert!(DataQuality::assess(&w, &AccessSignals::default(), 1.0, true, true).location_precise);
    }

    #[test]
    fn test_score_is_mean_of_indicators() {
        let q = DataQuality::assess(&well(), &AccessSignals::default(), 0.5, true, false);
        assert!((q.score - 0.375).abs() < 1e-12);
        assert_eq!(
            q.flags(0.25),
            vec!["coarse_location", "no_shut_in_transition"]
        );
    }

    #[test]
    fn test_nan_coverage_reads_as_zero() {
        let q = DataQuality::assess(&well(), &AccessSignals::default(), f64::NAN, false, false);
        assert_eq!(q.prod_coverage, 0.0);
        assert_eq!(q.score, 0.0);
    }
}
