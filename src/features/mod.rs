//! Per-Well Feature Extraction
//!
//! ## Stage Sequence (one well, no cross-well reads)
//!
//! ```text
//! STAGE 1: Production Normalizer   raw rows -> canonical monthly series
//! STAGE 2: Window Extractor        trailing sums, uptime, CV, recency, coverage
//! STAGE 3: Pre-Shut-In Analyzer    stop month and the window before it
//! STAGE 4: Decline Curve Fitter    exponential/hyperbolic fit or heuristic
//! STAGE 5: Data-Quality Scorer     coverage, location, fit and transition flags
//! ```
//!
//! Stage 1 runs in the pipeline (it decides which wells exist at all);
//! `FeatureExtractor::analyze` runs stages 2-5 and is a pure function of its
//! arguments.

pub mod decline;
pub mod normalizer;
pub mod pre_shutin;
pub mod quality;
pub mod trend;
pub mod windows;

pub use decline::{DeclineCurveFitter, DeclineFit, DeclineModel, FitConfidence, FitError, Forecast};
pub use normalizer::{DataError, ProductionNormalizer, PRODUCTION_FIELDS};
pub use pre_shutin::{PreShutInAnalyzer, PreShutInMetrics};
pub use quality::DataQuality;
pub use trend::{BusinessPriority, CategoryAssessment, ProductionTrend, ReactivationCategory};
pub use windows::WindowFeatureExtractor;

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::types::feature_names as names;
use crate::types::{AccessSignals, FeatureVector, ProductionSeries, ReportMonth, WellIdentity};

/// Everything derived for one well before population-relative scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellAnalysis {
    pub well: WellIdentity,
    pub signals: AccessSignals,
    pub features: FeatureVector,
    pub pre_shut_in: Option<PreShutInMetrics>,
    pub decline: DeclineFit,
    pub quality: DataQuality,
    pub category: CategoryAssessment,
    pub last_prod_month: Option<ReportMonth>,
}

impl WellAnalysis {
    pub fn well_id(&self) -> &str {
        &self.well.well_id
    }

    /// Months since last production; `None` when the well never produced.
    pub fn months_since_prod(&self) -> Option<f64> {
        self.features.get(names::MONTHS_SINCE_PROD)
    }

    pub fn pre_stop_q90(&self) -> Option<f64> {
        self.features.get(names::PRE_STOP_Q90_MCF_D)
    }

    pub fn q90_effective(&self) -> f64 {
        self.features.get_or_zero(names::Q90_EFFECTIVE_MCF_D)
    }
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Derive the full feature vector for one well.
    ///
    /// `series` must already be truncated at `as_of`.
    pub fn analyze(
        well: &WellIdentity,
        series: &ProductionSeries,
        signals: &AccessSignals,
        as_of: ReportMonth,
        config: &RankingConfig,
    ) -> WellAnalysis {
        let mut features = WindowFeatureExtractor::extract(series, as_of, config);

        let pre_shut_in = PreShutInAnalyzer::analyze(
            series,
            as_of,
            &config.shut_in,
            config.shut_in.abrupt_ratio_threshold,
        );
        PreShutInAnalyzer::write_features(pre_shut_in.as_ref(), &mut features);

        let decline = DeclineCurveFitter::fit(
            series,
            &config.decline,
            pre_shut_in.as_ref().map(|m| m.stop_month),
            config.shut_in.pre_window_months,
        );
        decline.write_features(config.decline.low_confidence_weight, &mut features);

        let quality = DataQuality::assess(
            well,
            signals,
            features.get_or_zero(names::DQ_PROD_COV),
            !decline.is_low_confidence(),
            pre_shut_in.is_some(),
        );
        quality.write_features(&mut features);

        let producing: Vec<f64> = series
            .records()
            .iter()
            .filter(|r| r.is_producing())
            .map(|r| r.gas_volume)
            .collect();
        let category = CategoryAssessment::classify(&producing, &config.categories);
        features.set(names::CATEGORY_SCORE, f64::from(category.category.score()));

        WellAnalysis {
            well: well.clone(),
            signals: signals.clone(),
            features,
            pre_shut_in,
            decline,
            quality,
            category,
            last_prod_month: series.last_producing().map(|r| r.month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductionRecord, UNDEFINED};

    fn series(start: &str, volumes: &[f64]) -> ProductionSeries {
        let start = ReportMonth::parse(start).unwrap();
        let records = volumes
            .iter()
            .enumerate()
            .map(|(i, g)| ProductionRecord {
                well_id: "W1".into(),
                month: start.offset(i as i64),
                gas_volume: *g,
                oil_volume: 0.0,
                water_volume: 0.0,
                days_reported: None,
            })
            .collect();
        ProductionSeries::from_canonical("W1".into(), records)
    }

    #[test]
    fn test_every_feature_is_finite_or_sentinel() {
        let mut v = vec![0.0, 1200.0, 0.0, 800.0];
        v.extend([0.0; 10]);
        let s = series("2019-01", &v);
        let well = WellIdentity::from_raw_api("W1", "3503921577", "CUSTER", "OK");
        let analysis = FeatureExtractor::analyze(
            &well,
            &s,
            &AccessSignals::default(),
            ReportMonth::parse("2020-06").unwrap(),
            &RankingConfig::default(),
        );
        for (name, value) in analysis.features.iter() {
            assert!(value.is_finite(), "{name} is not finite");
            assert!(value >= 0.0 || value == UNDEFINED, "{name} = {value}");
        }
        assert!(analysis.pre_shut_in.is_some());
        assert!(analysis.features.get(names::CATEGORY_SCORE).is_some());
        assert_eq!(analysis.last_prod_month, ReportMonth::parse("2019-04"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let v: Vec<f64> = (0..30).map(|i| 5000.0 * 0.95_f64.powi(i)).collect();
        let s = series("2018-01", &v);
        let well = WellIdentity::from_raw_api("W1", "3503921577", "CUSTER", "OK");
        let as_of = ReportMonth::parse("2021-01").unwrap();
        let config = RankingConfig::default();
        let a = FeatureExtractor::analyze(&well, &s, &AccessSignals::default(), as_of, &config);
        let b = FeatureExtractor::analyze(&well, &s, &AccessSignals::default(), as_of, &config);
        assert_eq!(a.features, b.features);
    }
}
