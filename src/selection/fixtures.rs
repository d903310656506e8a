//! Hand-built scored candidates for selection tests.

use std::collections::BTreeSet;

use crate::config::RankingConfig;
use crate::features::{CategoryAssessment, DataQuality, DeclineFit, DeclineModel, Forecast, WellAnalysis};
use crate::types::feature_names as names;
use crate::types::{AccessSignals, FeatureVector, PenaltyTag, ScoreBreakdown, ScoredCandidate, WellIdentity};

/// A well that passes every shortlist gate: precise, accessible, well covered,
/// recently producing, above the site floor.
pub fn candidate(id: &str, county: &str, rank: usize, percentile: f64, q90_effective: f64) -> ScoredCandidate {
    let mut fv = FeatureVector::new();
    fv.set(names::Q90_EFFECTIVE_MCF_D, q90_effective);
    fv.set(names::PRE_STOP_PEAK_MCF, 30_000.0);
    fv.set(names::DQ_PROD_COV, 0.9);
    fv.set(names::MONTHS_SINCE_PROD, 12.0);

    let mut well = WellIdentity::from_raw_api(id, "3503900000", county, "OK");
    well.latitude = Some(35.5);
    well.longitude = Some(-99.0);
    let signals = AccessSignals {
        access_score: Some(0.9),
        ..AccessSignals::default()
    };
    let quality = DataQuality::assess(&well, &signals, 0.9, true, true);

    let analysis = WellAnalysis {
        well,
        signals,
        features: fv,
        pre_shut_in: None,
        decline: DeclineFit {
            model: DeclineModel::Heuristic {
                mean_rate: q90_effective,
            },
            r_squared: None,
            rmse: None,
            points: 0,
            forecast: Forecast {
                q30_mcf_d: q90_effective,
                q90_mcf_d: q90_effective,
                q180_mcf_d: q90_effective,
                eur_gas_mcf: q90_effective * 365.0,
            },
            fallback_reason: None,
        },
        quality,
        category: CategoryAssessment::classify(&[], &RankingConfig::default().categories),
        last_prod_month: None,
    };

    ScoredCandidate {
        analysis,
        base_score: percentile,
        breakdown: ScoreBreakdown {
            pre_stop_q90: 0.3,
            ..ScoreBreakdown::default()
        },
        score: percentile,
        penalties_applied: BTreeSet::new(),
        penalty_total: 0.0,
        rank_index: Some(rank),
        rank_percentile: Some(percentile),
        hard_excluded: None,
    }
}

/// Same well with the long shut-in penalty applied.
pub fn long_shut_in(mut c: ScoredCandidate, peak_mcf: f64) -> ScoredCandidate {
    c.analysis.features.set(names::PRE_STOP_PEAK_MCF, peak_mcf);
    c.analysis.features.set(names::MONTHS_SINCE_PROD, 72.0);
    c.penalties_applied.insert(PenaltyTag::LongShutIn);
    c
}
