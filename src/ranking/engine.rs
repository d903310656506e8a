//! Ranking Engine
//!
//! Two passes over the analysed population:
//!
//! 1. Hard exclusion, then normalization bounds over the survivors.
//! 2. Per-well weighted score with those bounds as an explicit argument,
//!    additive penalties, clamp to [0, 1], then a total, deterministic order.
//!
//! ## Score
//!
//! ```text
//! score = w1·norm(pre_stop_q90_mcf_d) + w2·norm(pre_stop_peak_mcf)
//!       + w3·pre_stop_nonzero_frac    + w4·(1 − min(pre_stop_cv, 1.5)/1.5)
//!       + w5·norm(gas_24m)            + w6·consistency_score
//!       + w7·dq_prod_cov              + w8·abrupt_stop_flag
//! ```
//!
//! Undefined pre-stop features contribute zero.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::bounds::PopulationBounds;
use crate::config::RankingConfig;
use crate::features::windows::stability;
use crate::features::WellAnalysis;
use crate::types::feature_names as names;
use crate::types::{ExclusionReason, PenaltyTag, ScoreBreakdown, ScoredCandidate};

/// Ranked survivors plus the hard-excluded wells (kept with their reason).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub ranked: Vec<ScoredCandidate>,
    pub excluded: Vec<ScoredCandidate>,
    pub bounds: PopulationBounds,
}

impl RankingOutcome {
    pub fn top_n(&self, n: usize) -> &[ScoredCandidate] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// Ranked wells at or above `min_percentile`.
    pub fn top_percentile(&self, min_percentile: f64) -> Vec<&ScoredCandidate> {
        self.ranked
            .iter()
            .take_while(|c| c.rank_percentile.unwrap_or(0.0) >= min_percentile)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

pub struct RankingEngine;

impl RankingEngine {
    /// Exclusion rule: shut in beyond the stale limit (or never produced) with no
    /// completion or permit on file.
    pub fn exclusion(analysis: &WellAnalysis, config: &RankingConfig) -> Option<ExclusionReason> {
        if analysis.signals.has_document_evidence() {
            return None;
        }
        let limit = config.exclusion.stale_months;
        let months = analysis.months_since_prod();
        let stale = months.map_or(true, |m| m > f64::from(limit));
        stale.then_some(ExclusionReason::StaleWithoutDocuments {
            months_since_prod: months,
            limit_months: limit,
        })
    }

    /// Weighted terms before penalties.
    pub fn breakdown(analysis: &WellAnalysis, bounds: &PopulationBounds, config: &RankingConfig) -> ScoreBreakdown {
        let w = &config.weights;
        let f = &analysis.features;
        let norm_or_zero = |key: &str, b: &super::bounds::NormBounds| f.get(key).map_or(0.0, |v| b.normalize(v));
        let gas_key = names::gas_window(w.gas_window_months);

        ScoreBreakdown {
            pre_stop_q90: w.pre_stop_q90 * norm_or_zero(names::PRE_STOP_Q90_MCF_D, &bounds.pre_stop_q90),
            pre_stop_peak: w.pre_stop_peak * norm_or_zero(names::PRE_STOP_PEAK_MCF, &bounds.pre_stop_peak),
            pre_stop_nonzero_frac: w.pre_stop_nonzero_frac
                * f.get(names::PRE_STOP_NONZERO_FRAC).map_or(0.0, |v| v.clamp(0.0, 1.0)),
            pre_stop_stability: w.pre_stop_cv * f.get(names::PRE_STOP_CV).map_or(0.0, stability),
            recent_gas: w.gas_recent * norm_or_zero(&gas_key, &bounds.gas_recent),
            consistency: w.consistency_score * f.get_or_zero(names::CONSISTENCY_SCORE).clamp(0.0, 1.0),
            coverage: w.dq_prod_cov * f.get_or_zero(names::DQ_PROD_COV).clamp(0.0, 1.0),
            abrupt_stop: w.abrupt_stop_flag * if f.flag(names::ABRUPT_STOP_FLAG) { 1.0 } else { 0.0 },
        }
    }

    /// Additive penalties and their total.
    pub fn penalties(analysis: &WellAnalysis, config: &RankingConfig) -> (BTreeSet<PenaltyTag>, f64) {
        let p = &config.penalties;
        let mut tags = BTreeSet::new();
        let mut total = 0.0;

        let long_shut_in = analysis
            .months_since_prod()
            .map_or(true, |m| m > f64::from(p.long_shut_in_months));
        if long_shut_in {
            tags.insert(PenaltyTag::LongShutIn);
            total += p.long_shut_in;
        }

        if !analysis.quality.location_precise {
            tags.insert(PenaltyTag::CoarseLocation);
            total += p.coarse_location;
        }

        let cv_short = analysis
            .features
            .get_or_zero(&names::cv_window(config.windows.short_months));
        if cv_short > p.erratic_cv_threshold {
            let excess = ((cv_short - p.erratic_cv_threshold) / (p.erratic_cv_full - p.erratic_cv_threshold))
                .clamp(0.0, 1.0);
            tags.insert(PenaltyTag::ErraticProduction);
            total += p.erratic_min + (p.erratic_max - p.erratic_min) * excess;
        }

        (tags, total)
    }

    /// Score one non-excluded well against explicit population bounds.
    pub fn score_candidate(analysis: WellAnalysis, bounds: &PopulationBounds, config: &RankingConfig) -> ScoredCandidate {
        let breakdown = Self::breakdown(&analysis, bounds, config);
        let base_score = breakdown.total();
        let (penalties_applied, penalty_total) = Self::penalties(&analysis, config);
        let score = (base_score - penalty_total).clamp(0.0, 1.0);
        ScoredCandidate {
            analysis,
            base_score,
            breakdown,
            score,
            penalties_applied,
            penalty_total,
            rank_index: None,
            rank_percentile: None,
            hard_excluded: None,
        }
    }

    /// Score descending, then pre-stop q90 descending, then well id ascending.
    pub fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
        let q90 = |c: &ScoredCandidate| c.analysis.pre_stop_q90().unwrap_or(f64::NEG_INFINITY);
        b.score
            .total_cmp(&a.score)
            .then_with(|| q90(b).total_cmp(&q90(a)))
            .then_with(|| a.well_id().cmp(b.well_id()))
    }

    /// Exclude, bound, score, order and assign rank positions.
    pub fn rank(analyses: Vec<WellAnalysis>, config: &RankingConfig) -> RankingOutcome {
        let (survivors, excluded): (Vec<_>, Vec<_>) = analyses
            .into_iter()
            .map(|a| {
                let reason = Self::exclusion(&a, config);
                (a, reason)
            })
            .partition(|(_, reason)| reason.is_none());

        let mut excluded: Vec<ScoredCandidate> = excluded
            .into_iter()
            .filter_map(|(a, reason)| reason.map(|r| ScoredCandidate::excluded(a, r)))
            .collect();
        excluded.sort_by(|a, b| a.well_id().cmp(b.well_id()));
        for c in &excluded {
            debug!(well_id = %c.well_id(), reason = ?c.hard_excluded, "Well hard-excluded");
        }

        let survivors: Vec<WellAnalysis> = survivors.into_iter().map(|(a, _)| a).collect();
        let bounds = PopulationBounds::from_population(survivors.iter(), config);

        let mut ranked: Vec<ScoredCandidate> = survivors
            .into_par_iter()
            .map(|a| Self::score_candidate(a, &bounds, config))
            .collect();
        ranked.sort_by(Self::compare);

        let n = ranked.len();
        for (i, c) in ranked.iter_mut().enumerate() {
            c.rank_index = Some(i + 1);
            c.rank_percentile = Some(if n > 1 {
                1.0 - i as f64 / (n - 1) as f64
            } else {
                1.0
            });
        }

        info!(
            ranked = ranked.len(),
            excluded = excluded.len(),
            "Ranking complete"
        );
        RankingOutcome {
            ranked,
            excluded,
            bounds,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
