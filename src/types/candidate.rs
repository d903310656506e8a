//! Ranking-engine output types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::{FeatureVector, UNDEFINED};
use crate::features::WellAnalysis;

/// Additive penalty applied after the weighted base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTag {
    /// Months since last production above the long-shut-in threshold
    LongShutIn,
    /// PLSS-only location, no surveyed coordinate
    CoarseLocation,
    /// Short-window CV above the erratic threshold
    ErraticProduction,
}

impl PenaltyTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PenaltyTag::LongShutIn => "long_shut_in",
            PenaltyTag::CoarseLocation => "coarse_location",
            PenaltyTag::ErraticProduction => "erratic_production",
        }
    }
}

impl fmt::Display for PenaltyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a well was removed from the ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Shut in longer than the stale limit with no completion or permit on file.
    /// `months_since_prod` is `None` when the well never produced.
    StaleWithoutDocuments {
        months_since_prod: Option<f64>,
        limit_months: u32,
    },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::StaleWithoutDocuments {
                months_since_prod: Some(m),
                limit_months,
            } => write!(
                f,
                "shut in {m:.0} months (> {limit_months}) with no completion/permit documents"
            ),
            ExclusionReason::StaleWithoutDocuments {
                months_since_prod: None,
                ..
            } => write!(f, "no producing month on record and no completion/permit documents"),
        }
    }
}

/// Weighted contribution of each score term (already multiplied by its weight).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pre_stop_q90: f64,
    pub pre_stop_peak: f64,
    pub pre_stop_nonzero_frac: f64,
    pub pre_stop_stability: f64,
    pub recent_gas: f64,
    pub consistency: f64,
    pub coverage: f64,
    pub abrupt_stop: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.pre_stop_q90
            + self.pre_stop_peak
            + self.pre_stop_nonzero_frac
            + self.pre_stop_stability
            + self.recent_gas
            + self.consistency
            + self.coverage
            + self.abrupt_stop
    }

    /// Name and value of the largest contributing term.
    pub fn dominant_term(&self) -> (&'static str, f64) {
        [
            ("pre-stop rate", self.pre_stop_q90),
            ("pre-stop peak", self.pre_stop_peak),
            ("pre-stop uptime", self.pre_stop_nonzero_frac),
            ("pre-stop stability", self.pre_stop_stability),
            ("recent gas", self.recent_gas),
            ("consistency", self.consistency),
            ("data coverage", self.coverage),
            ("abrupt stop", self.abrupt_stop),
        ]
        .into_iter()
        .fold(("none", 0.0), |best, term| if term.1 > best.1 { term } else { best })
    }
}

/// A well after scoring, penalties, exclusion and ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub analysis: WellAnalysis,
    /// Weighted score before penalties
    pub base_score: f64,
    pub breakdown: ScoreBreakdown,
    /// Final score in [0, 1]; [`UNDEFINED`] when hard-excluded
    pub score: f64,
    pub penalties_applied: BTreeSet<PenaltyTag>,
    pub penalty_total: f64,
    /// 1-based position in the ranked output
    pub rank_index: Option<usize>,
    /// 1.0 for the top well, 0.0 for the bottom
    pub rank_percentile: Option<f64>,
    pub hard_excluded: Option<ExclusionReason>,
}

impl ScoredCandidate {
    /// A candidate removed before scoring.
    pub fn excluded(analysis: WellAnalysis, reason: ExclusionReason) -> Self {
        Self {
            analysis,
            base_score: UNDEFINED,
            breakdown: ScoreBreakdown::default(),
            score: UNDEFINED,
            penalties_applied: BTreeSet::new(),
            penalty_total: 0.0,
            rank_index: None,
            rank_percentile: None,
            hard_excluded: Some(reason),
        }
    }

    pub fn well_id(&self) -> &str {
        &self.analysis.well.well_id
    }

    pub fn features(&self) -> &FeatureVector {
        &self.analysis.features
    }

    pub fn is_excluded(&self) -> bool {
        self.hard_excluded.is_some()
    }

    /// Penalty tags joined for tabular output (`a;b`).
    pub fn penalty_list(&self) -> String {
        self.penalties_applied
            .iter()
            .map(PenaltyTag::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }
}
