//! Shortlist Selector
//!
//! Partitions the ranked list into a primary set (ready for field validation)
//! and a secondary set (good rank, or one fixable gap away from primary). A pure
//! filter: nothing is recomputed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ShortlistConfig;
use crate::types::feature_names as names;
use crate::types::{PenaltyTag, ScoredCandidate};

/// Reason a ranked well is not primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gap {
    /// Rank percentile below the primary cutoff
    LowRank,
    /// Confidence-weighted q90 below the site floor
    BelowSiteFloor,
    /// Access score missing or below the minimum
    PoorAccess,
    /// Long shut-in penalty applied
    LongShutIn,
    /// PLSS-only location
    CoarseLocation,
    /// Report coverage below the minimum
    SparseData,
}

impl Gap {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gap::LowRank => "low_rank",
            Gap::BelowSiteFloor => "below_site_floor",
            Gap::PoorAccess => "poor_access",
            Gap::LongShutIn => "long_shut_in",
            Gap::CoarseLocation => "coarse_location",
            Gap::SparseData => "sparse_data",
        }
    }
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    Secondary,
}

impl Tier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Secondary => "secondary",
        }
    }
}

/// One shortlisted well with the fields downstream selection needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub well_id: String,
    pub county: String,
    pub operator: Option<String>,
    pub rank_index: usize,
    pub rank_percentile: f64,
    pub score: f64,
    pub q90_effective_mcf_d: f64,
    pub pre_stop_peak_mcf: Option<f64>,
    pub access_score: Option<f64>,
    pub gaps: Vec<Gap>,
    pub tier: Tier,
}

impl ShortlistEntry {
    pub fn gap_list(&self) -> String {
        self.gaps.iter().map(Gap::as_str).collect::<Vec<_>>().join(";")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shortlist {
    pub primary: Vec<ShortlistEntry>,
    pub secondary: Vec<ShortlistEntry>,
}

impl Shortlist {
    pub fn tier_of(&self, well_id: &str) -> Option<Tier> {
        if self.primary.iter().any(|e| e.well_id == well_id) {
            Some(Tier::Primary)
        } else if self.secondary.iter().any(|e| e.well_id == well_id) {
            Some(Tier::Secondary)
        } else {
            None
        }
    }
}

pub struct ShortlistSelector;

impl ShortlistSelector {
    /// Every gap separating this candidate from primary, in a fixed order.
    pub fn gaps(candidate: &ScoredCandidate, config: &ShortlistConfig) -> Vec<Gap> {
        let analysis = &candidate.analysis;
        let mut gaps = Vec::new();
        if candidate.rank_percentile.unwrap_or(0.0) < config.primary_min_percentile {
            gaps.push(Gap::LowRank);
        }
        if analysis.q90_effective() < config.site_floor_mcf_d {
            gaps.push(Gap::BelowSiteFloor);
        }
        if analysis
            .signals
            .access()
            .map_or(true, |a| a < config.min_access_score)
        {
            gaps.push(Gap::PoorAccess);
        }
        if candidate.penalties_applied.contains(&PenaltyTag::LongShutIn) {
            gaps.push(Gap::LongShutIn);
        }
        if !analysis.quality.location_precise {
            gaps.push(Gap::CoarseLocation);
        }
        if analysis.quality.prod_coverage < config.min_prod_coverage {
            gaps.push(Gap::SparseData);
        }
        gaps
    }

    /// A gap that field work or paperwork can close.
    pub fn is_remediable(gap: Gap, candidate: &ScoredCandidate, config: &ShortlistConfig) -> bool {
        match gap {
            Gap::LongShutIn => candidate
                .features()
                .get(names::PRE_STOP_PEAK_MCF)
                .is_some_and(|peak| peak >= config.strong_peak_mcf),
            Gap::CoarseLocation | Gap::SparseData => true,
            Gap::LowRank | Gap::BelowSiteFloor | Gap::PoorAccess => false,
        }
    }

    /// Apart from rank, exactly one gap remains and it can be closed.
    fn one_remediable_gap(gaps: &[Gap], candidate: &ScoredCandidate, config: &ShortlistConfig) -> bool {
        let mut rest = gaps.iter().filter(|g| **g != Gap::LowRank);
        match (rest.next(), rest.next()) {
            (Some(gap), None) => Self::is_remediable(*gap, candidate, config),
            _ => false,
        }
    }

    /// Partition ranked candidates; both tiers keep rank order.
    pub fn select(ranked: &[ScoredCandidate], config: &ShortlistConfig) -> Shortlist {
        let mut shortlist = Shortlist::default();
        for candidate in ranked.iter().filter(|c| !c.is_excluded()) {
            let gaps = Self::gaps(candidate, config);
            let percentile = candidate.rank_percentile.unwrap_or(0.0);
            let tier = if gaps.is_empty() {
                Some(Tier::Primary)
            } else if percentile >= config.secondary_min_percentile
                || Self::one_remediable_gap(&gaps, candidate, config)
            {
                Some(Tier::Secondary)
            } else {
                None
            };
            let Some(tier) = tier else { continue };

            let analysis = &candidate.analysis;
            let entry = ShortlistEntry {
                well_id: analysis.well.well_id.clone(),
                county: analysis.well.county.clone(),
                operator: analysis.well.operator.clone(),
                rank_index: candidate.rank_index.unwrap_or(0),
                rank_percentile: percentile,
                score: candidate.score,
                q90_effective_mcf_d: analysis.q90_effective(),
                pre_stop_peak_mcf: analysis.features.get(names::PRE_STOP_PEAK_MCF),
                access_score: analysis.signals.access(),
                gaps,
                tier,
            };
            match tier {
                Tier::Primary => shortlist.primary.push(entry),
                Tier::Secondary => shortlist.secondary.push(entry),
            }
        }
        shortlist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::fixtures::{candidate, long_shut_in};

    #[test]
    fn test_clean_top_well_is_primary() {
        let c = candidate("A", "CUSTER", 1, 1.0, 120.0);
        let config = ShortlistConfig::default();
        assert!(ShortlistSelector::gaps(&c, &config).is_empty());
        let shortlist = ShortlistSelector::select(&[c], &config);
        assert_eq!(shortlist.tier_of("A"), Some(Tier::Primary));
        assert!(shortlist.secondary.is_empty());
    }

    #[test]
    fn test_gaps_are_collected_in_order() {
        let mut c = candidate("A", "CUSTER", 5, 0.4, 20.0);
        c.analysis.signals.access_score = None;
        let gaps = ShortlistSelector::gaps(&c, &ShortlistConfig::default());
        assert_eq!(gaps, vec![Gap::LowRank, Gap::BelowSiteFloor, Gap::PoorAccess]);
    }

    #[test]
    fn test_good_rank_with_gap_is_secondary() {
        let c = candidate("A", "CUSTER", 2, 0.9, 20.0);
        let shortlist = ShortlistSelector::select(&[c], &ShortlistConfig::default());
        assert_eq!(shortlist.tier_of("A"), Some(Tier::Secondary));
        assert_eq!(shortlist.secondary[0].gap_list(), "below_site_floor");
    }

    #[test]
    fn test_long_shut_in_with_strong_peak_is_remediable() {
        let config = ShortlistConfig::default();
        let strong = long_shut_in(candidate("A", "CUSTER", 8, 0.3, 120.0), 41_000.0);
        let weak = long_shut_in(candidate("B", "CUSTER", 9, 0.2, 120.0), 5_000.0);
        let shortlist = ShortlistSelector::select(&[strong, weak], &config);
        assert_eq!(shortlist.tier_of("A"), Some(Tier::Secondary));
        assert_eq!(shortlist.tier_of("B"), None);
    }

    #[test]
    fn test_coarse_location_alone_is_remediable() {
        let mut c = candidate("A", "CUSTER", 7, 0.35, 120.0);
        c.analysis.quality.location_precise = false;
        let shortlist = ShortlistSelector::select(&[c], &ShortlistConfig::default());
        assert_eq!(shortlist.tier_of("A"), Some(Tier::Secondary));
    }

    #[test]
    fn test_two_gaps_below_cutoff_are_dropped() {
        let mut c = candidate("A", "CUSTER", 7, 0.35, 120.0);
        c.analysis.quality.location_precise = false;
        c.analysis.quality.prod_coverage = 0.1;
        let shortlist = ShortlistSelector::select(&[c], &ShortlistConfig::default());
        assert_eq!(shortlist.tier_of("A"), None);
    }

    #[test]
    fn test_tiers_keep_rank_order() {
        let ranked = vec![
            candidate("A", "CUSTER", 1, 1.0, 120.0),
            candidate("B", "DEWEY", 2, 0.9, 10.0),
            candidate("C", "ELLIS", 3, 0.85, 90.0),
            candidate("D", "ELLIS", 4, 0.7, 90.0),
        ];
        let shortlist = ShortlistSelector::select(&ranked, &ShortlistConfig::default());
        let primary: Vec<&str> = shortlist.primary.iter().map(|e| e.well_id.as_str()).collect();
        let secondary: Vec<&str> = shortlist.secondary.iter().map(|e| e.well_id.as_str()).collect();
        assert_eq!(primary, vec!["A", "C"]);
        assert_eq!(secondary, vec!["B", "D"]);
    }
}
