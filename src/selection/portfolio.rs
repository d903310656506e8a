//! Portfolio Gate
//!
//! Greedy pick over the primary set in rank order until the aggregate
//! confidence-weighted q90 meets the target. A well is deferred when its county
//! (or operator) already holds picks and adding it would push that group's share
//! of the target above the cap. Every primary well not picked becomes an ordered
//! alternate for substitution after field validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::shortlist::ShortlistEntry;
use crate::config::PortfolioConfig;

/// Why a primary well sits on the alternates list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternateReason {
    CountyCap,
    OperatorCap,
    TargetMet,
    MaxPicks,
}

impl AlternateReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlternateReason::CountyCap => "county_cap",
            AlternateReason::OperatorCap => "operator_cap",
            AlternateReason::TargetMet => "target_met",
            AlternateReason::MaxPicks => "max_picks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternate {
    pub entry: ShortlistEntry,
    pub reason: AlternateReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSelection {
    pub picks: Vec<ShortlistEntry>,
    /// Ordered substitutes, best first
    pub alternates: Vec<Alternate>,
    pub total_rate_mcf_d: f64,
    pub target_rate_mcf_d: f64,
    pub target_met: bool,
}

impl PortfolioSelection {
    pub fn is_pick(&self, well_id: &str) -> bool {
        self.picks.iter().any(|e| e.well_id == well_id)
    }

    /// 1-based position on the alternates list.
    pub fn alternate_position(&self, well_id: &str) -> Option<usize> {
        self.alternates
            .iter()
            .position(|a| a.entry.well_id == well_id)
            .map(|i| i + 1)
    }
}

pub struct PortfolioGate;

impl PortfolioGate {
    pub fn select(primary: &[ShortlistEntry], config: &PortfolioConfig) -> PortfolioSelection {
        let target = config.target_rate_mcf_d;
        let mut picks: Vec<ShortlistEntry> = Vec::new();
        let mut alternates: Vec<Alternate> = Vec::new();
        let mut total = 0.0;
        let mut county_rate: BTreeMap<&str, f64> = BTreeMap::new();
        let mut operator_rate: BTreeMap<&str, f64> = BTreeMap::new();

        let mut ordered: Vec<&ShortlistEntry> = primary.iter().collect();
        ordered.sort_by_key(|e| e.rank_index);

        for entry in ordered {
            let rate = entry.q90_effective_mcf_d;
            let deferral = if total >= target {
                Some(AlternateReason::TargetMet)
            } else if picks.len() >= config.max_picks {
                Some(AlternateReason::MaxPicks)
            } else if Self::exceeds_cap(county_rate.get(entry.county.as_str()), rate, target, config.max_county_share) {
                Some(AlternateReason::CountyCap)
            } else if entry.operator.as_deref().is_some_and(|op| {
                Self::exceeds_cap(operator_rate.get(op), rate, target, config.max_operator_share)
            }) {
                Some(AlternateReason::OperatorCap)
            } else {
                None
            };

            match deferral {
                Some(reason) => alternates.push(Alternate {
                    entry: entry.clone(),
                    reason,
                }),
                None => {
                    total += rate;
                    *county_rate.entry(entry.county.as_str()).or_default() += rate;
                    if let Some(op) = entry.operator.as_deref() {
                        *operator_rate.entry(op).or_default() += rate;
                    }
                    picks.push(entry.clone());
                }
            }
        }

        let target_met = total >= target;
        info!(
            picks = picks.len(),
            alternates = alternates.len(),
            total_rate_mcf_d = total,
            target_met,
            "Portfolio selected"
        );
        PortfolioSelection {
            picks,
            alternates,
            total_rate_mcf_d: total,
            target_rate_mcf_d: target,
            target_met,
        }
    }

    /// A group with no picks yet is never capped.
    fn exceeds_cap(current: Option<&f64>, rate: f64, target: f64, max_share: f64) -> bool {
        current.is_some_and(|held| (held + rate) / target > max_share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::shortlist::Tier;

    fn entry(id: &str, rank: usize, county: &str, operator: Option<&str>, q90: f64) -> ShortlistEntry {
        ShortlistEntry {
            well_id: id.into(),
            county: county.into(),
            operator: operator.map(String::from),
            rank_index: rank,
            rank_percentile: 1.0,
            score: 0.9,
            q90_effective_mcf_d: q90,
            pre_stop_peak_mcf: None,
            access_score: Some(0.9),
            gaps: Vec::new(),
            tier: Tier::Primary,
        }
    }

    #[test]
    fn test_greedy_stops_at_target() {
        let primary = vec![
            entry("A", 1, "C1", None, 200.0),
            entry("B", 2, "C2", None, 150.0),
            entry("C", 3, "C3", None, 100.0),
        ];
        let sel = PortfolioGate::select(&primary, &PortfolioConfig::default());
        assert_eq!(sel.picks.len(), 2);
        assert!(sel.target_met);
        assert_eq!(sel.alternates.len(), 1);
        assert_eq!(sel.alternates[0].reason, AlternateReason::TargetMet);
        assert_eq!(sel.alternate_position("C"), Some(1));
    }

    #[test]
    fn test_county_cap_defers_second_pick() {
        let primary = vec![
            entry("A", 1, "CUSTER", None, 120.0),
            entry("B", 2, "CUSTER", None, 100.0),
            entry("C", 3, "DEWEY", None, 100.0),
            entry("D", 4, "ELLIS", None, 100.0),
        ];
        let sel = PortfolioGate::select(&primary, &PortfolioConfig::default());
        let ids: Vec<&str> = sel.picks.iter().map(|e| e.well_id.as_str()).collect();
        // B would put CUSTER at 220/300 > 0.5
        assert_eq!(ids, vec!["A", "C", "D"]);
        assert_eq!(sel.alternates[0].entry.well_id, "B");
        assert_eq!(sel.alternates[0].reason, AlternateReason::CountyCap);
        assert!(sel.target_met);
    }

    #[test]
    fn test_first_pick_in_a_county_is_never_capped() {
        let primary = vec![entry("A", 1, "CUSTER", None, 400.0)];
        let sel = PortfolioGate::select(&primary, &PortfolioConfig::default());
        assert!(sel.is_pick("A"));
    }

    #[test]
    fn test_operator_cap() {
        let primary = vec![
            entry("A", 1, "C1", Some("ACME"), 140.0),
            entry("B", 2, "C2", Some("ACME"), 100.0),
            entry("C", 3, "C3", Some("OTHER"), 100.0),
        ];
        let sel = PortfolioGate::select(&primary, &PortfolioConfig::default());
        assert_eq!(sel.alternates[0].reason, AlternateReason::OperatorCap);
        assert!(!sel.target_met);
        assert!((sel.total_rate_mcf_d - 240.0).abs() < 1e-12);
    }

    #[test]
    fn test_selection_is_deterministic_and_rank_ordered() {
        let primary = vec![
            entry("B", 2, "C2", None, 50.0),
            entry("A", 1, "C1", None, 50.0),
        ];
        let sel = PortfolioGate::select(&primary, &PortfolioConfig::default());
        assert_eq!(sel.picks[0].well_id, "A");
        assert_eq!(sel, PortfolioGate::select(&primary, &PortfolioConfig::default()));
    }

    #[test]
    fn test_max_picks() {
        let config = PortfolioConfig {
            max_picks: 1,
            ..PortfolioConfig::default()
        };
        let primary = vec![entry("A", 1, "C1", None, 10.0), entry("B", 2, "C2", None, 10.0)];
        let sel = PortfolioGate::select(&primary, &config);
        assert_eq!(sel.picks.len(), 1);
        assert_eq!(sel.alternates[0].reason, AlternateReason::MaxPicks);
    }
}
