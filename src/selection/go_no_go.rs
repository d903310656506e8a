//! Go/No-Go table: one decision row per candidate, ranked wells first.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::portfolio::PortfolioSelection;
use super::shortlist::{Shortlist, Tier};
use crate::config::RankingConfig;
use crate::types::ScoredCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Portfolio pick
    Go,
    /// Primary well held as a substitute
    Alternate,
    /// Secondary shortlist: needs a gap closed first
    Review,
    NoGo,
}

impl Decision {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Decision::Go => "GO",
            Decision::Alternate => "ALTERNATE",
            Decision::Review => "REVIEW",
            Decision::NoGo => "NO_GO",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoNoGoRow {
    pub well_id: String,
    pub county: String,
    pub q30_mcf_d: f64,
    pub q90_mcf_d: f64,
    pub q180_mcf_d: f64,
    pub eur_gas_mcf: f64,
    pub risk_flags: Vec<String>,
    pub rationale: String,
    pub decision: Decision,
}

impl GoNoGoRow {
    pub fn risk_flag_list(&self) -> String {
        self.risk_flags.join(";")
    }
}

pub struct GoNoGoBuilder;

impl GoNoGoBuilder {
    /// Rows for ranked wells in rank order, then excluded wells by id.
    pub fn build(
        ranked: &[ScoredCandidate],
        excluded: &[ScoredCandidate],
        shortlist: &Shortlist,
        portfolio: &PortfolioSelection,
        config: &RankingConfig,
    ) -> Vec<GoNoGoRow> {
        let mut rows = Vec::with_capacity(ranked.len() + excluded.len());

        for c in ranked {
            let id = c.well_id();
            let (decision, stage) = match shortlist.tier_of(id) {
                Some(Tier::Primary) if portfolio.is_pick(id) => (Decision::Go, "portfolio pick".to_string()),
                Some(Tier::Primary) => {
                    let position = portfolio.alternate_position(id).unwrap_or(0);
                    let reason = portfolio
                        .alternates
                        .iter()
                        .find(|a| a.entry.well_id == id)
                        .map_or("unused", |a| a.reason.as_str());
                    (Decision::Alternate, format!("alternate #{position} ({reason})"))
                }
                Some(Tier::Secondary) => {
                    let gaps = shortlist
                        .secondary
                        .iter()
                        .find(|e| e.well_id == id)
                        .map(|e| e.gap_list())
                        .unwrap_or_default();
                    (Decision::Review, format!("secondary, gaps: {gaps}"))
                }
                None => (Decision::NoGo, "not shortlisted".to_string()),
            };

            let (term, _) = c.breakdown.dominant_term();
            let rationale = format!(
                "rank {} (p={:.2}), score {:.3}, driven by {}; {}; {}",
                c.rank_index.unwrap_or(0),
                c.rank_percentile.unwrap_or(0.0),
                c.score,
                term,
                c.analysis.category.category,
                stage
            );
            rows.push(Self::row(c, Self::risk_flags(c, config), rationale, decision));
        }

        for c in excluded {
            let rationale = c
                .hard_excluded
                .as_ref()
                .map_or_else(|| "excluded".to_string(), |r| format!("excluded: {r}"));
            let mut flags = vec!["hard_excluded".to_string()];
            flags.extend(Self::risk_flags(c, config));
            rows.push(Self::row(c, flags, rationale, Decision::NoGo));
        }
        rows
    }

    fn risk_flags(c: &ScoredCandidate, config: &RankingConfig) -> Vec<String> {
        let mut flags: Vec<String> = c.penalties_applied.iter().map(|p| p.as_str().to_string()).collect();
        for q in c.analysis.quality.flags(config.shortlist.min_prod_coverage) {
            if !flags.iter().any(|f| f == q) {
                flags.push(q.to_string());
            }
        }
        flags
    }

    fn row(c: &ScoredCandidate, risk_flags: Vec<String>, rationale: String, decision: Decision) -> GoNoGoRow {
        let forecast = &c.analysis.decline.forecast;
        GoNoGoRow {
            well_id: c.well_id().to_string(),
            county: c.analysis.well.county.clone(),
            q30_mcf_d: forecast.q30_mcf_d,
            q90_mcf_d: forecast.q90_mcf_d,
            q180_mcf_d: forecast.q180_mcf_d,
            eur_gas_mcf: forecast.eur_gas_mcf,
            risk_flags,
            rationale,
            decision,
        }
    }
}
