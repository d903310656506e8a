//! Run summary (JSON): counts, category mix, score statistics and the leading
//! wells per business priority.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::features::BusinessPriority;
use crate::pipeline::PipelineOutcome;
use crate::ranking::bounds::quantile;

/// Wells listed per priority bucket.
const TOP_WELLS_PER_PRIORITY: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStatistics {
    /// All zeros for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            mean: Statistics::mean(scores.iter()),
            median: quantile(&sorted, 0.5).unwrap_or(0.0),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityBucket {
    pub count: usize,
    /// Best-ranked wells first
    pub wells: Vec<String>,
    pub action: String,
    pub timeline: String,
    pub risk_level: String,
    pub next_steps: Vec<String>,
}

impl PriorityBucket {
    fn empty(priority: BusinessPriority) -> Self {
        Self {
            action: priority.action().to_string(),
            timeline: priority.timeline().to_string(),
            risk_level: priority.risk_level().to_string(),
            next_steps: priority.next_steps().iter().map(|s| (*s).to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub as_of: Option<String>,
    pub total_wells: usize,
    pub wells_analyzed: usize,
    pub wells_ranked: usize,
    pub wells_excluded: usize,
    pub data_errors: usize,
    pub fit_fallbacks: usize,
    pub category_breakdown: BTreeMap<String, usize>,
    pub score_statistics: ScoreStatistics,
    pub priority_targets: BTreeMap<String, PriorityBucket>,
    pub shortlist_primary: usize,
    pub shortlist_secondary: usize,
    pub portfolio_picks: Vec<String>,
    pub portfolio_rate_mcf_d: f64,
    pub portfolio_target_met: bool,
}

impl RunSummary {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let ranking = &outcome.ranking;

        let mut category_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for c in ranking.ranked.iter().chain(&ranking.excluded) {
            *category_breakdown
                .entry(c.analysis.category.category.as_str().to_string())
                .or_default() += 1;
        }

        let mut priority_targets: BTreeMap<String, PriorityBucket> = [
            BusinessPriority::Immediate,
            BusinessPriority::High,
            BusinessPriority::Moderate,
            BusinessPriority::Low,
        ]
        .into_iter()
        .map(|p| (p.as_str().to_string(), PriorityBucket::empty(p)))
        .collect();
        for c in &ranking.ranked {
            let priority = c.analysis.category.priority();
            if let Some(bucket) = priority_targets.get_mut(priority.as_str()) {
                bucket.count += 1;
                if bucket.wells.len() < TOP_WELLS_PER_PRIORITY {
                    bucket.wells.push(c.well_id().to_string());
                }
            }
        }

        let scores: Vec<f64> = ranking.ranked.iter().map(|c| c.score).collect();
        let stats = &outcome.stats;
        Self {
            as_of: outcome.as_of.map(|m| m.to_string()),
            total_wells: stats.wells_in_universe,
            wells_analyzed: stats.wells_analyzed,
            wells_ranked: stats.wells_ranked,
            wells_excluded: stats.wells_excluded,
            data_errors: stats.data_errors,
            fit_fallbacks: stats.fit_fallbacks,
            category_breakdown,
            score_statistics: ScoreStatistics::from_scores(&scores),
            priority_targets,
            shortlist_primary: outcome.shortlist.primary.len(),
            shortlist_secondary: outcome.shortlist.secondary.len(),
            portfolio_picks: outcome.portfolio.picks.iter().map(|e| e.well_id.clone()).collect(),
            portfolio_rate_mcf_d: outcome.portfolio.total_rate_mcf_d,
            portfolio_target_met: outcome.portfolio.target_met,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
