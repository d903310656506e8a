//! Production trend and reactivation category.
//!
//! A coarse, threshold-based reading of the producing months that sits next
//! to the composite score in every report. It never feeds the score.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::defaults::{TREND_BAND, TREND_COMPARE_MONTHS};
use crate::config::CategoryConfig;

// ============================================================================
// Trend
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionTrend {
    Increasing,
    Declining,
    Stable,
    InsufficientData,
}

impl ProductionTrend {
    /// Compare the latest 12 producing months with the 12 before them
    /// (first half against second half when fewer than 24 exist).
    pub fn classify(nonzero_volumes: &[f64]) -> Self {
        let n = nonzero_volumes.len();
        if n < TREND_COMPARE_MONTHS {
            return ProductionTrend::InsufficientData;
        }
        let (earlier, later) = if n >= 2 * TREND_COMPARE_MONTHS {
            (
                &nonzero_volumes[n - 2 * TREND_COMPARE_MONTHS..n - TREND_COMPARE_MONTHS],
                &nonzero_volumes[n - TREND_COMPARE_MONTHS..],
            )
        } else {
            let half = n / 2;
            (&nonzero_volumes[..half], &nonzero_volumes[n - half..])
        };
        let earlier = mean(earlier);
        let later = mean(later);
        if later > earlier * (1.0 + TREND_BAND) {
            ProductionTrend::Increasing
        } else if later < earlier * (1.0 - TREND_BAND) {
            ProductionTrend::Declining
        } else {
            ProductionTrend::Stable
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductionTrend::Increasing => "increasing",
            ProductionTrend::Declining => "declining",
            ProductionTrend::Stable => "stable",
            ProductionTrend::InsufficientData => "insufficient_data",
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ============================================================================
// Category
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactivationCategory {
    HighPotential,
    SurgePotential,
    DecliningViable,
    SporadicStrong,
    SporadicModerate,
    LowPotential,
    NoProduction,
}

impl ReactivationCategory {
    pub const fn score(&self) -> u8 {
        match self {
            ReactivationCategory::HighPotential => 95,
            ReactivationCategory::SurgePotential => 85,
            ReactivationCategory::DecliningViable => 70,
            ReactivationCategory::SporadicStrong => 60,
            ReactivationCategory::SporadicModerate => 40,
            ReactivationCategory::LowPotential => 20,
            ReactivationCategory::NoProduction => 0,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReactivationCategory::HighPotential => "high_potential",
            ReactivationCategory::SurgePotential => "surge_potential",
            ReactivationCategory::DecliningViable => "declining_viable",
            ReactivationCategory::SporadicStrong => "sporadic_strong",
            ReactivationCategory::SporadicModerate => "sporadic_moderate",
            ReactivationCategory::LowPotential => "low_potential",
            ReactivationCategory::NoProduction => "no_production",
        }
    }

    pub const fn priority(&self) -> BusinessPriority {
        BusinessPriority::from_score(self.score())
    }
}

impl fmt::Display for ReactivationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessPriority {
    Immediate,
    High,
    Moderate,
    Low,
}

impl BusinessPriority {
    pub const fn from_score(score: u8) -> Self {
        match score {
            85.. => BusinessPriority::Immediate,
            70..=84 => BusinessPriority::High,
            50..=69 => BusinessPriority::Moderate,
            _ => BusinessPriority::Low,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            BusinessPriority::Immediate => "immediate",
            BusinessPriority::High => "high",
            BusinessPriority::Moderate => "moderate",
            BusinessPriority::Low => "low",
        }
    }

    /// Recommended next step for wells at this priority.
    pub const fn action(&self) -> &'static str {
        match self {
            BusinessPriority::Immediate => "Fast-track to field survey within 30 days",
            BusinessPriority::High => "Include in reservoir validation batch within 60 days",
            BusinessPriority::Moderate => "Conditional target pending detailed analysis",
            BusinessPriority::Low => "Consider only as part of a package",
        }
    }

    pub const fn timeline(&self) -> &'static str {
        match self {
            BusinessPriority::Immediate => "Within 30 days",
            BusinessPriority::High => "Within 60 days",
            BusinessPriority::Moderate => "Within 90 days",
            BusinessPriority::Low => "No immediate action",
        }
    }

    pub const fn risk_level(&self) -> &'static str {
        match self {
            BusinessPriority::Immediate => "low",
            BusinessPriority::High => "low-medium",
            BusinessPriority::Moderate => "medium",
            BusinessPriority::Low => "high",
        }
    }

    /// Ordered work items for a well at this priority.
    pub const fn next_steps(&self) -> &'static [&'static str] {
        match self {
            BusinessPriority::Immediate => &[
                "Schedule site visit",
                "Begin landowner contact",
                "Prepare acquisition offer",
            ],
            BusinessPriority::High => &[
                "Field survey in next batch",
                "Reservoir engineering review",
                "Infrastructure assessment",
                "Economic modeling",
            ],
            BusinessPriority::Moderate => &[
                "Include in batch analysis",
                "Detailed reservoir validation",
                "Economic sensitivity analysis",
            ],
            BusinessPriority::Low => &["Monitor for status changes", "Package deals only"],
        }
    }
}

/// Category decision plus the figures it was based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssessment {
    pub category: ReactivationCategory,
    pub trend: ProductionTrend,
    pub recent_avg_mcf: f64,
    pub recent_max_mcf: f64,
    pub max_ever_mcf: f64,
    pub rationale: String,
}

impl CategoryAssessment {
    pub fn priority(&self) -> BusinessPriority {
        self.category.priority()
    }

    /// Decision tree over the most recent `analysis_months` producing months.
    pub fn classify(nonzero_volumes: &[f64], config: &CategoryConfig) -> Self {
        let trend = ProductionTrend::classify(nonzero_volumes);
        if nonzero_volumes.is_empty() {
            return Self {
                category: ReactivationCategory::NoProduction,
                trend,
                recent_avg_mcf: 0.0,
                recent_max_mcf: 0.0,
                max_ever_mcf: 0.0,
                rationale: "No positive production months found".to_string(),
            };
        }

        let start = nonzero_volumes.len().saturating_sub(config.analysis_months);
        let recent = &nonzero_volumes[start..];
        let recent_avg = mean(recent);
        let recent_max = recent.iter().copied().fold(0.0, f64::max);
        let max_ever = nonzero_volumes.iter().copied().fold(0.0, f64::max);
        let months_at_least = |floor: f64| recent.iter().filter(|v| **v >= floor).count();

        let consistent = months_at_least(config.high_consistent_mcf);
        let surge = months_at_least(config.surge_peak_mcf);
        let viable = months_at_least(config.viable_minimum_mcf);

        let (category, rationale) = if consistent >= config.high_consistent_min_months
            && recent_avg >= config.high_consistent_mcf
        {
            (
                ReactivationCategory::HighPotential,
                format!(
                    "Consistent high production: {consistent} months above {:.0} MCF, recent avg {recent_avg:.0}",
                    config.high_consistent_mcf
                ),
            )
        } else if surge >= 1 && recent_max >= config.surge_peak_mcf {
            (
                ReactivationCategory::SurgePotential,
                format!(
                    "Strong recent peaks: {surge} months above {:.0} MCF, max {recent_max:.0}",
                    config.surge_peak_mcf
                ),
            )
        } else if viable >= config.viable_min_months && recent_avg >= config.viable_minimum_mcf {
            (
                ReactivationCategory::DecliningViable,
                format!(
                    "Viable production: {viable} months above {:.0} MCF, recent avg {recent_avg:.0}",
                    config.viable_minimum_mcf
                ),
            )
        } else if max_ever >= config.surge_peak_mcf {
            (
                ReactivationCategory::SporadicStrong,
                format!("Historical strength: max {max_ever:.0} MCF, recent performance variable"),
            )
        } else if max_ever >= config.viable_minimum_mcf {
            (
                ReactivationCategory::SporadicModerate,
                format!("Moderate history: max {max_ever:.0} MCF, limited recent activity"),
            )
        } else {
            (
                ReactivationCategory::LowPotential,
                format!("Limited production: max {max_ever:.0} MCF"),
            )
        };

        Self {
            category,
            trend,
            recent_avg_mcf: recent_avg,
            recent_max_mcf: recent_max,
            max_ever_mcf: max_ever,
            rationale,
        }
    }
}
