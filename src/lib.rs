//! Reactivation Engine: Orphan Well Scoring and Ranking
//!
//! Ranks shut-in and orphaned gas wells for reactivation from their monthly
//! production history plus externally resolved access and document signals.
//!
//! ## Architecture
//!
//! - **Features**: per-well normalization, trailing windows, pre-shut-in
//!   behaviour, decline-curve forecast, data quality (independent per well)
//! - **Ranking**: population bounds, weighted score, penalties, hard exclusion,
//!   deterministic order and percentiles
//! - **Selection**: shortlist tiers, portfolio gate, Go/No-Go table
//! - **Pipeline**: map over wells, one barrier, rank, select
//!
//! The core performs no I/O; [`ingest`] and [`report`] are the file edges used
//! by the binary.

pub mod config;
pub mod features;
pub mod ingest;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod selection;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, RankingConfig};

// Re-export commonly used types
pub use types::{
    AccessSignals, ExclusionReason, FeatureVector, PenaltyTag, ProductionRecord, ProductionSeries,
    RawProductionRow, ReportMonth, ScoreBreakdown, ScoredCandidate, WellIdentity, UNDEFINED,
};

// Re-export stages
pub use features::{
    DataError, DeclineCurveFitter, DeclineFit, DeclineModel, FeatureExtractor, FitError, ProductionNormalizer,
    WellAnalysis,
};
pub use ranking::{RankingEngine, RankingOutcome};
pub use selection::{Decision, GoNoGoRow, PortfolioGate, PortfolioSelection, Shortlist, ShortlistSelector};

// Re-export orchestration
pub use pipeline::{PipelineCoordinator, PipelineError, PipelineInputs, PipelineOutcome, PipelineStats, RunReport};
