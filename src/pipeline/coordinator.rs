//! Pipeline Coordinator
//!
//! Runs one ranking batch over an in-memory well universe:
//!
//! ```text
//! PHASE 1: Config validation       fail fast, nothing processed
//! PHASE 2: As-of resolution        config value, else latest month in the input
//! PHASE 3: Normalization           per well, errors into the run report (parallel)
//! PHASE 4: Feature extraction      per well, pure (parallel)
//! PHASE 5: Ranking                 population barrier, bounds, score, order
//! PHASE 6: Selection               shortlist, portfolio, Go/No-Go
//! ```
//!
//! Phases 3-4 are a stateless map over wells sorted by id; phase 5 is the only
//! point that sees the whole population.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::run_report::RunReport;
use crate::config::{ConfigError, RankingConfig};
use crate::features::{DataError, FeatureExtractor, ProductionNormalizer, WellAnalysis};
use crate::ranking::{RankingEngine, RankingOutcome};
use crate::selection::{
    GoNoGoBuilder, GoNoGoRow, PortfolioGate, PortfolioSelection, Shortlist, ShortlistSelector,
};
use crate::types::{AccessSignals, ProductionSeries, RawProductionRow, ReportMonth, WellIdentity};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("well universe is empty")]
    EmptyUniverse,
}

/// Everything one run consumes, already loaded.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    pub wells: Vec<WellIdentity>,
    pub rows: Vec<RawProductionRow>,
    /// Resolved access/risk signals by well id; missing wells get defaults
    pub signals: BTreeMap<String, AccessSignals>,
    /// Rows the loader could not parse, carried into the run report
    pub ingest_errors: Vec<DataError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub wells_in_universe: usize,
    pub wells_analyzed: usize,
    pub wells_ranked: usize,
    pub wells_excluded: usize,
    pub data_errors: usize,
    pub fit_fallbacks: usize,
    pub primary: usize,
    pub secondary: usize,
    pub portfolio_picks: usize,
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pipeline: {} wells, {} ranked ({} excluded, {} data errors), {} fit fallbacks, shortlist {}/{}, {} picks",
            self.wells_in_universe,
            self.wells_ranked,
            self.wells_excluded,
            self.data_errors,
            self.fit_fallbacks,
            self.primary,
            self.secondary,
            self.portfolio_picks
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// `None` only when no well had a parseable production month
    pub as_of: Option<ReportMonth>,
    pub ranking: RankingOutcome,
    pub shortlist: Shortlist,
    pub portfolio: PortfolioSelection,
    pub go_no_go: Vec<GoNoGoRow>,
    pub report: RunReport,
    pub stats: PipelineStats,
}

/// Owns a validated configuration and runs batches against it.
pub struct PipelineCoordinator {
    config: RankingConfig,
}

impl PipelineCoordinator {
    /// Validates the configuration; a bad config never reaches a well.
    pub fn new(config: RankingConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        info!(
            windows = ?config.windows.months,
            stale_months = config.exclusion.stale_months,
            "Pipeline coordinator initialized"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Configured as-of month, else the latest parseable month in `rows`.
    pub fn resolve_as_of<'a>(&self, rows: impl IntoIterator<Item = &'a RawProductionRow>) -> Option<ReportMonth> {
        self.config.run.as_of.or_else(|| {
            rows.into_iter()
                .filter_map(|r| ReportMonth::parse(&r.report_date))
                .max()
        })
    }

    pub fn run(&self, inputs: PipelineInputs) -> Result<PipelineOutcome, PipelineError> {
        let started = Instant::now();
        let config = &self.config;
        let PipelineInputs {
            wells,
            rows,
            signals,
            ingest_errors,
        } = inputs;

        if wells.is_empty() {
            return Err(PipelineError::EmptyUniverse);
        }

        // Universe sorted by id; later duplicates of an id are ignored
        let mut universe: BTreeMap<String, WellIdentity> = BTreeMap::new();
        for well in wells {
            if universe.contains_key(&well.well_id) {
                warn!(well_id = %well.well_id, "Duplicate well in universe, keeping first");
                continue;
            }
            universe.insert(well.well_id.clone(), well);
        }

        let mut report = RunReport::default();
        for err in ingest_errors {
            if err.excludes_well() && universe.contains_key(err.well_id()) {
                report.record_well(&err);
            } else {
                report.record_row(err);
            }
        }

        // ====================================================================
        // PHASE 2: As-of resolution
        // ====================================================================
        let mut grouped = ProductionNormalizer::group_by_well(rows);
        let unknown: Vec<String> = grouped
            .keys()
            .filter(|id| !universe.contains_key(*id))
            .cloned()
            .collect();
        for id in unknown {
            if let Some(dropped) = grouped.remove(&id) {
                report.unknown_well_rows += dropped.len();
                debug!(well_id = %id, rows = dropped.len(), "Rows for unknown well dropped");
                report.record_row(DataError::UnknownWell { well_id: id });
            }
        }
        let as_of = self.resolve_as_of(grouped.values().flatten());
        info!(
            wells = universe.len(),
            as_of = ?as_of.map(|m| m.to_string()),
            unknown_well_rows = report.unknown_well_rows,
            "Run started"
        );

        // ====================================================================
        // PHASE 3: Normalization
        // ====================================================================
        let empty: Vec<RawProductionRow> = Vec::new();
        // Wells already failed at ingest are not normalized
        let normalized: Vec<(&WellIdentity, Result<ProductionSeries, DataError>)> = universe
            .values()
            .filter(|well| !report.is_excluded(&well.well_id))
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|well| {
                let rows = grouped.get(&well.well_id).unwrap_or(&empty);
                (well, Self::prepare_series(well, rows, as_of))
            })
            .collect();

        let mut prepared: Vec<(&WellIdentity, ProductionSeries)> = Vec::with_capacity(normalized.len());
        for (well, result) in normalized {
            match result {
                Ok(series) => prepared.push((well, series)),
                Err(err) => report.record_well(&err),
            }
        }

        // ====================================================================
        // PHASE 4: Feature extraction
        // ====================================================================
        let default_signals = AccessSignals::default();
        let analyses: Vec<WellAnalysis> = match as_of {
            Some(as_of) => prepared
                .par_iter()
                .map(|(well, series)| {
                    let signals = signals.get(&well.well_id).unwrap_or(&default_signals);
                    FeatureExtractor::analyze(well, series, signals, as_of, config)
                })
                .collect(),
            None => Vec::new(),
        };
        report.fit_fallbacks = analyses
            .iter()
            .filter(|a| a.decline.fallback_reason.is_some())
            .count();
        let wells_analyzed = analyses.len();

        // ====================================================================
        // PHASE 5: Ranking (population barrier)
        // ====================================================================
        let ranking = RankingEngine::rank(analyses, config);

        // ====================================================================
        // PHASE 6: Selection
        // ====================================================================
        let shortlist = ShortlistSelector::select(&ranking.ranked, &config.shortlist);
        let portfolio = PortfolioGate::select(&shortlist.primary, &config.portfolio);
        let go_no_go = GoNoGoBuilder::build(&ranking.ranked, &ranking.excluded, &shortlist, &portfolio, config);

        let stats = PipelineStats {
            wells_in_universe: universe.len(),
            wells_analyzed,
            wells_ranked: ranking.ranked.len(),
            wells_excluded: ranking.excluded.len(),
            data_errors: report.error_count(),
            fit_fallbacks: report.fit_fallbacks,
            primary: shortlist.primary.len(),
            secondary: shortlist.secondary.len(),
            portfolio_picks: portfolio.picks.len(),
        };
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "{}", stats
        );

        Ok(PipelineOutcome {
            as_of,
            ranking,
            shortlist,
            portfolio,
            go_no_go,
            report,
            stats,
        })
    }

    /// Normalize and truncate one well. A well with nothing left at or before
    /// the as-of month is a data error.
    fn prepare_series(
        well: &WellIdentity,
        rows: &[RawProductionRow],
        as_of: Option<ReportMonth>,
    ) -> Result<ProductionSeries, DataError> {
        let no_records = || DataError::NoProductionRecords {
            well_id: well.well_id.clone(),
        };
        let normalized = ProductionNormalizer::normalize_well(&well.well_id, rows)?;
        let as_of = as_of.ok_or_else(no_records)?;
        let series = normalized.truncated(as_of);
        if series.is_empty() {
            return Err(no_records());
        }
        Ok(series)
    }
}
