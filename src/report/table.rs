//! Tab-separated output tables.
//!
//! Column sets are fixed per configuration: feature columns come from the
//! configured windows plus the fixed feature names, never from whatever keys a
//! particular well happens to carry. Floats print with six decimals; undefined
//! features print as an empty cell.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::RankingConfig;
use crate::pipeline::RunReport;
use crate::selection::{GoNoGoRow, ShortlistEntry};
use crate::types::feature_names as names;
use crate::types::{ScoredCandidate, UNDEFINED};

/// Features that do not depend on the window list, in output order.
const FIXED_FEATURES: [&str; 25] = [
    names::LAST_TO_PEAK_RATIO_SHORT,
    names::CONSISTENCY_SCORE,
    names::MONTHS_SINCE_PROD,
    names::DQ_PROD_COV,
    names::GAS_ALL_TIME,
    names::NONZERO_MONTHS_ALL,
    names::PRE_STOP_AVG_MCF,
    names::PRE_STOP_PEAK_MCF,
    names::PRE_STOP_Q90_MCF_D,
    names::PRE_STOP_CV,
    names::PRE_STOP_NONZERO_FRAC,
    names::PRE_STOP_LAST_TO_PEAK_RATIO,
    names::ABRUPT_STOP_FLAG,
    names::Q30_MCF_D,
    names::Q90_MCF_D,
    names::Q180_MCF_D,
    names::Q90_EFFECTIVE_MCF_D,
    names::EUR_GAS_MCF,
    names::DCA_R_SQUARED,
    names::DCA_CONFIDENCE,
    names::DQ_LOC,
    names::DQ_FIT,
    names::DQ_PRE_STOP,
    names::DQ_SCORE,
    names::CATEGORY_SCORE,
];

/// A header plus string rows, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_tsv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| sanitize(c)).collect();
            writeln!(out, "{}", cells.join("\t"))?;
        }
        out.flush()
    }

    pub fn write_file(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_tsv(BufWriter::new(file))
    }

    pub fn to_tsv_string(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_tsv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn sanitize(cell: &str) -> String {
    cell.replace(['\t', '\n', '\r'], " ")
}

/// Six-decimal float; empty for the undefined sentinel or a non-finite value.
pub fn fmt_value(v: f64) -> String {
    if v == UNDEFINED || !v.is_finite() {
        String::new()
    } else {
        format!("{v:.6}")
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(String::new, fmt_value)
}

// ============================================================================
// Candidate Tables
// ============================================================================

/// Every feature column for this configuration, in output order.
pub fn feature_columns(config: &RankingConfig) -> Vec<String> {
    let mut columns = Vec::new();
    for &m in &config.windows.months {
        columns.push(names::gas_window(m));
        columns.push(names::nonzero_frac_window(m));
        columns.push(names::cv_window(m));
    }
    columns.extend(FIXED_FEATURES.iter().map(|s| (*s).to_string()));
    columns
}

const CANDIDATE_COLUMNS: [&str; 16] = [
    "rank_index",
    "rank_percentile",
    "well_id",
    "api14",
    "county",
    "state",
    "operator",
    "score",
    "base_score",
    "penalty_total",
    "penalties_applied",
    "hard_excluded",
    "category",
    "priority",
    "trend",
    "dca_model",
];

/// Ranked (or excluded) candidates with every feature column.
pub fn candidate_table(candidates: &[ScoredCandidate], config: &RankingConfig) -> Table {
    let features = feature_columns(config);
    let mut columns: Vec<String> = CANDIDATE_COLUMNS.iter().map(|s| (*s).to_string()).collect();
    columns.extend(features.iter().cloned());
    let mut table = Table::new(columns);

    for c in candidates {
        let a = &c.analysis;
        let mut row = vec![
            c.rank_index.map(|i| i.to_string()).unwrap_or_default(),
            fmt_opt(c.rank_percentile),
            a.well.well_id.clone(),
            a.well.api14.clone(),
            a.well.county.clone(),
            a.well.state.clone(),
            a.well.operator.clone().unwrap_or_default(),
            fmt_value(c.score),
            fmt_value(c.base_score),
            fmt_value(c.penalty_total),
            c.penalty_list(),
            c.hard_excluded.as_ref().map(ToString::to_string).unwrap_or_default(),
            a.category.category.as_str().to_string(),
            a.category.priority().as_str().to_string(),
            a.category.trend.as_str().to_string(),
            a.decline.model.name().to_string(),
        ];
        row.extend(features.iter().map(|f| fmt_opt(a.features.raw(f))));
        table.push(row);
    }
    table
}

pub fn shortlist_table(entries: &[ShortlistEntry]) -> Table {
    let columns = [
        "rank_index",
        "rank_percentile",
        "well_id",
        "county",
        "operator",
        "score",
        "q90_effective_mcf_d",
        "pre_stop_peak_mcf",
        "access_score",
        "tier",
        "gaps",
    ];
    let mut table = Table::new(columns.iter().map(|s| (*s).to_string()).collect());
    for e in entries {
        table.push(vec![
            e.rank_index.to_string(),
            fmt_value(e.rank_percentile),
            e.well_id.clone(),
            e.county.clone(),
            e.operator.clone().unwrap_or_default(),
            fmt_value(e.score),
            fmt_value(e.q90_effective_mcf_d),
            fmt_opt(e.pre_stop_peak_mcf),
            fmt_opt(e.access_score),
            e.tier.as_str().to_string(),
            e.gap_list(),
        ]);
    }
    table
}

pub fn go_no_go_table(rows: &[GoNoGoRow]) -> Table {
    let columns = [
        "well_id",
        "county",
        "q30_mcf_d",
        "q90_mcf_d",
        "q180_mcf_d",
        "eur_gas_mcf",
        "risk_flags",
        "rationale",
        "decision",
    ];
    let mut table = Table::new(columns.iter().map(|s| (*s).to_string()).collect());
    for r in rows {
        table.push(vec![
            r.well_id.clone(),
            r.county.clone(),
            fmt_value(r.q30_mcf_d),
            fmt_value(r.q90_mcf_d),
            fmt_value(r.q180_mcf_d),
            fmt_value(r.eur_gas_mcf),
            r.risk_flag_list(),
            r.rationale.clone(),
            r.decision.as_str().to_string(),
        ]);
    }
    table
}

pub fn run_errors_table(report: &RunReport) -> Table {
    let mut table = Table::new(vec!["well_id".into(), "kind".into(), "reason".into()]);
    for (well_id, kind, reason) in report.rows() {
        table.push(vec![well_id, kind.to_string(), reason]);
    }
    table
}
