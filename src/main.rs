//! Reactivation Engine CLI
//!
//! # Usage
//!
//! ```bash
//! # Rank a well universe
//! reactivation-engine rank --wells wells.csv --production production.csv \
//!     --signals signals.csv --out results/
//!
//! # Check a config file for typos and out-of-range values
//! reactivation-engine check-config ranking_config.toml
//!
//! # Dump the built-in defaults
//! reactivation-engine print-config > ranking_config.toml
//! ```
//!
//! # Environment Variables
//!
//! - `REACTIVATION_CONFIG`: path to the ranking config (overridden by `--config`)
//! - `RUST_LOG`: logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use reactivation_engine::config::validation::{validate_ranges, validate_unknown_keys};
use reactivation_engine::config::{RankingConfig, CONFIG_ENV_VAR};
use reactivation_engine::report::{
    candidate_table, go_no_go_table, run_errors_table, shortlist_table, RunSummary, Table,
};
use reactivation_engine::{ingest, PipelineCoordinator, PipelineInputs, ReportMonth};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "reactivation-engine")]
#[command(about = "Orphan well reactivation scoring and ranking")]
#[command(version)]
struct CliArgs {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score and rank a well universe, writing result tables to --out
    Rank {
        /// Well universe CSV
        #[arg(long)]
        wells: PathBuf,
        /// Monthly production CSV
        #[arg(long)]
        production: PathBuf,
        /// Access/document signals CSV
        #[arg(long)]
        signals: Option<PathBuf>,
        /// Ranking config TOML
        #[arg(long, env = CONFIG_ENV_VAR)]
        config: Option<PathBuf>,
        /// As-of month (YYYY-MM); overrides the config value
        #[arg(long, value_name = "YYYY-MM")]
        as_of: Option<String>,
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Rows in top_candidates.tsv
        #[arg(long, default_value = "50")]
        top: usize,
    },
    /// Validate a config file and report unknown keys and range problems
    CheckConfig { path: PathBuf },
    /// Print the built-in default config as TOML
    PrintConfig,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.json_logs);

    match args.command {
        Command::Rank {
            wells,
            production,
            signals,
            config,
            as_of,
            out,
            top,
        } => rank(&wells, &production, signals.as_deref(), config.as_deref(), as_of.as_deref(), &out, top),
        Command::CheckConfig { path } => check_config(&path),
        Command::PrintConfig => {
            print!("{}", RankingConfig::default().to_toml()?);
            Ok(())
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn rank(
    wells_path: &Path,
    production_path: &Path,
    signals_path: Option<&Path>,
    config_path: Option<&Path>,
    as_of: Option<&str>,
    out: &Path,
    top: usize,
) -> Result<()> {
    let (mut config, provenance) = RankingConfig::load(config_path).context("loading ranking config")?;
    if let Some(path) = &provenance.path {
        info!(path = %path.display(), "Using ranking config");
    }
    if let Some(raw) = as_of {
        let month = ReportMonth::parse(raw).with_context(|| format!("invalid --as-of '{raw}', expected YYYY-MM"))?;
        config.run.as_of = Some(month);
    }
    let coordinator = PipelineCoordinator::new(config)?;

    let wells = ingest::load_wells(wells_path)?;
    let production = ingest::load_production(production_path)?;
    let mut ingest_errors = wells.rejected;
    ingest_errors.extend(production.rejected);
    let signals = match signals_path {
        Some(path) => {
            let (signals, rejected) = ingest::load_signals(path)?;
            ingest_errors.extend(rejected);
            signals
        }
        None => {
            warn!("No signals file; every well has no access score or documents");
            Default::default()
        }
    };

    let outcome = coordinator.run(PipelineInputs {
        wells: wells.items,
        rows: production.items,
        signals,
        ingest_errors,
    })?;

    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let config = coordinator.config();
    let tables: [(&str, Table); 7] = [
        ("ranked_candidates.tsv", candidate_table(&outcome.ranking.ranked, config)),
        ("top_candidates.tsv", candidate_table(outcome.ranking.top_n(top), config)),
        ("excluded_candidates.tsv", candidate_table(&outcome.ranking.excluded, config)),
        ("shortlist_primary.tsv", shortlist_table(&outcome.shortlist.primary)),
        ("shortlist_secondary.tsv", shortlist_table(&outcome.shortlist.secondary)),
        ("go_no_go.tsv", go_no_go_table(&outcome.go_no_go)),
        ("run_errors.tsv", run_errors_table(&outcome.report)),
    ];
    for (name, table) in &tables {
        let path = out.join(name);
        table
            .write_file(&path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    let summary_path = out.join("summary.json");
    RunSummary::from_outcome(&outcome)
        .write_file(&summary_path)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    info!(out = %out.display(), "{}", outcome.stats);
    Ok(())
}

fn check_config(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    for w in validate_unknown_keys(&contents) {
        println!("warning: {w}");
    }
    let (config, _) = RankingConfig::from_toml_str(&contents).with_context(|| format!("{} is invalid", path.display()))?;
    let (_, warnings) = validate_ranges(&config);
    for w in &warnings {
        println!("warning: {w}");
    }
    println!("{}: OK", path.display());
    Ok(())
}
