//! Ranking Configuration - every scoring threshold and weight as a TOML value
//!
//! Each struct implements `Default` with the documented defaults, so an empty
//! (or absent) config file reproduces the reference ranking. Constants that were
//! tuned to one basin's production units (pre-stop windows, category thresholds)
//! live here as defaults, never as fixed law.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::WEIGHT_SUM_TOLERANCE;
use crate::types::ReportMonth;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "REACTIVATION_CONFIG";

/// Config file looked up in the working directory when no path is given.
pub const LOCAL_CONFIG_FILE: &str = "ranking_config.toml";

// ============================================================================
// Config Provenance
// ============================================================================

/// Where the active configuration came from, plus which keys the file set.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    /// `None` when running on built-in defaults
    pub path: Option<PathBuf>,
    /// Dotted key paths explicitly present in the file
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one ranking run.
///
/// Load with `RankingConfig::load()` which searches:
/// 1. an explicit path (CLI `--config`)
/// 2. `$REACTIVATION_CONFIG`
/// 3. `./ranking_config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Run-level cutoff
    #[serde(default)]
    pub run: RunConfig,

    /// Trailing window aggregates
    #[serde(default)]
    pub windows: WindowConfig,

    /// Shut-in transition detection and pre-stop metrics
    #[serde(default)]
    pub shut_in: ShutInConfig,

    /// Decline curve fitting and forecasts
    #[serde(default)]
    pub decline: DeclineConfig,

    /// Score weights
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Population-relative normalization
    #[serde(default)]
    pub normalization: NormalizationConfig,

    /// Additive penalties
    #[serde(default)]
    pub penalties: PenaltyConfig,

    /// Hard exclusion rules
    #[serde(default)]
    pub exclusion: ExclusionConfig,

    /// Phase-1 shortlist thresholds
    #[serde(default)]
    pub shortlist: ShortlistConfig,

    /// Phase-2 portfolio gate
    #[serde(default)]
    pub portfolio: PortfolioConfig,

    /// Reactivation category decision tree
    #[serde(default)]
    pub categories: CategoryConfig,
}

impl RankingConfig {
    /// Load configuration using the standard search order.
    ///
    /// Unlike defaults-on-error loaders, a file that exists but cannot be parsed
    /// or validated is an error: a misconfigured run would rank every well wrong.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigProvenance), ConfigError> {
        // 1. Explicit path
        if let Some(path) = explicit {
            return Self::load_from_file_with_provenance(path);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let loaded = Self::load_from_file_with_provenance(&p)?;
                info!(path = %p.display(), "Loaded ranking config from {}", CONFIG_ENV_VAR);
                return Ok(loaded);
            }
            warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
        }

        // 3. ./ranking_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            let loaded = Self::load_from_file_with_provenance(&local)?;
            info!("Loaded ranking config from ./{}", LOCAL_CONFIG_FILE);
            return Ok(loaded);
        }

        // 4. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Ok((Self::default(), ConfigProvenance::default()))
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Load from a specific TOML file path, also returning provenance.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let (config, mut provenance) = Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
                other => other,
            })?;
        provenance.path = Some(path.to_path_buf());
        Ok((config, provenance))
    }

    /// Parse and validate a TOML document.
    ///
    /// Two-pass: unknown keys are reported as warnings first, then serde parses
    /// and `validate()` checks every rule.
    pub fn from_toml_str(contents: &str) -> Result<(Self, ConfigProvenance), ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let explicit_keys = contents
            .parse::<toml::Value>()
            .map(|v| super::validation::walk_toml_keys(&v, "").into_iter().collect())
            .unwrap_or_default();

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok((
            config,
            ConfigProvenance {
                path: None,
                explicit_keys,
            },
        ))
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Ranking config saved");
        Ok(())
    }

    /// Validate every rule and report all violations at once.
    ///
    /// Rules:
    /// - Score weights are each in [0, 1] and sum to 1.0
    /// - Window lengths are > 0 and every window a rule depends on is computed
    /// - Fractions, ratios and quantiles lie in their valid ranges
    /// - Penalty bands are ordered (min <= max, threshold < full)
    /// - Category thresholds escalate (viable < consistent < surge)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Weights
        let w = &self.weights;
        for (name, value) in w.terms() {
            Self::check_unit(value, &format!("weights.{name}"), &mut errors);
        }
        let weight_sum = w.sum();
        if !weight_sum.is_finite() || (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("weights must sum to 1.0, got {weight_sum:.4}"));
        }

        // Windows
        let win = &self.windows;
        if win.months.is_empty() {
            errors.push("windows.months must list at least one window".to_string());
        }
        if win.months.contains(&0) {
            errors.push("windows.months: window lengths must be > 0".to_string());
        }
        Self::check_window_listed(win.short_months, "windows.short_months", win, &mut errors);
        Self::check_window_listed(w.gas_window_months, "weights.gas_window_months", win, &mut errors);
        if win.coverage_months == 0 {
            errors.push("windows.coverage_months must be > 0".to_string());
        }

        // Shut-in
        let s = &self.shut_in;
        if s.min_zero_run_months == 0 {
            errors.push("shut_in.min_zero_run_months must be > 0".to_string());
        }
        if s.pre_window_months == 0 {
            errors.push("shut_in.pre_window_months must be > 0".to_string());
        }
        if s.rate_tail_months == 0 {
            errors.push("shut_in.rate_tail_months must be > 0".to_string());
        }
        Self::check_unit(s.abrupt_ratio_threshold, "shut_in.abrupt_ratio_threshold", &mut errors);

        // Decline
        let d = &self.decline;
        if d.tail_months == 0 {
            errors.push("decline.tail_months must be > 0".to_string());
        }
        if d.min_points < 2 {
            errors.push(format!("decline.min_points must be >= 2, got {}", d.min_points));
        }
        Self::check_unit(d.min_r_squared, "decline.min_r_squared", &mut errors);
        if !(d.b_max > 0.0 && d.b_max <= 2.0) {
            errors.push(format!("decline.b_max must be in (0, 2], got {}", d.b_max));
        }
        if !(d.b_step > 0.0 && d.b_step <= d.b_max) {
            errors.push(format!("decline.b_step must be in (0, b_max], got {}", d.b_step));
        }
        if !(d.rate_cap_multiple.is_finite() && d.rate_cap_multiple >= 1.0) {
            errors.push(format!(
                "decline.rate_cap_multiple must be >= 1.0, got {}",
                d.rate_cap_multiple
            ));
        }
        Self::check_non_negative(d.economic_limit_mcf_d, "decline.economic_limit_mcf_d", &mut errors);
        if d.eur_horizon_months == 0 {
            errors.push("decline.eur_horizon_months must be > 0".to_string());
        }
        Self::check_unit(d.low_confidence_weight, "decline.low_confidence_weight", &mut errors);

        // Normalization
        let n = &self.normalization;
        Self::check_unit(n.lower_quantile, "normalization.lower_quantile", &mut errors);
        Self::check_unit(n.upper_quantile, "normalization.upper_quantile", &mut errors);
        if n.lower_quantile >= n.upper_quantile {
            errors.push(format!(
                "normalization.lower_quantile ({:.2}) must be < upper_quantile ({:.2})",
                n.lower_quantile, n.upper_quantile
            ));
        }

        // Penalties
        let p = &self.penalties;
        Self::check_unit(p.long_shut_in, "penalties.long_shut_in", &mut errors);
        Self::check_unit(p.coarse_location, "penalties.coarse_location", &mut errors);
        Self::check_unit(p.erratic_min, "penalties.erratic_min", &mut errors);
        Self::check_unit(p.erratic_max, "penalties.erratic_max", &mut errors);
        Self::check_escalation(p.erratic_min, p.erratic_max, "penalties.erratic", &mut errors);
        Self::check_non_negative(p.erratic_cv_threshold, "penalties.erratic_cv_threshold", &mut errors);
        if p.erratic_cv_full <= p.erratic_cv_threshold {
            errors.push(format!(
                "penalties.erratic_cv_full ({:.2}) must be > erratic_cv_threshold ({:.2})",
                p.erratic_cv_full, p.erratic_cv_threshold
            ));
        }

        // Exclusion
        if self.exclusion.stale_months < p.long_shut_in_months {
            errors.push(format!(
                "exclusion.stale_months ({}) must be >= penalties.long_shut_in_months ({})",
                self.exclusion.stale_months, p.long_shut_in_months
            ));
        }

        // Shortlist
        let sl = &self.shortlist;
        Self::check_unit(sl.primary_min_percentile, "shortlist.primary_min_percentile", &mut errors);
        Self::check_unit(sl.secondary_min_percentile, "shortlist.secondary_min_percentile", &mut errors);
        Self::check_escalation(
            sl.secondary_min_percentile,
            sl.primary_min_percentile,
            "shortlist.min_percentile",
            &mut errors,
        );
        Self::check_unit(sl.min_access_score, "shortlist.min_access_score", &mut errors);
        Self::check_unit(sl.min_prod_coverage, "shortlist.min_prod_coverage", &mut errors);
        Self::check_non_negative(sl.site_floor_mcf_d, "shortlist.site_floor_mcf_d", &mut errors);
        Self::check_non_negative(sl.strong_peak_mcf, "shortlist.strong_peak_mcf", &mut errors);

        // Portfolio
        let pf = &self.portfolio;
        if !(pf.target_rate_mcf_d.is_finite() && pf.target_rate_mcf_d > 0.0) {
            errors.push(format!(
                "portfolio.target_rate_mcf_d must be > 0, got {}",
                pf.target_rate_mcf_d
            ));
        }
        for (value, name) in [
            (pf.max_county_share, "portfolio.max_county_share"),
            (pf.max_operator_share, "portfolio.max_operator_share"),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                errors.push(format!("{name} must be in (0, 1], got {value}"));
            }
        }
        if pf.max_picks == 0 {
            errors.push("portfolio.max_picks must be > 0".to_string());
        }

        // Categories
        let c = &self.categories;
        Self::check_escalation(
            c.viable_minimum_mcf,
            c.high_consistent_mcf,
            "categories.viable_minimum/high_consistent",
            &mut errors,
        );
        Self::check_escalation(
            c.high_consistent_mcf,
            c.surge_peak_mcf,
            "categories.high_consistent/surge_peak",
            &mut errors,
        );
        if c.analysis_months == 0 {
            errors.push("categories.analysis_months must be > 0".to_string());
        }

        // Cross-field range checks (warnings are logged, errors are fatal)
        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_unit(value: f64, name: &str, errors: &mut Vec<String>) {
        if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
            errors.push(format!("{name} must be in [0, 1], got {value}"));
        }
    }

    fn check_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(format!("{name} must be a finite value >= 0, got {value}"));
        }
    }

    fn check_escalation(lower: f64, upper: f64, name: &str, errors: &mut Vec<String>) {
        // NaN/Inf comparisons silently pass, catch them explicitly
        if !lower.is_finite() || !upper.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got lower={lower}, upper={upper})"
            ));
            return;
        }
        if upper < lower {
            errors.push(format!("{name}: upper ({upper:.3}) must be >= lower ({lower:.3})"));
        }
    }

    fn check_window_listed(months: usize, name: &str, windows: &WindowConfig, errors: &mut Vec<String>) {
        if !windows.months.contains(&months) {
            errors.push(format!(
                "{name} = {months} is not one of windows.months {:?}",
                windows.months
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Run Config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// "Now" cutoff as `YYYY-MM`. When unset, the latest month present in the
    /// production input is used so repeated runs over the same data agree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<ReportMonth>,
}

// ============================================================================
// Window Config
// ============================================================================

/// Which month trailing windows are measured back from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// Each well's latest reported month
    #[default]
    LatestReport,
    /// The run's as-of month
    AsOf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Trailing window lengths (months)
    #[serde(default = "default_window_months")]
    pub months: Vec<usize>,

    #[serde(default)]
    pub anchor: WindowAnchor,

    /// Window used for the consistency score and the erratic-production penalty
    #[serde(default = "default_short_months")]
    pub short_months: usize,

    /// Window over which report coverage (`dq_prod_cov`) is measured
    #[serde(default = "default_coverage_months")]
    pub coverage_months: usize,
}

fn default_window_months() -> Vec<usize> {
    vec![12, 24, 36]
}
fn default_short_months() -> usize {
    12
}
fn default_coverage_months() -> usize {
    36
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            months: default_window_months(),
            anchor: WindowAnchor::default(),
            short_months: default_short_months(),
            coverage_months: default_coverage_months(),
        }
    }
}

// ============================================================================
// Shut-In Config
// ============================================================================

/// How the pre-stop ~90-day rate is approximated from monthly data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProxyKind {
    /// Mean daily rate of the last N non-zero months at or before the stop
    #[default]
    LastNonzeroMonths,
    /// Total volume / total days over the N calendar months ending at the stop
    CalendarQuarter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutInConfig {
    /// Consecutive zero/absent months required to call a shut-in
    #[serde(default = "default_min_zero_run")]
    pub min_zero_run_months: usize,

    /// Months ending at the stop month analysed for pre-stop behaviour
    #[serde(default = "default_pre_window")]
    pub pre_window_months: usize,

    /// Months feeding the pre-stop rate proxy
    #[serde(default = "default_rate_tail")]
    pub rate_tail_months: usize,

    /// Last-to-peak ratio at or above which the stop counts as abrupt
    #[serde(default = "default_abrupt_ratio")]
    pub abrupt_ratio_threshold: f64,

    #[serde(default)]
    pub rate_proxy: RateProxyKind,
}

fn default_min_zero_run() -> usize {
    6
}
fn default_pre_window() -> usize {
    12
}
fn default_rate_tail() -> usize {
    3
}
fn default_abrupt_ratio() -> f64 {
    0.5
}

impl Default for ShutInConfig {
    fn default() -> Self {
        Self {
            min_zero_run_months: default_min_zero_run(),
            pre_window_months: default_pre_window(),
            rate_tail_months: default_rate_tail(),
            abrupt_ratio_threshold: default_abrupt_ratio(),
            rate_proxy: RateProxyKind::default(),
        }
    }
}

// ============================================================================
// Decline Config
// ============================================================================

/// Which part of the history the decline models are fitted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineTail {
    /// The pre-stop window ending at the shut-in month (recent tail if none)
    #[default]
    PreShutIn,
    /// The last `tail_months` ending at the latest producing month
    Recent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineConfig {
    #[serde(default)]
    pub tail: DeclineTail,

    /// Length of the recent tail (months)
    #[serde(default = "default_tail_months")]
    pub tail_months: usize,

    /// Minimum non-zero points required to attempt a fit
    #[serde(default = "default_min_points")]
    pub min_points: usize,

    /// Fits below this R² fall back to the heuristic
    #[serde(default = "default_min_r_squared")]
    pub min_r_squared: f64,

    /// Upper bound of the hyperbolic b-factor search
    #[serde(default = "default_b_max")]
    pub b_max: f64,

    /// Grid step of the hyperbolic b-factor search
    #[serde(default = "default_b_step")]
    pub b_step: f64,

    /// Forecast rates are capped at this multiple of the max observed rate
    #[serde(default = "default_rate_cap_multiple")]
    pub rate_cap_multiple: f64,

    /// Economic cutoff rate for EUR integration (MCF/d)
    #[serde(default = "default_economic_limit")]
    pub economic_limit_mcf_d: f64,

    /// Maximum EUR integration horizon (months)
    #[serde(default = "default_eur_horizon")]
    pub eur_horizon_months: usize,

    /// Flat-rate horizon used for heuristic EUR (months)
    #[serde(default = "default_heuristic_eur_months")]
    pub heuristic_eur_months: usize,

    /// Multiplier applied to low-confidence forecasts before they gate anything
    #[serde(default = "default_low_confidence_weight")]
    pub low_confidence_weight: f64,
}

fn default_tail_months() -> usize {
    36
}
fn default_min_points() -> usize {
    3
}
fn default_min_r_squared() -> f64 {
    0.5
}
fn default_b_max() -> f64 {
    2.0
}
fn default_b_step() -> f64 {
    0.05
}
fn default_rate_cap_multiple() -> f64 {
    2.0
}
fn default_economic_limit() -> f64 {
    5.0
}
fn default_eur_horizon() -> usize {
    360
}
fn default_heuristic_eur_months() -> usize {
    12
}
fn default_low_confidence_weight() -> f64 {
    0.5
}

impl Default for DeclineConfig {
    fn default() -> Self {
        Self {
            tail: DeclineTail::default(),
            tail_months: default_tail_months(),
            min_points: default_min_points(),
            min_r_squared: default_min_r_squared(),
            b_max: default_b_max(),
            b_step: default_b_step(),
            rate_cap_multiple: default_rate_cap_multiple(),
            economic_limit_mcf_d: default_economic_limit(),
            eur_horizon_months: default_eur_horizon(),
            heuristic_eur_months: default_heuristic_eur_months(),
            low_confidence_weight: default_low_confidence_weight(),
        }
    }
}

// ============================================================================
// Score Weights
// ============================================================================

/// Weights of the composite score. A zero weight disables its term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_w_pre_stop_q90")]
    pub pre_stop_q90: f64,
    #[serde(default = "default_w_pre_stop_peak")]
    pub pre_stop_peak: f64,
    #[serde(default = "default_w_tenth")]
    pub pre_stop_nonzero_frac: f64,
    #[serde(default = "default_w_tenth")]
    pub pre_stop_cv: f64,
    #[serde(default = "default_w_tenth")]
    pub gas_recent: f64,
    #[serde(default = "default_w_twentieth")]
    pub consistency_score: f64,
    #[serde(default = "default_w_twentieth")]
    pub dq_prod_cov: f64,
    #[serde(default = "default_w_twentieth")]
    pub abrupt_stop_flag: f64,

    /// Window whose gas sum feeds the `gas_recent` term
    #[serde(default = "default_gas_window")]
    pub gas_window_months: usize,
}

fn default_w_pre_stop_q90() -> f64 {
    0.35
}
fn default_w_pre_stop_peak() -> f64 {
    0.20
}
fn default_w_tenth() -> f64 {
    0.10
}
fn default_w_twentieth() -> f64 {
    0.05
}
fn default_gas_window() -> usize {
    24
}

impl ScoreWeights {
    /// Named weight terms in formula order.
    pub fn terms(&self) -> [(&'static str, f64); 8] {
        [
            ("pre_stop_q90", self.pre_stop_q90),
            ("pre_stop_peak", self.pre_stop_peak),
            ("pre_stop_nonzero_frac", self.pre_stop_nonzero_frac),
            ("pre_stop_cv", self.pre_stop_cv),
            ("gas_recent", self.gas_recent),
            ("consistency_score", self.consistency_score),
            ("dq_prod_cov", self.dq_prod_cov),
            ("abrupt_stop_flag", self.abrupt_stop_flag),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.terms().iter().map(|(_, w)| w).sum()
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            pre_stop_q90: default_w_pre_stop_q90(),
            pre_stop_peak: default_w_pre_stop_peak(),
            pre_stop_nonzero_frac: default_w_tenth(),
            pre_stop_cv: default_w_tenth(),
            gas_recent: default_w_tenth(),
            consistency_score: default_w_twentieth(),
            dq_prod_cov: default_w_twentieth(),
            abrupt_stop_flag: default_w_twentieth(),
            gas_window_months: default_gas_window(),
        }
    }
}

// ============================================================================
// Normalization Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default = "default_lower_quantile")]
    pub lower_quantile: f64,
    #[serde(default = "default_upper_quantile")]
    pub upper_quantile: f64,
}

fn default_lower_quantile() -> f64 {
    0.10
}
fn default_upper_quantile() -> f64 {
    0.90
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            lower_quantile: default_lower_quantile(),
            upper_quantile: default_upper_quantile(),
        }
    }
}

// ============================================================================
// Penalty Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Months since production above which the long-shut-in penalty applies
    #[serde(default = "default_long_shut_in_months")]
    pub long_shut_in_months: u32,
    #[serde(default = "default_long_shut_in_penalty")]
    pub long_shut_in: f64,

    #[serde(default = "default_coarse_location_penalty")]
    pub coarse_location: f64,

    /// Short-window CV above which the erratic penalty starts
    #[serde(default = "default_erratic_cv_threshold")]
    pub erratic_cv_threshold: f64,
    /// Short-window CV at which the erratic penalty reaches `erratic_max`
    #[serde(default = "default_erratic_cv_full")]
    pub erratic_cv_full: f64,
    #[serde(default = "default_erratic_min")]
    pub erratic_min: f64,
    #[serde(default = "default_erratic_max")]
    pub erratic_max: f64,
}

fn default_long_shut_in_months() -> u32 {
    48
}
fn default_long_shut_in_penalty() -> f64 {
    0.15
}
fn default_coarse_location_penalty() -> f64 {
    0.10
}
fn default_erratic_cv_threshold() -> f64 {
    0.5
}
fn default_erratic_cv_full() -> f64 {
    1.5
}
fn default_erratic_min() -> f64 {
    0.05
}
fn default_erratic_max() -> f64 {
    0.10
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            long_shut_in_months: default_long_shut_in_months(),
            long_shut_in: default_long_shut_in_penalty(),
            coarse_location: default_coarse_location_penalty(),
            erratic_cv_threshold: default_erratic_cv_threshold(),
            erratic_cv_full: default_erratic_cv_full(),
            erratic_min: default_erratic_min(),
            erratic_max: default_erratic_max(),
        }
    }
}

// ============================================================================
// Exclusion Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Wells shut in longer than this with no document evidence are excluded
    #[serde(default = "default_stale_months")]
    pub stale_months: u32,
}

fn default_stale_months() -> u32 {
    120
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            stale_months: default_stale_months(),
        }
    }
}

// ============================================================================
// Shortlist Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistConfig {
    /// Rank percentile at or above which a well can be primary
    #[serde(default = "default_primary_percentile")]
    pub primary_min_percentile: f64,
    /// Rank percentile at or above which a non-primary well is secondary
    #[serde(default = "default_secondary_percentile")]
    pub secondary_min_percentile: f64,
    /// Confidence-weighted q90 floor (MCF/d)
    #[serde(default = "default_site_floor")]
    pub site_floor_mcf_d: f64,
    #[serde(default = "default_min_access")]
    pub min_access_score: f64,
    #[serde(default = "default_min_prod_coverage")]
    pub min_prod_coverage: f64,
    /// Pre-stop peak that makes a long shut-in remediable (MCF/month)
    #[serde(default = "default_strong_peak")]
    pub strong_peak_mcf: f64,
}

fn default_primary_percentile() -> f64 {
    0.80
}
fn default_secondary_percentile() -> f64 {
    0.60
}
fn default_site_floor() -> f64 {
    50.0
}
fn default_min_access() -> f64 {
    0.5
}
fn default_min_prod_coverage() -> f64 {
    0.25
}
fn default_strong_peak() -> f64 {
    20_000.0
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            primary_min_percentile: default_primary_percentile(),
            secondary_min_percentile: default_secondary_percentile(),
            site_floor_mcf_d: default_site_floor(),
            min_access_score: default_min_access(),
            min_prod_coverage: default_min_prod_coverage(),
            strong_peak_mcf: default_strong_peak(),
        }
    }
}

// ============================================================================
// Portfolio Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Aggregate confidence-weighted q90 target (MCF/d)
    #[serde(default = "default_target_rate")]
    pub target_rate_mcf_d: f64,
    /// Max share of the target one county may contribute (after its first pick)
    #[serde(default = "default_max_share")]
    pub max_county_share: f64,
    /// Max share of the target one operator may contribute (after its first pick)
    #[serde(default = "default_max_share")]
    pub max_operator_share: f64,
    #[serde(default = "default_max_picks")]
    pub max_picks: usize,
}

fn default_target_rate() -> f64 {
    300.0
}
fn default_max_share() -> f64 {
    0.5
}
fn default_max_picks() -> usize {
    25
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            target_rate_mcf_d: default_target_rate(),
            max_county_share: default_max_share(),
            max_operator_share: default_max_share(),
            max_picks: default_max_picks(),
        }
    }
}

// ============================================================================
// Category Config
// ============================================================================

/// Thresholds for the reactivation category decision tree (MCF/month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "default_high_consistent")]
    pub high_consistent_mcf: f64,
    #[serde(default = "default_surge_peak")]
    pub surge_peak_mcf: f64,
    #[serde(default = "default_viable_minimum")]
    pub viable_minimum_mcf: f64,
    /// Most recent producing months considered
    #[serde(default = "default_analysis_months")]
    pub analysis_months: usize,
    #[serde(default = "default_high_consistent_min_months")]
    pub high_consistent_min_months: usize,
    #[serde(default = "default_viable_min_months")]
    pub viable_min_months: usize,
}

fn default_high_consistent() -> f64 {
    4_000.0
}
fn default_surge_peak() -> f64 {
    20_000.0
}
fn default_viable_minimum() -> f64 {
    1_000.0
}
fn default_analysis_months() -> usize {
    24
}
fn default_high_consistent_min_months() -> usize {
    6
}
fn default_viable_min_months() -> usize {
    3
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            high_consistent_mcf: default_high_consistent(),
            surge_peak_mcf: default_surge_peak(),
            viable_minimum_mcf: default_viable_minimum(),
            analysis_months: default_analysis_months(),
            high_consistent_min_months: default_high_consistent_min_months(),
            viable_min_months: default_viable_min_months(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = RankingConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: RankingConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, RankingConfig::default());
        assert_eq!(config.weights.pre_stop_q90, 0.35);
        assert_eq!(config.windows.months, vec![12, 24, 36]);
        assert_eq!(config.shut_in.min_zero_run_months, 6);
        assert_eq!(config.decline.rate_cap_multiple, 2.0);
        assert_eq!(config.exclusion.stale_months, 120);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[run]
as_of = "2024-06"

[penalties]
long_shut_in_months = 60

[shut_in]
rate_proxy = "calendar_quarter"
"#;
        let config: RankingConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.run.as_of, ReportMonth::new(2024, 6));
        assert_eq!(config.penalties.long_shut_in_months, 60);
        assert_eq!(config.shut_in.rate_proxy, RateProxyKind::CalendarQuarter);
        // Non-overridden values retain defaults
        assert_eq!(config.penalties.long_shut_in, 0.15);
        assert_eq!(config.windows.anchor, WindowAnchor::LatestReport);
    }

    #[test]
    fn test_validation_rejects_weights_not_summing_to_one() {
        let mut config = RankingConfig::default();
        config.weights.abrupt_stop_flag = 0.0;
        let result = config.validate();
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("sum to 1.0")), "{errors:?}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = RankingConfig::default();
        config.windows.months = vec![0, 24];
        config.decline.b_max = 3.0;
        config.portfolio.max_county_share = 0.0;
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        assert!(errors.iter().any(|e| e.contains("window lengths must be > 0")));
        assert!(errors.iter().any(|e| e.contains("short_months")));
        assert!(errors.iter().any(|e| e.contains("b_max")));
        assert!(errors.iter().any(|e| e.contains("max_county_share")));
    }

    #[test]
    fn test_validation_catches_inverted_category_thresholds() {
        let mut config = RankingConfig::default();
        config.categories.surge_peak_mcf = 3_000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan_threshold() {
        let mut config = RankingConfig::default();
        config.shut_in.abrupt_ratio_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exclusion_must_not_precede_long_shut_in() {
        let mut config = RankingConfig::default();
        config.exclusion.stale_months = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut original = RankingConfig::default();
        original.run.as_of = ReportMonth::new(2023, 12);
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: RankingConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(original, roundtripped);
        assert!(toml_str.contains("[weights]"));
        assert!(toml_str.contains("[portfolio]"));
        assert!(toml_str.contains("as_of = \"2023-12\""));
    }

    #[test]
    fn test_from_toml_str_tracks_provenance() {
        let (config, provenance) = RankingConfig::from_toml_str(
            r#"
[shortlist]
site_floor_mcf_d = 75.0
"#,
        )
        .expect("valid config");
        assert_eq!(config.shortlist.site_floor_mcf_d, 75.0);
        assert!(provenance.is_user_set("shortlist.site_floor_mcf_d"));
        assert!(!provenance.is_user_set("weights.pre_stop_q90"));
    }

    #[test]
    fn test_load_from_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[weights\npre_stop_q90 = ").expect("write");
        match RankingConfig::load_from_file(&path) {
            Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ranking_config.toml");
        let mut config = RankingConfig::default();
        config.portfolio.target_rate_mcf_d = 450.0;
        config.save_to_file(&path).expect("save");
        let loaded = RankingConfig::load(Some(&path)).expect("load").0;
        assert_eq!(loaded.portfolio.target_rate_mcf_d, 450.0);
    }
}
