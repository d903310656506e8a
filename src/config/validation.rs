//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Unknown keys only warn.

use std::collections::HashSet;

use super::RankingConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for RankingConfig.
///
/// Maintained by hand to match the struct hierarchy in ranking_config.rs.
/// Any new field added to RankingConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [run]
        "run",
        "run.as_of",
        // [windows]
        "windows",
        "windows.months",
        "windows.anchor",
        "windows.short_months",
        "windows.coverage_months",
        // [shut_in]
        "shut_in",
        "shut_in.min_zero_run_months",
        "shut_in.pre_window_months",
        "shut_in.rate_tail_months",
        "shut_in.abrupt_ratio_threshold",
        "shut_in.rate_proxy",
        // [decline]
        "decline",
        "decline.tail",
        "decline.tail_months",
        "decline.min_points",
        "decline.min_r_squared",
        "decline.b_max",
        "decline.b_step",
        "decline.rate_cap_multiple",
        "decline.economic_limit_mcf_d",
        "decline.eur_horizon_months",
        "decline.heuristic_eur_months",
        "decline.low_confidence_weight",
        // [weights]
        "weights",
        "weights.pre_stop_q90",
        "weights.pre_stop_peak",
        "weights.pre_stop_nonzero_frac",
        "weights.pre_stop_cv",
        "weights.gas_recent",
        "weights.consistency_score",
        "weights.dq_prod_cov",
        "weights.abrupt_stop_flag",
        "weights.gas_window_months",
        // [normalization]
        "normalization",
        "normalization.lower_quantile",
        "normalization.upper_quantile",
        // [penalties]
        "penalties",
        "penalties.long_shut_in_months",
        "penalties.long_shut_in",
        "penalties.coarse_location",
        "penalties.erratic_cv_threshold",
        "penalties.erratic_cv_full",
        "penalties.erratic_min",
        "penalties.erratic_max",
        // [exclusion]
        "exclusion",
        "exclusion.stale_months",
        // [shortlist]
        "shortlist",
        "shortlist.primary_min_percentile",
        "shortlist.secondary_min_percentile",
        "shortlist.site_floor_mcf_d",
        "shortlist.min_access_score",
        "shortlist.min_prod_coverage",
        "shortlist.strong_peak_mcf",
        // [portfolio]
        "portfolio",
        "portfolio.target_rate_mcf_d",
        "portfolio.max_county_share",
        "portfolio.max_operator_share",
        "portfolio.max_picks",
        // [categories]
        "categories",
        "categories.high_consistent_mcf",
        "categories.surge_peak_mcf",
        "categories.viable_minimum_mcf",
        "categories.analysis_months",
        "categories.high_consistent_min_months",
        "categories.viable_min_months",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist <= 3 {
            if let Some((_, best_dist)) = best {
                if dist < best_dist {
                    best = Some((k, dist));
                }
            } else {
                best = Some((k, dist));
            }
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Unknown keys never fail the load; they are reported so typos surface.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Plausibility Ranges
// ============================================================================

fn suspicious(field: &str, message: String) -> ValidationWarning {
    ValidationWarning {
        field: field.to_string(),
        message,
        suggestion: None,
    }
}

/// Cross-field checks on a parsed RankingConfig.
///
/// Returns (errors, warnings). Errors are combinations that cannot produce a
/// meaningful ranking; warnings are legal but unusual settings.
pub fn validate_ranges(config: &RankingConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let s = &config.shut_in;
    if s.rate_tail_months > s.pre_window_months {
        errors.push(format!(
            "shut_in.rate_tail_months ({}) cannot exceed shut_in.pre_window_months ({})",
            s.rate_tail_months, s.pre_window_months
        ));
    }

    let d = &config.decline;
    if d.min_points > d.tail_months {
        errors.push(format!(
            "decline.min_points ({}) cannot exceed decline.tail_months ({})",
            d.min_points, d.tail_months
        ));
    }
    if d.min_r_squared < 0.2 {
        warnings.push(suspicious(
            "decline.min_r_squared",
            format!(
                "decline.min_r_squared = {:.2} accepts nearly any curve fit",
                d.min_r_squared
            ),
        ));
    }

    let c = &config.categories;
    if c.viable_min_months > c.analysis_months || c.high_consistent_min_months > c.analysis_months {
        errors.push(format!(
            "categories: month-count thresholds cannot exceed analysis_months ({})",
            c.analysis_months
        ));
    }

    let pf = &config.portfolio;
    if pf.target_rate_mcf_d > 100_000.0 {
        warnings.push(suspicious(
            "portfolio.target_rate_mcf_d",
            format!(
                "portfolio.target_rate_mcf_d = {:.0} is far above a typical shut-in program",
                pf.target_rate_mcf_d
            ),
        ));
    }

    if config.exclusion.stale_months < 36 {
        warnings.push(suspicious(
            "exclusion.stale_months",
            format!(
                "exclusion.stale_months = {} will exclude recently shut-in wells",
                config.exclusion.stale_months
            ),
        ));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
