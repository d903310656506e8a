//! Config Validation Tests
//!
//! Typo detection, range validation and load behaviour of `RankingConfig`,
//! exercised through the public API only.

use std::io::Write;

use reactivation_engine::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use reactivation_engine::config::{ConfigError, RankingConfig, WindowAnchor};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_weight_warns_with_suggestion() {
    let toml_str = r#"
[weights]
pre_stop_q09 = 0.35
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("pre_stop_q09"));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("weights.pre_stop_q90"));
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[penalites]
coarse_location = 0.1
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.iter().any(|w| w.field == "penalites"));
    assert!(warnings
        .iter()
        .any(|w| w.suggestion.as_deref() == Some("penalties")));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[run]
as_of = "2024-06"

[windows]
months = [12, 24, 36]
anchor = "as_of"

[exclusion]
stale_months = 120

[portfolio]
target_rate_mcf_d = 450.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
}

#[test]
fn completely_unknown_key_has_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("zzzzzzzzzzzzzzzzzzzz", &known).is_none());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn weights_summing_to_095_fail_validation() {
    let toml_str = r#"
[weights]
pre_stop_q90 = 0.30
"#;
    match RankingConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("weights")), "{errors:?}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn all_violations_are_reported_together() {
    let mut config = RankingConfig::default();
    config.weights.pre_stop_q90 = 0.5;
    config.windows.months = vec![0];
    config.penalties.erratic_min = 0.2;
    match config.validate() {
        Err(ConfigError::Validation(errors)) => assert!(errors.len() >= 3, "{errors:?}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn cross_field_range_errors() {
    let mut config = RankingConfig::default();
    config.shut_in.rate_tail_months = 24;
    config.decline.min_points = 48;
    let (errors, _) = validate_ranges(&config);
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn unusual_values_only_warn() {
    let mut config = RankingConfig::default();
    config.exclusion.stale_months = 24;
    config.penalties.long_shut_in_months = 12;
    let (errors, warnings) = validate_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.field == "exclusion.stale_months"));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn empty_file_is_the_default_config() {
    let (config, provenance) = RankingConfig::from_toml_str("").unwrap();
    assert_eq!(config, RankingConfig::default());
    assert!(provenance.explicit_keys.is_empty());
}

#[test]
fn partial_file_keeps_other_defaults_and_tracks_provenance() {
    let toml_str = r#"
[windows]
anchor = "as_of"
"#;
    let (config, provenance) = RankingConfig::from_toml_str(toml_str).unwrap();
    assert_eq!(config.windows.anchor, WindowAnchor::AsOf);
    assert_eq!(config.windows.months, vec![12, 24, 36]);
    assert!(provenance.is_user_set("windows.anchor"));
    assert!(!provenance.is_user_set("windows.months"));
}

#[test]
fn explicit_path_is_loaded_and_bad_file_is_an_error() {
    let mut good = tempfile::NamedTempFile::new().unwrap();
    writeln!(good, "[exclusion]\nstale_months = 96").unwrap();
    let (config, provenance) = RankingConfig::load(Some(good.path())).unwrap();
    assert_eq!(config.exclusion.stale_months, 96);
    assert_eq!(provenance.path.as_deref(), Some(good.path()));

    let mut bad = tempfile::NamedTempFile::new().unwrap();
    writeln!(bad, "[weights\npre_stop_q90 = ").unwrap();
    assert!(matches!(
        RankingConfig::load(Some(bad.path())),
        Err(ConfigError::Parse(_, _))
    ));
}

#[test]
fn defaults_round_trip_through_toml() {
    let toml = RankingConfig::default().to_toml().unwrap();
    let (reparsed, _) = RankingConfig::from_toml_str(&toml).unwrap();
    assert_eq!(reparsed, RankingConfig::default());
}
