//! Engine-wide numeric constants that are not operator-tunable.
//!
//! Tunable thresholds live in [`super::RankingConfig`]; these are the fixed
//! numerical guards and unit conversions.

// ============================================================================
// Units
// ============================================================================

/// Mean days per calendar month, for converting day horizons into month time.
pub const DAYS_PER_MONTH: f64 = 30.4375;

/// Days per month used by the category analyzer's daily-rate estimate.
pub const NOMINAL_DAYS_PER_MONTH: f64 = 30.0;

/// Forecast horizons reported as average daily rates (days).
pub const FORECAST_HORIZONS_DAYS: [f64; 3] = [30.0, 90.0, 180.0];

// ============================================================================
// Numerical Guards
// ============================================================================

/// Floor on the quantile span during min-max normalization.
pub const QUANTILE_SPAN_FLOOR: f64 = 1e-9;

/// Tolerance on the score-weight sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// CV values are capped here before the stability complement `1 - cv / cap`.
pub const CV_CAP: f64 = 1.5;

/// Smallest decline rate treated as non-zero (1/month).
pub const MIN_DECLINE_RATE: f64 = 1e-9;

/// Smallest b-factor treated as hyperbolic; below this the exponential form is used.
pub const MIN_B_FACTOR: f64 = 1e-6;

// ============================================================================
// Trend & Category
// ============================================================================

/// Relative change that separates a stable trend from an increasing or declining one.
pub const TREND_BAND: f64 = 0.10;

/// Months in each half of the trend comparison.
pub const TREND_COMPARE_MONTHS: usize = 12;
