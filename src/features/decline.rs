//! Decline Curve Fitter
//!
//! Fits exponential and hyperbolic (Arps) declines to the non-zero tail of a
//! well's history in daily-rate space, picks the lower-RMSE model, and derives
//! short-horizon average rates and a rough EUR.
//!
//! ## Model forms (t in months from the first tail point)
//!
//! - Exponential: q(t) = qi · e^(−D·t)
//! - Hyperbolic:  q(t) = qi / (1 + b·Di·t)^(1/b),  b ∈ (0, b_max]
//!
//! The hyperbolic search is a fixed b grid. For each b the model linearises as
//! q^(−b) = qi^(−b) + qi^(−b)·b·Di·t, so every candidate is one least-squares
//! line and the search is deterministic.
//!
//! Fits that are short, non-physical or poor fall back to a flat heuristic
//! (mean of the last 3 non-zero months) flagged low-confidence. Forecasts
//! restart at the last tail point and never exceed `rate_cap_multiple` × the
//! highest observed monthly rate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::defaults::{DAYS_PER_MONTH, FORECAST_HORIZONS_DAYS, MIN_B_FACTOR, MIN_DECLINE_RATE};
use crate::config::{DeclineConfig, DeclineTail};
use crate::types::feature_names as names;
use crate::types::{FeatureVector, ProductionRecord, ProductionSeries, ReportMonth, UNDEFINED};

// ============================================================================
// Error Types
// ============================================================================

/// Why a curve fit was rejected. Always recovered by the heuristic fallback.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FitError {
    #[error("insufficient non-zero points: have {have}, need {need}")]
    InsufficientPoints { have: usize, need: usize },

    #[error("non-physical parameters: {0}")]
    NonPhysical(String),

    #[error("poor fit: R² {r_squared:.3} below {threshold:.3}")]
    PoorFit { r_squared: f64, threshold: f64 },

    #[error("degenerate regression: {0}")]
    Degenerate(String),
}

// ============================================================================
// Model
// ============================================================================

/// Whether a forecast can be used at face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitConfidence {
    Fitted,
    Low,
}

/// Fitted decline, rates in MCF/d, decline rates per month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DeclineModel {
    Exponential { qi: f64, d: f64 },
    Hyperbolic { qi: f64, di: f64, b: f64 },
    Heuristic { mean_rate: f64 },
}

impl DeclineModel {
    pub const fn confidence(&self) -> FitConfidence {
        match self {
            DeclineModel::Exponential { .. } | DeclineModel::Hyperbolic { .. } => FitConfidence::Fitted,
            DeclineModel::Heuristic { .. } => FitConfidence::Low,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            DeclineModel::Exponential { .. } => "exponential",
            DeclineModel::Hyperbolic { .. } => "hyperbolic",
            DeclineModel::Heuristic { .. } => "heuristic",
        }
    }

    /// Rate at `t` months from the model origin.
    pub fn rate(&self, t: f64) -> f64 {
        match *self {
            DeclineModel::Exponential { qi, d } => qi * (-d * t).exp(),
            DeclineModel::Hyperbolic { qi, di, b } => qi / (1.0 + b * di * t).powf(1.0 / b),
            DeclineModel::Heuristic { mean_rate } => mean_rate,
        }
    }

    /// Same curve with its origin moved to `t0` and its initial rate scaled by `scale`.
    fn reanchored(&self, t0: f64, scale: f64) -> Self {
        match *self {
            DeclineModel::Exponential { d, .. } => DeclineModel::Exponential {
                qi: self.rate(t0) * scale,
                d,
            },
            DeclineModel::Hyperbolic { di, b, .. } => DeclineModel::Hyperbolic {
                qi: self.rate(t0) * scale,
                di: di / (1.0 + b * di * t0),
                b,
            },
            DeclineModel::Heuristic { mean_rate } => DeclineModel::Heuristic {
                mean_rate: mean_rate * scale,
            },
        }
    }

    /// ∫₀^τ q(t) dt in (MCF/d)·months.
    pub fn cumulative(&self, tau: f64) -> f64 {
        if tau <= 0.0 {
            return 0.0;
        }
        match *self {
            DeclineModel::Exponential { qi, d } => {
                if d < MIN_DECLINE_RATE {
                    qi * tau
                } else {
                    qi / d * (1.0 - (-d * tau).exp())
                }
            }
            DeclineModel::Hyperbolic { qi, di, b } => {
                if di < MIN_DECLINE_RATE {
                    qi * tau
                } else if (b - 1.0).abs() < MIN_B_FACTOR {
                    qi / di * (1.0 + di * tau).ln()
                } else {
                    qi / ((1.0 - b) * di) * (1.0 - (1.0 + b * di * tau).powf((b - 1.0) / b))
                }
            }
            DeclineModel::Heuristic { mean_rate } => mean_rate * tau,
        }
    }

    /// Months until the rate falls to `limit`; `None` if it never does.
    pub fn time_to_rate(&self, limit: f64) -> Option<f64> {
        if limit <= 0.0 {
            return None;
        }
        match *self {
            DeclineModel::Exponential { qi, d } => {
                if qi <= limit {
                    Some(0.0)
                } else if d < MIN_DECLINE_RATE {
                    None
                } else {
                    Some((qi / limit).ln() / d)
                }
            }
            DeclineModel::Hyperbolic { qi, di, b } => {
                if qi <= limit {
                    Some(0.0)
                } else if di < MIN_DECLINE_RATE {
                    None
                } else {
                    Some(((qi / limit).powf(b) - 1.0) / (b * di))
                }
            }
            DeclineModel::Heuristic { mean_rate } => (mean_rate <= limit).then_some(0.0),
        }
    }
}

/// Short-horizon average rates and EUR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub q30_mcf_d: f64,
    pub q90_mcf_d: f64,
    pub q180_mcf_d: f64,
    /// Cumulative history plus forecast volume (MCF)
    pub eur_gas_mcf: f64,
}

/// Outcome of fitting one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineFit {
    pub model: DeclineModel,
    pub r_squared: Option<f64>,
    pub rmse: Option<f64>,
    /// Non-zero points in the fitted tail
    pub points: usize,
    pub forecast: Forecast,
    /// Set when the heuristic replaced a curve fit
    pub fallback_reason: Option<FitError>,
}

impl DeclineFit {
    pub fn is_low_confidence(&self) -> bool {
        self.model.confidence() == FitConfidence::Low
    }

    /// q90 after down-weighting low-confidence forecasts.
    pub fn q90_effective(&self, low_confidence_weight: f64) -> f64 {
        match self.model.confidence() {
            FitConfidence::Fitted => self.forecast.q90_mcf_d,
            FitConfidence::Low => self.forecast.q90_mcf_d * low_confidence_weight,
        }
    }

    pub fn write_features(&self, low_confidence_weight: f64, fv: &mut FeatureVector) {
        fv.set(names::Q30_MCF_D, self.forecast.q30_mcf_d);
        fv.set(names::Q90_MCF_D, self.forecast.q90_mcf_d);
        fv.set(names::Q180_MCF_D, self.forecast.q180_mcf_d);
        fv.set(names::Q90_EFFECTIVE_MCF_D, self.q90_effective(low_confidence_weight));
        fv.set(names::EUR_GAS_MCF, self.forecast.eur_gas_mcf);
        fv.set(names::DCA_R_SQUARED, self.r_squared.unwrap_or(UNDEFINED));
        fv.set_flag(names::DCA_CONFIDENCE, !self.is_low_confidence());
    }
}

// ============================================================================
// Least Squares
// ============================================================================

struct Line {
    intercept: f64,
    slope: f64,
}

fn least_squares(t: &[f64], y: &[f64]) -> Result<Line, FitError> {
    let n = t.len() as f64;
    let mean_t = t.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = t.iter().map(|x| (x - mean_t).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return Err(FitError::Degenerate("all points share one time".to_string()));
    }
    let sxy: f64 = t.iter().zip(y).map(|(x, v)| (x - mean_t) * (v - mean_y)).sum();
    let slope = sxy / sxx;
    let line = Line {
        intercept: mean_y - slope * mean_t,
        slope,
    };
    if line.intercept.is_finite() && line.slope.is_finite() {
        Ok(line)
    } else {
        Err(FitError::Degenerate("non-finite regression coefficients".to_string()))
    }
}

/// (RMSE, R²) of a model against observed rates.
fn goodness(model: &DeclineModel, t: &[f64], q: &[f64]) -> (f64, f64) {
    let n = q.len() as f64;
    let mean = q.iter().sum::<f64>() / n;
    let ss_res: f64 = t.iter().zip(q).map(|(x, v)| (v - model.rate(*x)).powi(2)).sum();
    let ss_tot: f64 = q.iter().map(|v| (v - mean).powi(2)).sum();
    let rmse = (ss_res / n).sqrt();
    let scale = mean.abs().max(1.0);
    let r_squared = if ss_tot <= f64::EPSILON * scale * scale {
        // Flat history: perfect if the model is flat too
        if rmse <= 1e-9 * scale {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };
    (rmse, r_squared)
}

fn fit_exponential(t: &[f64], q: &[f64]) -> Result<DeclineModel, FitError> {
    let ln_q: Vec<f64> = q.iter().map(|v| v.ln()).collect();
    let line = least_squares(t, &ln_q)?;
    let d = -line.slope;
    if d < 0.0 {
        return Err(FitError::NonPhysical(format!("exponential decline rate {d:.4} < 0")));
    }
    Ok(DeclineModel::Exponential {
        qi: line.intercept.exp(),
        d,
    })
}

fn fit_hyperbolic_at(t: &[f64], q: &[f64], b: f64) -> Result<DeclineModel, FitError> {
    let y: Vec<f64> = q.iter().map(|v| v.powf(-b)).collect();
    let line = least_squares(t, &y)?;
    if line.intercept <= 0.0 {
        return Err(FitError::NonPhysical(format!("hyperbolic intercept {:.4e} <= 0", line.intercept)));
    }
    if line.slope < 0.0 {
        return Err(FitError::NonPhysical(format!("hyperbolic b={b:.2} implies incline")));
    }
    let qi = line.intercept.powf(-1.0 / b);
    let di = line.slope / (line.intercept * b);
    if !(qi.is_finite() && di.is_finite()) {
        return Err(FitError::Degenerate(format!("hyperbolic b={b:.2} overflowed")));
    }
    Ok(DeclineModel::Hyperbolic { qi, di, b })
}

// ============================================================================
// Fitter
// ============================================================================

pub struct DeclineCurveFitter;

impl DeclineCurveFitter {
    /// Records the curves are fitted to.
    ///
    /// `PreShutIn` uses the pre-stop window ending at the shut-in month when one
    /// exists; otherwise (and for `Recent`) the last `tail_months` ending at the
    /// latest producing month.
    pub fn tail<'a>(
        series: &'a ProductionSeries,
        config: &DeclineConfig,
        stop_month: Option<ReportMonth>,
        pre_window_months: usize,
    ) -> &'a [ProductionRecord] {
        let (end, months) = match (config.tail, stop_month) {
            (DeclineTail::PreShutIn, Some(stop)) => (stop, pre_window_months),
            _ => match series.last_producing() {
                Some(last) => (last.month, config.tail_months),
                None => return &[],
            },
        };
        series.range(end.offset(1 - months as i64), end)
    }

    /// Fit, select and forecast. Never fails: rejected fits become a heuristic.
    pub fn fit(
        series: &ProductionSeries,
        config: &DeclineConfig,
        stop_month: Option<ReportMonth>,
        pre_window_months: usize,
    ) -> DeclineFit {
        let tail = Self::tail(series, config, stop_month, pre_window_months);
        let points: Vec<&ProductionRecord> = tail.iter().filter(|r| r.is_producing()).collect();
        let rate_cap = series.max_gas_rate() * config.rate_cap_multiple;
        let cumulative = series.total_gas();

        let fitted = Self::fit_points(&points, config);
        match fitted {
            Ok((model, rmse, r_squared, origin)) => {
                let forecast = Self::forecast(&model, origin, rate_cap, cumulative, config);
                DeclineFit {
                    model,
                    r_squared: Some(r_squared),
                    rmse: Some(rmse),
                    points: points.len(),
                    forecast,
                    fallback_reason: None,
                }
            }
            Err(reason) => {
                debug!(well_id = %series.well_id, reason = %reason, "Decline fit fell back to heuristic");
                Self::heuristic(series, points.len(), rate_cap, cumulative, config, reason)
            }
        }
    }

    /// Best model over the tail points, with (RMSE, R², forecast origin in months).
    fn fit_points(
        points: &[&ProductionRecord],
        config: &DeclineConfig,
    ) -> Result<(DeclineModel, f64, f64, f64), FitError> {
        if points.len() < config.min_points {
            return Err(FitError::InsufficientPoints {
                have: points.len(),
                need: config.min_points,
            });
        }
        let first = points[0].month;
        let t: Vec<f64> = points.iter().map(|r| r.month.months_since(&first) as f64).collect();
        let q: Vec<f64> = points.iter().map(|r| r.gas_rate_mcf_d()).collect();
        let origin = t.last().copied().unwrap_or(0.0);

        let mut candidates: Vec<DeclineModel> = Vec::new();
        let mut last_error = None;
        match fit_exponential(&t, &q) {
            Ok(m) => candidates.push(m),
            Err(e) => last_error = Some(e),
        }
        let steps = (config.b_max / config.b_step).floor() as usize;
        for i in 1..=steps {
            let b = config.b_step * i as f64;
            match fit_hyperbolic_at(&t, &q, b) {
                Ok(m) => candidates.push(m),
                Err(e) => last_error = Some(e),
            }
        }

        let best = candidates
            .into_iter()
            .map(|m| {
                let (rmse, r2) = goodness(&m, &t, &q);
                (m, rmse, r2)
            })
            .filter(|(_, rmse, _)| rmse.is_finite())
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let Some((model, rmse, r_squared)) = best else {
            return Err(last_error
                .unwrap_or_else(|| FitError::Degenerate("no candidate model".to_string())));
        };
        if r_squared < config.min_r_squared {
            return Err(FitError::PoorFit {
                r_squared,
                threshold: config.min_r_squared,
            });
        }
        Ok((model, rmse, r_squared, origin))
    }

    fn forecast(
        model: &DeclineModel,
        origin: f64,
        rate_cap: f64,
        cumulative: f64,
        config: &DeclineConfig,
    ) -> Forecast {
        let start_rate = model.rate(origin);
        let scale = if start_rate > rate_cap && start_rate > 0.0 {
            rate_cap / start_rate
        } else {
            1.0
        };
        let anchored = model.reanchored(origin, scale);

        let [q30, q90, q180] = FORECAST_HORIZONS_DAYS.map(|days| {
            let months = days / DAYS_PER_MONTH;
            anchored.cumulative(months) / months
        });

        let horizon = config.eur_horizon_months as f64;
        let life = anchored
            .time_to_rate(config.economic_limit_mcf_d)
            .map_or(horizon, |t| t.min(horizon));
        Forecast {
            q30_mcf_d: q30,
            q90_mcf_d: q90,
            q180_mcf_d: q180,
            eur_gas_mcf: cumulative + anchored.cumulative(life) * DAYS_PER_MONTH,
        }
    }

    /// Flat mean of the last 3 non-zero months' daily rates.
    fn heuristic(
        series: &ProductionSeries,
        points: usize,
        rate_cap: f64,
        cumulative: f64,
        config: &DeclineConfig,
        reason: FitError,
    ) -> DeclineFit {
        let recent: Vec<f64> = series
            .records()
            .iter()
            .rev()
            .filter(|r| r.is_producing())
            .take(3)
            .map(ProductionRecord::gas_rate_mcf_d)
            .collect();
        let mean_rate = if recent.is_empty() {
            0.0
        } else {
            (recent.iter().sum::<f64>() / recent.len() as f64).min(rate_cap)
        };
        let flat_months = config.heuristic_eur_months as f64;
        DeclineFit {
            model: DeclineModel::Heuristic { mean_rate },
            r_squared: None,
            rmse: None,
            points,
            forecast: Forecast {
                q30_mcf_d: mean_rate,
                q90_mcf_d: mean_rate,
                q180_mcf_d: mean_rate,
                eur_gas_mcf: cumulative + mean_rate * flat_months * DAYS_PER_MONTH,
            },
            fallback_reason: Some(reason),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn series_from(start: &str, rates_mcf_d: &[f64]) -> ProductionSeries {
        let start = ReportMonth::parse(start).unwrap();
        let records = rates_mcf_d
            .iter()
            .enumerate()
            .map(|(i, q)| ProductionRecord {
                well_id: "W".into(),
                month: start.offset(i as i64),
                gas_volume: q * 30.0,
                oil_volume: 0.0,
                water_volume: 0.0,
                days_reported: Some(30.0),
            })
            .collect();
        ProductionSeries::from_canonical("W".into(), records)
    }

    fn recent_config() -> DeclineConfig {
        DeclineConfig {
            tail: DeclineTail::Recent,
            ..DeclineConfig::default()
        }
    }

    #[test]
    fn test_exponential_decline_recovered() {
        let rates: Vec<f64> = (0..24).map(|t| 500.0 * (-0.05 * t as f64).exp()).collect();
        let fit = DeclineCurveFitter::fit(&series_from("2019-01", &rates), &recent_config(), None, 12);
        assert!(!fit.is_low_confidence());
        assert!(fit.r_squared.unwrap() > 0.99);
        // Near-exact data: whichever model wins must reproduce the last point
        let last = *rates.last().unwrap();
        assert!((fit.forecast.q30_mcf_d - last).abs() / last < 0.05);
        assert!(fit.forecast.q30_mcf_d >= fit.forecast.q90_mcf_d);
        assert!(fit.forecast.q90_mcf_d >= fit.forecast.q180_mcf_d);
    }

    #[test]
    fn test_hyperbolic_decline_preferred_when_curved() {
        let (qi, di, b) = (800.0, 0.3, 1.2);
        let rates: Vec<f64> = (0..30)
            .map(|t| qi / (1.0 + b * di * t as f64).powf(1.0 / b))
            .collect();
        let fit = DeclineCurveFitter::fit(&series_from("2018-01", &rates), &recent_config(), None, 12);
        match fit.model {
            DeclineModel::Hyperbolic { b: fitted_b, .. } => assert!((fitted_b - 1.2).abs() < 0.051),
            other => panic!("expected hyperbolic, got {other:?}"),
        }
    }

    #[test]
    fn test_too_few_points_falls_back() {
        let fit = DeclineCurveFitter::fit(&series_from("2020-01", &[100.0, 90.0]), &recent_config(), None, 12);
        assert!(fit.is_low_confidence());
        assert_eq!(
            fit.fallback_reason,
            Some(FitError::InsufficientPoints { have: 2, need: 3 })
        );
        assert!((fit.forecast.q90_mcf_d - 95.0).abs() < 1e-9);
        assert_eq!(fit.q90_effective(0.5), fit.forecast.q90_mcf_d * 0.5);
    }

    #[test]
    fn test_noisy_series_is_poor_fit() {
        let rates = [100.0, 10.0, 120.0, 5.0, 110.0, 8.0, 130.0, 9.0];
        let fit = DeclineCurveFitter::fit(&series_from("2020-01", &rates), &recent_config(), None, 12);
        assert!(fit.is_low_confidence());
        assert!(matches!(
            fit.fallback_reason,
            Some(FitError::PoorFit { .. }) | Some(FitError::NonPhysical(_))
        ));
    }

    #[test]
    fn test_inclining_series_is_not_fitted() {
        let rates: Vec<f64> = (0..12).map(|t| 50.0 + 10.0 * t as f64).collect();
        let fit = DeclineCurveFitter::fit(&series_from("2020-01", &rates), &recent_config(), None, 12);
        assert!(fit.is_low_confidence());
    }

    #[test]
    fn test_forecast_never_exceeds_rate_cap() {
        let rates: Vec<f64> = (0..24).map(|t| 500.0 * (-0.05 * t as f64).exp()).collect();
        let s = series_from("2019-01", &rates);
        let model = DeclineModel::Exponential { qi: 1.0e6, d: 0.01 };
        let cap = s.max_gas_rate() * 2.0;
        let forecast = DeclineCurveFitter::forecast(&model, 0.0, cap, s.total_gas(), &recent_config());
        assert!(forecast.q30_mcf_d <= cap + 1e-9);
    }

    #[test]
    fn test_fit_clamps_restart_rate_to_cap() {
        let rates: Vec<f64> = (0..24).map(|t| 500.0 * (-0.05 * t as f64).exp()).collect();
        let s = series_from("2019-01", &rates);
        let uncapped = DeclineCurveFitter::fit(&s, &recent_config(), None, 12);

        let tight = DeclineConfig {
            rate_cap_multiple: 0.25,
            ..recent_config()
        };
        let cap = s.max_gas_rate() * tight.rate_cap_multiple;
        assert!(uncapped.forecast.q30_mcf_d > cap);

        let fit = DeclineCurveFitter::fit(&s, &tight, None, 12);
        assert!(!fit.is_low_confidence());
        let f = fit.forecast;
        for q in [f.q30_mcf_d, f.q90_mcf_d, f.q180_mcf_d] {
            assert!(q <= cap + 1e-9, "{q} above cap {cap}");
        }
        assert!(f.q30_mcf_d > 0.9 * cap);
        assert!(f.eur_gas_mcf < uncapped.forecast.eur_gas_mcf);
    }

    #[test]
    fn test_heuristic_rate_is_capped() {
        let s = series_from("2020-01", &[100.0, 90.0]);
        let config = DeclineConfig {
            rate_cap_multiple: 0.5,
            ..recent_config()
        };
        let fit = DeclineCurveFitter::fit(&s, &config, None, 12);
        assert!(fit.is_low_confidence());
        assert!((fit.forecast.q90_mcf_d - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_eur_includes_history_and_stops_at_economic_limit() {
        let model = DeclineModel::Exponential { qi: 10.0, d: 0.1 };
        let config = DeclineConfig::default();
        let forecast = DeclineCurveFitter::forecast(&model, 0.0, f64::MAX, 1000.0, &config);
        // rate hits 5 MCF/d after ln(2)/0.1 months; volume = qi/d * (1 - 0.5)
        let expected = 1000.0 + 10.0 / 0.1 * 0.5 * DAYS_PER_MONTH;
        assert!((forecast.eur_gas_mcf - expected).abs() < 1e-6);
    }

    #[test]
    fn test_hyperbolic_cumulative_matches_numeric_integral() {
        let model = DeclineModel::Hyperbolic { qi: 300.0, di: 0.2, b: 0.7 };
        let tau = 18.0;
        let steps = 20_000;
        let h = tau / steps as f64;
        let numeric: f64 = (0..steps)
            .map(|i| model.rate((i as f64 + 0.5) * h) * h)
            .sum();
        assert!((model.cumulative(tau) - numeric).abs() / numeric < 1e-6);

        let harmonic = DeclineModel::Hyperbolic { qi: 300.0, di: 0.2, b: 1.0 };
        assert!((harmonic.cumulative(10.0) - 300.0 / 0.2 * 3.0_f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn test_reanchoring_preserves_hyperbolic_shape() {
        let model = DeclineModel::Hyperbolic { qi: 400.0, di: 0.15, b: 0.8 };
        let moved = model.reanchored(6.0, 1.0);
        assert!((moved.rate(4.0) - model.rate(10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pre_shut_in_tail_ends_at_stop() {
        let mut rates = vec![100.0; 30];
        rates.extend([0.0; 6]);
        let s = series_from("2018-01", &rates);
        let stop = ReportMonth::parse("2020-06");
        let tail = DeclineCurveFitter::tail(&s, &DeclineConfig::default(), stop, 12);
        assert_eq!(tail.len(), 12);
        assert_eq!(tail.last().map(|r| r.month), stop);
    }

    #[test]
    fn test_no_production_yields_zero_heuristic() {
        let fit = DeclineCurveFitter::fit(&series_from("2020-01", &[0.0, 0.0]), &recent_config(), None, 12);
        assert_eq!(fit.model, DeclineModel::Heuristic { mean_rate: 0.0 });
        assert_eq!(fit.forecast.eur_gas_mcf, 0.0);
    }
}
