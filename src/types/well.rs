//! Well identity resolved upstream from the authoritative registry.

use serde::{Deserialize, Serialize};

/// Immutable identity of one candidate well.
///
/// Created once during resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellIdentity {
    /// Provider well identifier (join key for production rows)
    pub well_id: String,
    /// 10-digit API number (state + county + unique)
    pub api10: String,
    /// 14-digit API number (adds sidetrack + event sequence)
    pub api14: String,
    pub county: String,
    pub state: String,
    /// `None` when the registry only carries a PLSS legal description
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
}

impl WellIdentity {
    /// Build an identity from a raw registry API string (any punctuation).
    pub fn from_raw_api(
        well_id: impl Into<String>,
        raw_api: &str,
        county: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let (api10, api14) = normalize_api(raw_api);
        Self {
            well_id: well_id.into(),
            api10,
            api14,
            county: county.into(),
            state: state.into(),
            latitude: None,
            longitude: None,
            name: None,
            operator: None,
        }
    }

    /// True when a usable surface coordinate is present.
    pub fn has_coordinates(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite()
        )
    }
}

/// Normalize a raw API number into `(api10, api14)`.
///
/// Non-digits are stripped, then the first 10 / 14 digits are taken and
/// left-padded with zeros. `"35-039-21577-0000"` → `("3503921577", "35039215770000")`.
pub fn normalize_api(raw: &str) -> (String, String) {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let take = |n: usize| {
        let head: String = digits.chars().take(n).collect();
        format!("{head:0>n$}")
    };
    (take(10), take(14))
}
