//! Shared data structures for the reactivation scoring pipeline
//!
//! This module defines the core types that flow between stages:
//! - Stage 0: WellIdentity, RawProductionRow, AccessSignals (inputs from the I/O layer)
//! - Stage 1: ProductionRecord / ProductionSeries (canonical monthly series)
//! - Stage 2-5: FeatureVector (flat, NaN-safe per-well features)
//! - Stage 6: ScoredCandidate (score, penalties, rank, exclusion)

mod well;
mod production;
mod signals;
mod features;
mod candidate;

pub use well::*;
pub use production::*;
pub use signals::*;
pub use features::*;
pub use candidate::*;
