//! Ranking Engine
//!
//! The only stage that sees the whole population: percentile bounds are
//! derived from every surviving candidate, then each well is scored against
//! those bounds independently.

pub mod bounds;
mod engine;

pub use bounds::{NormBounds, PopulationBounds};
pub use engine::{RankingEngine, RankingOutcome};
