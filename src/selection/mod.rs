//! Post-ranking selection: shortlist tiers, the portfolio gate and the
//! Go/No-Go decision table. Everything here reads scored candidates and
//! never recomputes a feature.

pub mod go_no_go;
pub mod portfolio;
pub mod shortlist;

#[cfg(test)]
pub(crate) mod fixtures;

pub use go_no_go::{Decision, GoNoGoBuilder, GoNoGoRow};
pub use portfolio::{Alternate, AlternateReason, PortfolioGate, PortfolioSelection};
pub use shortlist::{Gap, Shortlist, ShortlistEntry, ShortlistSelector, Tier};
