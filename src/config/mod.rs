//! Ranking Configuration Module
//!
//! Every weight, window length, threshold and penalty the engine uses comes
//! from one `RankingConfig` loaded from TOML. The config is passed explicitly
//! to each stage; nothing reads a global.
//!
//! ## Loading Order
//!
//! 1. Explicit path (`--config`)
//! 2. `REACTIVATION_CONFIG` environment variable (path to TOML file)
//! 3. `ranking_config.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let (config, provenance) = RankingConfig::load(cli.config.as_deref())?;
//! let outcome = PipelineCoordinator::new(config)?.run(inputs)?;
//! ```

mod ranking_config;
pub mod defaults;
pub mod validation;

pub use ranking_config::*;
