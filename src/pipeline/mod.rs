//! Batch Pipeline
//!
//! ## Run Sequence
//!
//! ```text
//! validate config -> resolve as-of -> normalize (per well) -> extract features (per well)
//!     -> rank (whole population) -> shortlist -> portfolio -> Go/No-Go
//! ```
//!
//! Per-well failures land in the [`RunReport`]; only a bad configuration or an
//! empty universe stops a run.

mod coordinator;
mod run_report;

pub use coordinator::{PipelineCoordinator, PipelineError, PipelineInputs, PipelineOutcome, PipelineStats};
pub use run_report::RunReport;
