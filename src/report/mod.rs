//! Output writers for a finished run: fixed-schema TSV tables and the JSON
//! summary.

pub mod summary;
pub mod table;

pub use summary::{PriorityBucket, RunSummary, ScoreStatistics};
pub use table::{
    candidate_table, feature_columns, fmt_value, go_no_go_table, run_errors_table, shortlist_table, Table,
};
