//! AGGREGATE stage: per-project median across ballot rows.
//!
//! The median is taken independently per project, so the aggregate vector
//! generally does NOT sum to the budget; the FINALIZE stage re-runs the
//! capped allocator over it to restore conservation.

use rf_algo::{median_by_project, AggError};

use crate::PipelineError;

/// Per-project median of the per-ballot allocation rows.
pub fn aggregate_median(rows: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
    median_by_project(rows).map_err(|e| match e {
        AggError::NoBallots => PipelineError::Aggregate("no ballots to aggregate".to_string()),
        AggError::RaggedRows { expected, got } => PipelineError::Aggregate(format!(
            "ballot rows disagree on project count: expected {expected}, got {got}"
        )),
    })
}
