//! Ballot scoring: weighted sum of normalized metric columns.
//!
//! Contract:
//! - For each declared metric with ballot weight w, add w × the normalized
//!   column; metrics the ballot does not list weigh 0.
//! - Ballot metrics unknown to the registry are ignored (they reference no
//!   column), which is valid input, not an error.
//! - An all-zero ballot (no overlapping metrics, or all weights 0) yields
//!   an all-zero score vector; downstream allocation treats that as a fully
//!   undistributed budget rather than failing.
//!
//! Scores land in [0, Σw] per project and need not sum to 1 across
//! projects.

use rf_core::Ballot;

use crate::normalize::NormalizedColumns;

/// Combine `columns` under the ballot's weights into one score per project
/// (canonical order).
pub fn score_projects(columns: &NormalizedColumns, ballot: &Ballot) -> Vec<f64> {
    let mut scores = vec![0.0; columns.project_count];

    for (metric, col) in &columns.columns {
        let w = ballot.weight(metric);
        if w == 0.0 {
            continue;
        }
        for (s, v) in scores.iter_mut().zip(col) {
            *s += w * v;
        }
    }

    scores
}
