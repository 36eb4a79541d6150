//! Median aggregation of per-ballot allocation vectors.
//!
//! Contract: given N ballots' allocation vectors (each in canonical project
//! order), produce one vector holding, independently per project, the
//! median of its N awards. The median resists a handful of ballots that
//! allocate extreme amounts to a project — a robustness choice, not an
//! averaging convenience.
//!
//! The result does **not** conserve the budget (medians of N conserving
//! vectors need not sum to B); callers feed it back into the capped
//! allocator as a fresh score vector, where only relative order matters.

use rf_core::numeric::median_of;

/// Aggregation errors. Plain data; the pipeline formats these into its own
/// error surface.
#[derive(Debug, PartialEq, Eq)]
pub enum AggError {
    /// No ballots to aggregate.
    NoBallots,
    /// A ballot's vector length disagrees with the first ballot's.
    RaggedRows { expected: usize, got: usize },
}

/// Per-project median across `rows` (one row per ballot).
pub fn median_by_project(rows: &[Vec<f64>]) -> Result<Vec<f64>, AggError> {
    let first = rows.first().ok_or(AggError::NoBallots)?;
    let n = first.len();
    for row in rows {
        if row.len() != n {
            return Err(AggError::RaggedRows {
                expected: n,
                got: row.len(),
            });
        }
    }

    let mut medians = Vec::with_capacity(n);
    let mut column = Vec::with_capacity(rows.len());
    for j in 0..n {
        column.clear();
        column.extend(rows.iter().map(|row| row[j]));
        // Non-empty by construction (rows is non-empty).
        medians.push(median_of(&column).unwrap_or(0.0));
    }
    Ok(medians)
}
