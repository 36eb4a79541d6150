//! Capped proportional allocation.
//!
//! Contract:
//! - Walk projects in the named order (score descending, ties by input
//!   index). For each, award `score / remaining_mass * remaining_budget`
//!   capped at `cap`, then retire the award from the budget and the
//!   project's own score from the mass.
//! - `remaining_mass <= 0` defines the share as 0, so a zero-score project
//!   never divides by zero and never receives funding.
//! - The order matters: capping a dominant project early hands its surplus
//!   to the remaining projects in proportion to their *relative* scores,
//!   not as an even split.
//!
//! Invariants:
//! - every award lies in [0, cap];
//! - Σ awards == budget (1e-9 relative) whenever any score is nonzero; with
//!   all-zero scores the budget is simply undistributed.
//!
//! This function is stateless and is invoked three times per round: once
//! per ballot, once on the median vector, and once inside the surplus pass.

use rf_core::determinism::rank_descending;
use rf_core::numeric::safe_share;

/// Distribute `budget` across `scores` with a per-project `cap`.
/// Returns awards in canonical (input) order.
pub fn allocate_capped(scores: &[f64], budget: f64, cap: f64) -> Vec<f64> {
    let mut awards = vec![0.0; scores.len()];
    let mut remaining_budget = budget;
    let mut remaining_mass: f64 = scores.iter().sum();

    for idx in rank_descending(scores) {
        let score = scores[idx];
        let uncapped = safe_share(score, remaining_mass, remaining_budget);
        let awarded = uncapped.min(cap);
        awards[idx] = awarded;
        remaining_budget -= awarded;
        remaining_mass -= score;
    }

    awards
}
