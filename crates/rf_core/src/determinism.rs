//! Stable ordering helpers.
//!
//! The engine's single named total order is **descending score, ties broken
//! by ascending input index** (position in the registry's project vector).
//! Every allocation pass walks projects in this order, so which of several
//! tied projects absorbs a rounding remainder is reproducible by
//! construction rather than by a library's stable-sort guarantee.

/// Indices of `scores` sorted by the named total order.
///
/// Comparison uses `f64::total_cmp`, which is a total order even in the
/// presence of NaN; upstream guards keep NaN out of score vectors, this
/// merely guarantees the sort cannot panic or reorder nondeterministically.
pub fn rank_descending(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));
    order
}
