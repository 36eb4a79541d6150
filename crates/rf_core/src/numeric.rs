//! Float guards and small statistics used across the engine.
//!
//! The source procedure leaned on a numeric library's NaN propagation for
//! 0/0; here every zero-denominator case is an explicit branch that yields
//! 0, and downstream stages may assume score/allocation vectors are
//! NaN-free.

/// Proportional share `score / mass * budget`, defined as 0 whenever the
/// remaining mass is not strictly positive. The `mass <= 0` guard also
/// absorbs tiny negative drift from repeated subtraction.
#[inline]
pub fn safe_share(score: f64, mass: f64, budget: f64) -> f64 {
    if mass > 0.0 {
        score / mass * budget
    } else {
        0.0
    }
}

/// Median of `values`; even counts average the two middle elements.
/// Returns `None` for an empty slice.
pub fn median_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// True when `value` is within `rel` of `target`, scaled by `reference`
/// (the round budget). The `max(1.0)` keeps the check meaningful for a
/// zero budget.
#[inline]
pub fn within_tolerance(value: f64, target: f64, rel: f64, reference: f64) -> bool {
    (value - target).abs() <= rel * reference.abs().max(1.0)
}
