//! Minimum-floor zeroing and surplus redistribution.
//!
//! Contract (single pass, the reference behavior):
//! 1. Zero every award strictly below the floor — exactly 0.0, never a
//!    small residual.
//! 2. Sum the awards sitting exactly at the cap (`saturated`); those
//!    projects can receive no more.
//! 3. `freed = budget - saturated`.
//! 4. Re-run the capped allocator over the projects strictly below the cap
//!    (floored projects included with score 0, so they legitimately receive
//!    0 again), with budget `freed` and the same cap.
//! 5. Capped projects keep the cap; everyone else takes the re-run award.
//!
//! Cap membership uses bit-exact `== cap` equality: the allocator emits the
//! cap via `min` with the exact parameter value, so saturated awards carry
//! it unchanged (this mirrors the reference comparison).
//!
//! One pass does NOT re-check the floor after redistribution; an award may
//! land strictly between 0 and the floor and stay there. `SurplusMode::
//! Iterate` repeats the pass to a fixed point instead, bounded by
//! `max_rounds`.

use rf_core::{Params, SurplusMode};

use crate::allocate::allocate_capped;

/// Resolve the floor and redistribute capped/floored surplus per
/// `params.surplus`. `alloc` is the budget-conserving output of the median
/// allocation pass, in canonical order.
pub fn resolve_floor_and_surplus(alloc: &[f64], params: &Params) -> Vec<f64> {
    match params.surplus {
        SurplusMode::SinglePass => one_pass(alloc, params),
        SurplusMode::Iterate { max_rounds } => {
            let mut current = alloc.to_vec();
            for _ in 0..max_rounds {
                current = one_pass(&current, params);
                let dangling = current
                    .iter()
                    .any(|&a| a > 0.0 && a < params.min_cap);
                if !dangling {
                    break;
                }
            }
            current
        }
    }
}

fn one_pass(alloc: &[f64], params: &Params) -> Vec<f64> {
    let (budget, cap, floor) = (params.total_funding, params.max_cap, params.min_cap);

    let mut current: Vec<f64> = alloc
        .iter()
        .map(|&a| if a < floor { 0.0 } else { a })
        .collect();

    let saturated: f64 = current.iter().copied().filter(|&a| a == cap).sum();
    let freed = budget - saturated;

    let open: Vec<usize> = (0..current.len()).filter(|&i| current[i] < cap).collect();
    let sub_scores: Vec<f64> = open.iter().map(|&i| current[i]).collect();
    let sub_awards = allocate_capped(&sub_scores, freed, cap);
    for (k, &i) in open.iter().enumerate() {
        current[i] = sub_awards[k];
    }

    current
}
