//! FINALIZE stage: capped re-allocation of the median vector, then
//! floor/surplus resolution.
//!
//! `pre_threshold` is the budget-conserving allocation the verifier checks
//! conservation against; `final_alloc` may legitimately sum to less than
//! the budget after floor zeroing (and, with every project capped, after
//! surplus redistribution).

use rf_core::Params;

use rf_algo::{allocate_capped, resolve_floor_and_surplus};

/// Both stages of the final allocation, in canonical project order.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizeOutcome {
    /// Capped proportional allocation of the median vector.
    pub pre_threshold: Vec<f64>,
    /// After minimum-floor zeroing and surplus redistribution.
    pub final_alloc: Vec<f64>,
}

pub fn finalize_allocations(medians: &[f64], params: &Params) -> FinalizeOutcome {
    let pre_threshold = allocate_capped(medians, params.total_funding, params.max_cap);
    let final_alloc = resolve_floor_and_surplus(&pre_threshold, params);
    FinalizeOutcome {
        pre_threshold,
        final_alloc,
    }
}
