//! VERIFY stage: post-hoc invariant checks on the computed allocations.
//!
//! Checks run on the engine's own output before any artifact is written:
//! - every award is finite, non-negative, and at most the cap;
//! - the pre-threshold allocation conserves the budget whenever it is
//!   distributable (some median nonzero AND the nonzero projects' combined
//!   cap can hold the budget; otherwise the shortfall is the defined
//!   outcome, not a defect);
//! - the final allocation never exceeds the budget (it may sum below it
//!   after floor zeroing with every remaining project capped).
//!
//! Tolerance is relative, 1e-6 against the budget. Floor consistency of
//! the final vector is deliberately NOT checked here: the single-pass
//! surplus mode is allowed to leave a sub-floor award.

use rf_core::numeric::within_tolerance;
use rf_core::Params;

use crate::finalize::FinalizeOutcome;
use crate::PipelineError;

/// Relative tolerance for conservation checks.
pub const REL_TOLERANCE: f64 = 1e-6;

pub fn verify_round(
    medians: &[f64],
    outcome: &FinalizeOutcome,
    params: &Params,
) -> Result<(), PipelineError> {
    let budget = params.total_funding;
    let tol = REL_TOLERANCE * budget.abs().max(1.0);

    check_vector("pre-threshold", &outcome.pre_threshold, params)?;
    check_vector("final", &outcome.final_alloc, params)?;

    let nz = medians.iter().filter(|&&m| m > 0.0).count();
    if nz > 0 {
        let pre_total: f64 = outcome.pre_threshold.iter().sum();
        let distributable = (nz as f64) * params.max_cap + tol >= budget;
        if distributable && !within_tolerance(pre_total, budget, REL_TOLERANCE, budget) {
            return Err(PipelineError::Verify(format!(
                "pre-threshold allocation sums to {pre_total}, budget is {budget}"
            )));
        }
        if pre_total > budget + tol {
            return Err(PipelineError::Verify(format!(
                "pre-threshold allocation sums to {pre_total}, above budget {budget}"
            )));
        }
    } else if outcome.pre_threshold.iter().any(|&a| a != 0.0) {
        return Err(PipelineError::Verify(
            "all medians are zero but the allocation is not".to_string(),
        ));
    }

    let final_total: f64 = outcome.final_alloc.iter().sum();
    if final_total > budget + tol {
        return Err(PipelineError::Verify(format!(
            "final allocation sums to {final_total}, above budget {budget}"
        )));
    }

    Ok(())
}

fn check_vector(stage: &str, awards: &[f64], params: &Params) -> Result<(), PipelineError> {
    for (i, &a) in awards.iter().enumerate() {
        if !a.is_finite() {
            return Err(PipelineError::Verify(format!(
                "{stage} award #{i} is not finite: {a}"
            )));
        }
        if a < 0.0 {
            return Err(PipelineError::Verify(format!(
                "{stage} award #{i} is negative: {a}"
            )));
        }
        if a > params.max_cap {
            return Err(PipelineError::Verify(format!(
                "{stage} award #{i} exceeds the cap {}: {a}",
                params.max_cap
            )));
        }
    }
    Ok(())
}
