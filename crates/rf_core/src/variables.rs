//! Round parameters and their domain checks.
//!
//! `min_cap <= max_cap <= total_funding` is expected operator input but is
//! deliberately NOT enforced: the allocation procedure is well defined
//! without it, and the reference behavior never checked it. The loader
//! enforces only non-negativity and finiteness.

use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floor/surplus resolution strategy.
///
/// `SinglePass` reproduces the reference behavior exactly: one zero-below-
/// floor step followed by one surplus redistribution, with no check that
/// redistribution pushes another project under the floor. `Iterate` repeats
/// the pass until no award sits strictly between 0 and the floor (or
/// `max_rounds` is exhausted); it is a documented deviation, off by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SurplusMode {
    SinglePass,
    Iterate { max_rounds: u32 },
}

impl Default for SurplusMode {
    fn default() -> Self {
        SurplusMode::SinglePass
    }
}

/// Scalar configuration for one round: total budget B, per-project cap C,
/// minimum floor F, and the surplus resolution mode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    pub total_funding: f64,
    pub max_cap: f64,
    pub min_cap: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub surplus: SurplusMode,
}

/// Check parameter domains: every scalar finite and ≥ 0; an iterate mode
/// must request at least one round.
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    for (v, name) in [
        (p.total_funding, "total_funding"),
        (p.max_cap, "max_cap"),
        (p.min_cap, "min_cap"),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(CoreError::DomainOutOfRange(name));
        }
    }
    if let SurplusMode::Iterate { max_rounds } = p.surplus {
        if max_rounds == 0 {
            return Err(CoreError::DomainOutOfRange("surplus.max_rounds"));
        }
    }
    Ok(())
}
