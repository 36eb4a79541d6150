//! rf_algo — pure allocation mathematics for the funding engine.
//!
//! Five stateless components, each a file module:
//! - `normalize`: raw metric columns → per-metric probability distributions
//! - `score`: one ballot's weighted combination of normalized columns
//! - `allocate`: the capped proportional allocator, reused at three
//!   pipeline call sites (per ballot, median pass, surplus pass)
//! - `median`: per-project median across many ballots' allocations
//! - `threshold`: minimum-floor zeroing plus surplus redistribution
//!
//! Everything operates on vectors indexed by canonical project order (the
//! registry's project vector) and is deterministic: no RNG, no ambient
//! state, one named tie order (`rf_core::determinism::rank_descending`).

#![forbid(unsafe_code)]

pub mod allocate;
pub mod median;
pub mod normalize;
pub mod score;
pub mod threshold;

pub use allocate::allocate_capped;
pub use median::{median_by_project, AggError};
pub use normalize::{normalize_columns, NormalizedColumns};
pub use score::score_projects;
pub use threshold::resolve_floor_and_surplus;
