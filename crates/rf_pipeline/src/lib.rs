//! rf_pipeline — the fixed-order round pipeline.
//!
//! LOAD → SCORE (per ballot) → AGGREGATE (median) → FINALIZE (capped
//! re-allocation + floor/surplus) → VERIFY (post-hoc invariants) →
//! ASSEMBLE (result + run record).
//!
//! The pipeline is deterministic end to end: the same three input files
//! produce byte-identical canonical artifacts. The caller supplies the run
//! timestamp; artifacts built without one use the Unix epoch so that
//! archival re-runs stay reproducible.

#![forbid(unsafe_code)]

use std::path::Path;

use thiserror::Error;

use rf_io::prelude::*;

pub mod aggregate;
pub mod build_result;
pub mod finalize;
pub mod score_ballots;
pub mod verify;

pub use aggregate::aggregate_median;
pub use build_result::{EngineMeta, ProjectAward, RoundResult, RunRecord};
pub use finalize::{finalize_allocations, FinalizeOutcome};
pub use score_ballots::score_ballots;
pub use verify::verify_round;

pub const ENGINE_NAME: &str = "rf-engine";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timestamp used when the caller does not supply one. Keeping it fixed
/// keeps re-runs of archived rounds byte-identical.
pub const DEFAULT_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: ENGINE_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),

    /// Median aggregation failed (no ballots, ragged rows).
    #[error("aggregation error: {0}")]
    Aggregate(String),

    /// A post-hoc invariant did not hold on the computed allocations.
    #[error("self-verification failed: {0}")]
    Verify(String),

    /// Manifest `expect` block did not match the running engine.
    #[error("expectation mismatch: {0}")]
    Expect(String),
}

/// Everything run artifacts are built from.
pub struct RoundContext {
    pub loaded: LoadedContext,
    pub engine: EngineMeta,
    pub timestamp_utc: String,
}

/// Computed round: the two canonical artifacts plus per-ballot diagnostics.
#[derive(Debug)]
pub struct RoundOutputs {
    pub result: RoundResult,
    pub run_record: RunRecord,
    /// Per-ballot capped allocations, one row per ballot in input order.
    /// Diagnostic only; not part of any hashed artifact.
    pub per_ballot: Vec<Vec<f64>>,
}

/// Run the full pipeline over an already-loaded context.
pub fn run_with_ctx(ctx: &RoundContext) -> Result<RoundOutputs, PipelineError> {
    let loaded = &ctx.loaded;
    let params = &loaded.params;

    let per_ballot = score_ballots(&loaded.registry, &loaded.ballots, params);
    let medians = aggregate_median(&per_ballot)?;
    let outcome = finalize_allocations(&medians, params);
    verify_round(&medians, &outcome, params)?;

    let result = build_result::build_round_result(ctx, &medians, &outcome)?;
    let run_record = build_result::build_run_record(ctx, &result)?;

    Ok(RoundOutputs {
        result,
        run_record,
        per_ballot,
    })
}

/// Load via manifest (digest pins verified by the loader, `expect` block
/// verified here), then run.
pub fn run_from_manifest_path(
    manifest_path: &Path,
    timestamp_utc: Option<&str>,
) -> Result<RoundOutputs, PipelineError> {
    let resolved = rf_io::manifest::load_and_resolve(manifest_path)?;
    if let Some(expect) = &resolved.expect {
        if expect.engine_version != ENGINE_VERSION {
            return Err(PipelineError::Expect(format!(
                "manifest expects engine version {}, running {}",
                expect.engine_version, ENGINE_VERSION
            )));
        }
    }
    let loaded = rf_io::loader::load_all_resolved(&resolved)?;
    run_loaded(loaded, timestamp_utc)
}

/// Load from explicit file paths, then run.
pub fn run_from_paths(
    metrics: &Path,
    ballots: &Path,
    params: &Path,
    timestamp_utc: Option<&str>,
) -> Result<RoundOutputs, PipelineError> {
    let loaded = load_from_paths(metrics, ballots, params)?;
    run_loaded(loaded, timestamp_utc)
}

fn run_loaded(
    loaded: LoadedContext,
    timestamp_utc: Option<&str>,
) -> Result<RoundOutputs, PipelineError> {
    let ctx = RoundContext {
        loaded,
        engine: engine_identifiers(),
        timestamp_utc: timestamp_utc.unwrap_or(DEFAULT_TIMESTAMP).to_string(),
    };
    run_with_ctx(&ctx)
}
