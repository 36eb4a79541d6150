//! ASSEMBLE stage: canonical result and run-record artifacts.
//!
//! Both artifacts hash their own canonical bytes:
//! - `RoundResult.id = "RES:" + sha256(canonical bytes of the body)`,
//!   where the body is every field except `id`;
//! - `RunRecord.id = "RUN:" + timestamp + ":" + sha256(body)` likewise.
//!
//! Allocations are emitted as ordered arrays of `{project_id, amount}` in
//! canonical project order, never as JSON maps, so canonical bytes carry
//! the registry order rather than lexical key order.

use serde::{Deserialize, Serialize};

use rf_core::Params;
use rf_io::prelude::*;

use crate::finalize::FinalizeOutcome;
use crate::{PipelineError, RoundContext};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

/// One `{project_id, amount}` line of an allocation vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectAward {
    pub project_id: String,
    pub amount: f64,
}

/// The hashed body of the result artifact (everything except `id`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResultBody {
    pub engine: EngineMeta,
    pub params: Params,
    pub ballot_count: usize,
    /// Final allocations after floor/surplus resolution.
    pub allocations: Vec<ProjectAward>,
    /// Per-project medians before the final allocation pass (diagnostic).
    pub median_preview: Vec<ProjectAward>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub id: String,
    #[serde(flatten)]
    pub body: RoundResultBody,
}

/// The hashed body of the run record (everything except `id`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecordBody {
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub inputs: InputDigests,
    pub result_id: String,
    pub result_sha256: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    #[serde(flatten)]
    pub body: RunRecordBody,
}

pub fn build_round_result(
    ctx: &RoundContext,
    medians: &[f64],
    outcome: &FinalizeOutcome,
) -> Result<RoundResult, PipelineError> {
    let body = RoundResultBody {
        engine: ctx.engine.clone(),
        params: ctx.loaded.params,
        ballot_count: ctx.loaded.ballots.len(),
        allocations: awards(&ctx.loaded.registry, &outcome.final_alloc),
        median_preview: awards(&ctx.loaded.registry, medians),
    };
    let id = res_id_from_canonical(&body)?;
    Ok(RoundResult { id, body })
}

pub fn build_run_record(
    ctx: &RoundContext,
    result: &RoundResult,
) -> Result<RunRecord, PipelineError> {
    let body = RunRecordBody {
        timestamp_utc: ctx.timestamp_utc.clone(),
        engine: ctx.engine.clone(),
        inputs: ctx.loaded.digests.clone(),
        result_id: result.id.clone(),
        result_sha256: sha256_canonical(result)?,
    };
    let bytes = to_canonical_bytes(&body)?;
    let id = run_id_from_bytes(&ctx.timestamp_utc, &bytes)?;
    Ok(RunRecord { id, body })
}

fn awards(registry: &rf_core::ProjectRegistry, amounts: &[f64]) -> Vec<ProjectAward> {
    registry
        .project_ids()
        .zip(amounts)
        .map(|(pid, &amount)| ProjectAward {
            project_id: pid.clone().into(),
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::{Ballot, ProjectRecord, ProjectRegistry, SurplusMode};
    use rf_io::loader::LoadedContext;
    use std::collections::BTreeMap;

    fn ctx() -> RoundContext {
        let registry = ProjectRegistry {
            metrics: vec!["gas_fees".parse().unwrap()],
            projects: vec![ProjectRecord {
                project_id: "alpha".parse().unwrap(),
                is_oss: false,
                metrics: BTreeMap::new(),
            }],
        };
        RoundContext {
            loaded: LoadedContext {
                registry,
                ballots: vec![Ballot {
                    weights: BTreeMap::new(),
                    os_multiplier: 1.0,
                }],
                params: rf_core::Params {
                    total_funding: 100.0,
                    max_cap: 40.0,
                    min_cap: 10.0,
                    surplus: SurplusMode::SinglePass,
                },
                digests: InputDigests {
                    metrics_sha256: "0".repeat(64),
                    ballots_sha256: "1".repeat(64),
                    params_sha256: "2".repeat(64),
                },
            },
            engine: crate::engine_identifiers(),
            timestamp_utc: "2024-07-01T12:00:00Z".to_string(),
        }
    }

    fn outcome() -> FinalizeOutcome {
        FinalizeOutcome {
            pre_threshold: vec![0.0],
            final_alloc: vec![0.0],
        }
    }

    #[test]
    fn result_id_is_stable_over_the_body() {
        let c = ctx();
        let r1 = build_round_result(&c, &[0.0], &outcome()).unwrap();
        let r2 = build_round_result(&c, &[0.0], &outcome()).unwrap();
        assert_eq!(r1.id, r2.id);
        assert!(r1.id.starts_with("RES:"));
        assert_eq!(r1.id.len(), "RES:".len() + 64);
    }

    #[test]
    fn run_id_embeds_the_timestamp() {
        let c = ctx();
        let r = build_round_result(&c, &[0.0], &outcome()).unwrap();
        let rec = build_run_record(&c, &r).unwrap();
        assert!(rec.id.starts_with("RUN:2024-07-01T12:00:00Z:"));
        assert_eq!(rec.body.result_id, r.id);
    }

    #[test]
    fn allocations_keep_canonical_order_as_an_array() {
        let c = ctx();
        let r = build_round_result(&c, &[0.0], &outcome()).unwrap();
        let bytes = to_canonical_bytes(&r).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(r#""allocations":[{"amount":0.0,"project_id":"alpha"}]"#));
    }
}
