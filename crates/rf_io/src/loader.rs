//! Typed JSON loaders for the three round inputs.
//!
//! Wire shapes are strict (`deny_unknown_fields`). Weights arrive as
//! percents (0..=100) and are divided by 100 here, so the rest of the
//! engine only ever sees [0,1]. The ballot `allocations` field accepts
//! both shapes in circulation: a plain map and the legacy list of
//! single-entry maps (flattened, duplicate metric keys rejected).
//!
//! A structurally malformed ballot fails the WHOLE load. Dropping one
//! ballot would shift every median downstream, which is worse than
//! refusing to run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rf_core::{validate_domains, Ballot, MetricId, Params, ProjectRecord, ProjectRegistry};

use crate::hasher::sha256_hex;
use crate::manifest::{load_and_resolve, ResolvedManifest};
use crate::{IoError, IoResult};

/// SHA-256 (lowercase hex) of the raw bytes of each input file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDigests {
    pub metrics_sha256: String,
    pub ballots_sha256: String,
    pub params_sha256: String,
}

/// Everything the pipeline needs for one round, fully validated.
#[derive(Clone, Debug)]
pub struct LoadedContext {
    pub registry: ProjectRegistry,
    pub ballots: Vec<Ballot>,
    pub params: Params,
    pub digests: InputDigests,
}

// ---------------------------------------------------------------- wire types

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MetricsTableWire {
    metrics: Vec<String>,
    projects: Vec<ProjectWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProjectWire {
    project_id: String,
    is_oss: bool,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BallotWire {
    allocations: AllocationsWire,
    os_multiplier: f64,
}

/// Both historical shapes of the allocations field.
#[derive(Deserialize)]
#[serde(untagged)]
enum AllocationsWire {
    Map(BTreeMap<String, f64>),
    List(Vec<BTreeMap<String, f64>>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamsWire {
    total_funding: f64,
    max_cap: f64,
    min_cap: f64,
    #[serde(default)]
    surplus_mode: rf_core::SurplusMode,
}

// ------------------------------------------------------------- entry points

/// Load all three inputs via a manifest, verifying pinned digests if the
/// manifest carries them.
pub fn load_all_from_manifest(manifest_path: &Path) -> IoResult<LoadedContext> {
    let resolved = load_and_resolve(manifest_path)?;
    load_all_resolved(&resolved)
}

/// Load all three inputs from explicit paths (no manifest, no digest pins).
pub fn load_from_paths(metrics: &Path, ballots: &Path, params: &Path) -> IoResult<LoadedContext> {
    let (registry, metrics_sha256) = load_metrics_table(metrics)?;
    let (ballots, ballots_sha256) = load_ballots(ballots)?;
    let (params, params_sha256) = load_params(params)?;
    Ok(LoadedContext {
        registry,
        ballots,
        params,
        digests: InputDigests {
            metrics_sha256,
            ballots_sha256,
            params_sha256,
        },
    })
}

pub fn load_all_resolved(resolved: &ResolvedManifest) -> IoResult<LoadedContext> {
    let ctx = load_from_paths(&resolved.metrics, &resolved.ballots, &resolved.params)?;
    if let Some(pinned) = &resolved.inputs_sha256 {
        if *pinned != ctx.digests {
            return Err(IoError::Digest(format!(
                "input digests do not match manifest pins: expected {pinned:?}, got {:?}",
                ctx.digests
            )));
        }
    }
    Ok(ctx)
}

// ------------------------------------------------------------- per-file load

/// Metrics table → validated `ProjectRegistry` plus the file digest.
pub fn load_metrics_table(path: &Path) -> IoResult<(ProjectRegistry, String)> {
    let bytes = read_input(path)?;
    let digest = sha256_hex(&bytes);
    let wire: MetricsTableWire = parse_json(path, &bytes)?;

    let metrics = wire
        .metrics
        .into_iter()
        .map(|m| parse_metric_id(path, &m))
        .collect::<IoResult<Vec<_>>>()?;

    let mut projects = Vec::with_capacity(wire.projects.len());
    for p in wire.projects {
        let project_id = p.project_id.parse().map_err(|e| {
            IoError::Invalid(format!("{}: bad project_id {:?}: {e:?}", path.display(), p.project_id))
        })?;
        let mut values = BTreeMap::new();
        for (m, v) in p.metrics {
            values.insert(parse_metric_id(path, &m)?, v);
        }
        projects.push(ProjectRecord {
            project_id,
            is_oss: p.is_oss,
            metrics: values,
        });
    }

    let registry = ProjectRegistry { metrics, projects };
    registry
        .validate()
        .map_err(|e| IoError::Invalid(format!("{}: {e}", path.display())))?;
    Ok((registry, digest))
}

/// Ballots file (a plain JSON array) → validated ballots plus the digest.
pub fn load_ballots(path: &Path) -> IoResult<(Vec<Ballot>, String)> {
    let bytes = read_input(path)?;
    let digest = sha256_hex(&bytes);
    let wire: Vec<BallotWire> = parse_json(path, &bytes)?;

    let mut ballots = Vec::with_capacity(wire.len());
    for (i, b) in wire.into_iter().enumerate() {
        let flat = flatten_allocations(b.allocations)
            .map_err(|msg| IoError::Invalid(format!("{}: ballot {i}: {msg}", path.display())))?;

        let mut weights = BTreeMap::new();
        for (m, pct) in flat {
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                return Err(IoError::Invalid(format!(
                    "{}: ballot {i}: weight for {m} out of range [0,100]: {pct}",
                    path.display()
                )));
            }
            weights.insert(parse_metric_id(path, &m)?, pct / 100.0);
        }

        let ballot = Ballot {
            weights,
            os_multiplier: b.os_multiplier,
        };
        ballot
            .validate()
            .map_err(|e| IoError::Invalid(format!("{}: ballot {i}: {e}", path.display())))?;
        ballots.push(ballot);
    }
    if ballots.is_empty() {
        return Err(IoError::Invalid(format!(
            "{}: ballots file is empty",
            path.display()
        )));
    }
    Ok((ballots, digest))
}

/// Params file → validated `Params` plus the digest.
pub fn load_params(path: &Path) -> IoResult<(Params, String)> {
    let bytes = read_input(path)?;
    let digest = sha256_hex(&bytes);
    let wire: ParamsWire = parse_json(path, &bytes)?;
    let params = Params {
        total_funding: wire.total_funding,
        max_cap: wire.max_cap,
        min_cap: wire.min_cap,
        surplus: wire.surplus_mode,
    };
    validate_domains(&params)
        .map_err(|e| IoError::Invalid(format!("{}: {e}", path.display())))?;
    Ok((params, digest))
}

// ------------------------------------------------------------------ helpers

fn read_input(path: &Path) -> IoResult<Vec<u8>> {
    fs::read(path).map_err(|e| IoError::Path(format!("read {}: {e}", path.display())))
}

fn parse_json<'a, T: Deserialize<'a>>(path: &Path, bytes: &'a [u8]) -> IoResult<T> {
    serde_json::from_slice(bytes).map_err(|e| IoError::Json {
        pointer: path.display().to_string(),
        msg: e.to_string(),
    })
}

fn parse_metric_id(path: &Path, raw: &str) -> IoResult<MetricId> {
    raw.parse()
        .map_err(|e| IoError::Invalid(format!("{}: bad metric id {raw:?}: {e:?}", path.display())))
}

/// Flatten either allocations shape into one map, rejecting duplicates.
fn flatten_allocations(w: AllocationsWire) -> Result<BTreeMap<String, f64>, String> {
    match w {
        AllocationsWire::Map(m) => Ok(m),
        AllocationsWire::List(entries) => {
            let mut out = BTreeMap::new();
            for entry in entries {
                for (k, v) in entry {
                    if out.insert(k.clone(), v).is_some() {
                        return Err(format!("duplicate metric key {k} in allocations list"));
                    }
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    const METRICS: &str = r#"{
        "metrics": ["gas_fees", "users"],
        "projects": [
            { "project_id": "alpha", "is_oss": true,  "metrics": { "gas_fees": 100.0, "users": 10.0 } },
            { "project_id": "beta",  "is_oss": false, "metrics": { "gas_fees": 300.0 } }
        ]
    }"#;

    const PARAMS: &str =
        r#"{ "total_funding": 100.0, "max_cap": 40.0, "min_cap": 10.0 }"#;

    #[test]
    fn loads_metrics_table_with_missing_values_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(dir.path(), "metrics.json", METRICS);
        let (reg, digest) = load_metrics_table(&p).unwrap();
        assert_eq!(reg.len(), 2);
        let users: MetricId = "users".parse().unwrap();
        assert_eq!(reg.projects[1].metric(&users), 0.0);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn ballot_map_and_legacy_list_parse_identically() {
        let dir = tempfile::tempdir().unwrap();
        let map = write(
            dir.path(),
            "map.json",
            r#"[ { "allocations": { "gas_fees": 60, "users": 40 }, "os_multiplier": 3.0 } ]"#,
        );
        let list = write(
            dir.path(),
            "list.json",
            r#"[ { "allocations": [ { "gas_fees": 60 }, { "users": 40 } ], "os_multiplier": 3.0 } ]"#,
        );
        let (from_map, _) = load_ballots(&map).unwrap();
        let (from_list, _) = load_ballots(&list).unwrap();
        assert_eq!(from_map, from_list);
        let gas: MetricId = "gas_fees".parse().unwrap();
        assert_eq!(from_map[0].weight(&gas), 0.6);
    }

    #[test]
    fn duplicate_metric_in_legacy_list_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "dup.json",
            r#"[ { "allocations": [ { "gas_fees": 60 }, { "gas_fees": 40 } ], "os_multiplier": 1.0 } ]"#,
        );
        assert!(matches!(load_ballots(&p), Err(IoError::Invalid(_))));
    }

    #[test]
    fn one_malformed_ballot_fails_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "bad.json",
            r#"[
                { "allocations": { "gas_fees": 60 }, "os_multiplier": 1.0 },
                { "allocations": { "gas_fees": 150 }, "os_multiplier": 1.0 }
            ]"#,
        );
        assert!(load_ballots(&p).is_err());
    }

    #[test]
    fn params_default_surplus_mode_is_single_pass() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(dir.path(), "params.json", PARAMS);
        let (params, _) = load_params(&p).unwrap();
        assert_eq!(params.surplus, rf_core::SurplusMode::SinglePass);
    }

    #[test]
    fn params_iterate_mode_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "params.json",
            r#"{ "total_funding": 100.0, "max_cap": 40.0, "min_cap": 10.0,
                 "surplus_mode": { "iterate": { "max_rounds": 8 } } }"#,
        );
        let (params, _) = load_params(&p).unwrap();
        assert_eq!(
            params.surplus,
            rf_core::SurplusMode::Iterate { max_rounds: 8 }
        );
    }

    #[test]
    fn unknown_top_level_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = write(
            dir.path(),
            "params.json",
            r#"{ "total_funding": 100.0, "max_cap": 40.0, "min_cap": 10.0, "extra": true }"#,
        );
        assert!(load_params(&p).is_err());
    }

    #[test]
    fn manifest_digest_pin_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metrics.json", METRICS);
        write(
            dir.path(),
            "ballots.json",
            r#"[ { "allocations": { "gas_fees": 100 }, "os_multiplier": 1.0 } ]"#,
        );
        write(dir.path(), "params.json", PARAMS);
        let man = write(
            dir.path(),
            "manifest.json",
            &format!(
                r#"{{ "metrics_path": "metrics.json", "ballots_path": "ballots.json",
                     "params_path": "params.json",
                     "inputs_sha256": {{ "metrics_sha256": "{z}", "ballots_sha256": "{z}",
                                         "params_sha256": "{z}" }} }}"#,
                z = "0".repeat(64)
            ),
        );
        assert!(matches!(
            load_all_from_manifest(&man),
            Err(IoError::Digest(_))
        ));
    }

    #[test]
    fn manifest_without_pins_loads_and_reports_digests() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "metrics.json", METRICS);
        write(
            dir.path(),
            "ballots.json",
            r#"[ { "allocations": { "gas_fees": 100 }, "os_multiplier": 1.0 } ]"#,
        );
        write(dir.path(), "params.json", PARAMS);
        let man = write(
            dir.path(),
            "manifest.json",
            r#"{ "metrics_path": "metrics.json", "ballots_path": "ballots.json",
                 "params_path": "params.json" }"#,
        );
        let ctx = load_all_from_manifest(&man).unwrap();
        assert_eq!(ctx.registry.len(), 2);
        assert_eq!(ctx.ballots.len(), 1);
        assert_eq!(ctx.digests.metrics_sha256.len(), 64);
    }
}
