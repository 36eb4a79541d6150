//! Round manifest: one small JSON file naming the three inputs.
//!
//! - Local filesystem only. A path containing `scheme://` is rejected
//!   outright; there is no network fetch in this engine.
//! - Relative paths resolve against the manifest's own directory.
//! - `inputs_sha256` (optional) pins the exact input bytes; digests are
//!   verified after loading.
//! - `expect.engine_version` (optional) must match the running engine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hasher::is_lower_hex_64;
use crate::loader::InputDigests;
use crate::{IoError, IoResult};

/// On-disk manifest shape. Unknown fields are rejected.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub metrics_path: String,
    pub ballots_path: String,
    pub params_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_sha256: Option<InputDigests>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Expectations>,
}

/// Optional run expectations recorded in the manifest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    pub engine_version: String,
}

/// Manifest with every path resolved to an absolute-or-manifest-relative
/// location and checked to exist.
#[derive(Clone, Debug)]
pub struct ResolvedManifest {
    pub metrics: PathBuf,
    pub ballots: PathBuf,
    pub params: PathBuf,
    pub inputs_sha256: Option<InputDigests>,
    pub expect: Option<Expectations>,
}

impl Manifest {
    /// Parse a manifest file (strict shape, no unknown fields).
    pub fn from_file(path: &Path) -> IoResult<Manifest> {
        let bytes = fs::read(path)
            .map_err(|e| IoError::Manifest(format!("read {}: {e}", path.display())))?;
        let man: Manifest = serde_json::from_slice(&bytes).map_err(|e| IoError::Json {
            pointer: path.display().to_string(),
            msg: e.to_string(),
        })?;
        man.validate()?;
        Ok(man)
    }

    /// Shape checks that do not touch the filesystem.
    pub fn validate(&self) -> IoResult<()> {
        for (p, name) in [
            (&self.metrics_path, "metrics_path"),
            (&self.ballots_path, "ballots_path"),
            (&self.params_path, "params_path"),
        ] {
            if p.is_empty() {
                return Err(IoError::Manifest(format!("{name} is empty")));
            }
            if p.contains("://") {
                return Err(IoError::Manifest(format!(
                    "{name} must be a local path, got {p}"
                )));
            }
        }
        if let Some(d) = &self.inputs_sha256 {
            for (h, name) in [
                (&d.metrics_sha256, "inputs_sha256.metrics_sha256"),
                (&d.ballots_sha256, "inputs_sha256.ballots_sha256"),
                (&d.params_sha256, "inputs_sha256.params_sha256"),
            ] {
                if !is_lower_hex_64(h) {
                    return Err(IoError::Digest(format!(
                        "{name} must be 64 lowercase hex chars"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve relative paths against `base_dir` and require each input
    /// file to exist.
    pub fn resolve(&self, base_dir: &Path) -> IoResult<ResolvedManifest> {
        let resolve_one = |rel: &str, name: &str| -> IoResult<PathBuf> {
            let p = Path::new(rel);
            let abs = if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            };
            if !abs.is_file() {
                return Err(IoError::Manifest(format!(
                    "{name} does not exist: {}",
                    abs.display()
                )));
            }
            Ok(abs)
        };
        Ok(ResolvedManifest {
            metrics: resolve_one(&self.metrics_path, "metrics_path")?,
            ballots: resolve_one(&self.ballots_path, "ballots_path")?,
            params: resolve_one(&self.params_path, "params_path")?,
            inputs_sha256: self.inputs_sha256.clone(),
            expect: self.expect.clone(),
        })
    }
}

/// Parse + resolve in one step, using the manifest's parent directory as
/// the base for relative paths.
pub fn load_and_resolve(manifest_path: &Path) -> IoResult<ResolvedManifest> {
    let man = Manifest::from_file(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    man.resolve(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn minimal(dir: &Path) -> PathBuf {
        for f in ["metrics.json", "ballots.json", "params.json"] {
            fs::write(dir.join(f), b"{}").unwrap();
        }
        let man = dir.join("manifest.json");
        fs::write(
            &man,
            br#"{"metrics_path":"metrics.json","ballots_path":"ballots.json","params_path":"params.json"}"#,
        )
        .unwrap();
        man
    }

    #[test]
    fn resolves_relative_to_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        let man = minimal(dir.path());
        let resolved = load_and_resolve(&man).unwrap();
        assert_eq!(resolved.metrics, dir.path().join("metrics.json"));
    }

    #[test]
    fn rejects_url_paths() {
        let man = Manifest {
            metrics_path: "https://example.com/metrics.json".into(),
            ballots_path: "ballots.json".into(),
            params_path: "params.json".into(),
            inputs_sha256: None,
            expect: None,
        };
        assert!(matches!(man.validate(), Err(IoError::Manifest(_))));
    }

    #[test]
    fn rejects_unknown_fields() {
        let res: Result<Manifest, _> = serde_json::from_str(
            r#"{"metrics_path":"m","ballots_path":"b","params_path":"p","extra":1}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn rejects_malformed_digest() {
        let man = Manifest {
            metrics_path: "m.json".into(),
            ballots_path: "b.json".into(),
            params_path: "p.json".into(),
            inputs_sha256: Some(InputDigests {
                metrics_sha256: "ABC".into(),
                ballots_sha256: "0".repeat(64),
                params_sha256: "0".repeat(64),
            }),
            expect: None,
        };
        assert!(matches!(man.validate(), Err(IoError::Digest(_))));
    }

    #[test]
    fn missing_input_file_fails_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let man = minimal(dir.path());
        fs::remove_file(dir.path().join("ballots.json")).unwrap();
        assert!(load_and_resolve(&man).is_err());
    }
}
