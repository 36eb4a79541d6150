//! rf_io — offline JSON I/O for the funding engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across
//!   modules.
//! - Manifest resolution with a strict offline posture (no `scheme://`
//!   paths) and optional input digests.
//! - Typed loaders: every wire document has a strict serde type with
//!   `deny_unknown_fields`; a malformed ballot fails the whole run, it is
//!   never silently skipped (dropping one would shift the median).
//! - Canonical JSON (sorted keys, compact) and SHA-256 hashing for
//!   reproducible artifact ids.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for rf_io (manifest/loader/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON shape errors with a locator hint (file or pointer).
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Manifest shape / offline-policy / resolution errors.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Digest shape or mismatch errors.
    #[error("digest error: {0}")]
    Digest(String),

    /// Engine/version expectation mismatches.
    #[error("expectation mismatch: {0}")]
    Expect(String),

    /// Domain validation of loaded values (negative metric, bad weight, …).
    #[error("invalid input: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; callers enrich the
        // locator with the file name at higher layers.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod manifest;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{res_id_from_canonical, run_id_from_bytes, sha256_canonical, sha256_hex};
    pub use crate::loader::{load_all_from_manifest, load_from_paths, InputDigests, LoadedContext};
    pub use crate::manifest::{Manifest, ResolvedManifest};
}
