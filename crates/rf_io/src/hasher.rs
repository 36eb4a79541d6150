//! Deterministic hashing and ID builders for canonical artifacts.
//!
//! - Canonical JSON hashing: UTF-8, sorted object keys, array order
//!   preserved.
//! - IDs derive from canonical bytes: `RES:<hex64>` for the result,
//!   `RUN:<rfc3339>:<hex64>` for the run record.
//! - Hex digests are lowercase.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the **canonical JSON bytes** of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// `RES:<hex64>` — result artifact id over canonical bytes.
pub fn res_id_from_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(format!("RES:{}", sha256_canonical(value)?))
}

/// `RUN:<timestamp>:<hex64>` — run-record id. `timestamp_utc` must be a
/// strict `YYYY-MM-DDTHH:MM:SSZ` string.
pub fn run_id_from_bytes(timestamp_utc: &str, run_bytes_canonical: &[u8]) -> Result<String, IoError> {
    if !is_ts_utc_z(timestamp_utc) {
        return Err(IoError::Invalid(format!(
            "timestamp must be YYYY-MM-DDTHH:MM:SSZ: {timestamp_utc}"
        )));
    }
    Ok(format!(
        "RUN:{timestamp_utc}:{}",
        sha256_hex(run_bytes_canonical)
    ))
}

/// Strict RFC3339-like check: "YYYY-MM-DDTHH:MM:SSZ" (length 20).
fn is_ts_utc_z(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() != 20 {
        return false;
    }
    matches!(b[4], b'-')
        && matches!(b[7], b'-')
        && matches!(b[10], b'T')
        && matches!(b[13], b':')
        && matches!(b[16], b':')
        && matches!(b[19], b'Z')
        && b.iter().enumerate().all(|(i, c)| match i {
            0..=3 | 5..=6 | 8..=9 | 11..=12 | 14..=15 | 17..=18 => matches!(c, b'0'..=b'9'),
            4 | 7 | 10 | 13 | 16 | 19 => true,
            _ => false,
        })
}

/// Lowercase 64-hex shape check (manifest digest fields).
pub fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
