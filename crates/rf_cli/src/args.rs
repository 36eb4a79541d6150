//! Offline CLI argument surface: parsing, mode checks, and path hygiene.
//!
//! Rules:
//! - No networked paths (any `scheme://` is rejected, including `--out`).
//! - Exactly one input mode: `--manifest` XOR
//!   (`--metrics` + `--ballots` + `--params`).
//! - `--validate-only` loads and validates inputs without running the
//!   pipeline or writing artifacts.
//! - `--timestamp` (optional) is the UTC instant recorded in the run
//!   record; omitted, artifacts use the Unix epoch and stay reproducible.

use std::{env, fs};
use std::path::{Path, PathBuf};

use clap::Parser;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "rf",
    disable_help_subcommand = true,
    about = "Offline, deterministic funding-allocation engine"
)]
pub struct Args {
    /// Manifest JSON naming the three inputs (mutually exclusive with
    /// explicit file flags).
    #[arg(long, conflicts_with_all = ["metrics", "ballots", "params"])]
    pub manifest: Option<PathBuf>,

    /// Project × metric table JSON path.
    #[arg(long)]
    pub metrics: Option<PathBuf>,
    /// Ballots JSON path.
    #[arg(long)]
    pub ballots: Option<PathBuf>,
    /// Round parameters JSON path.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Output directory for result.json / run_record.json.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Timestamp recorded in the run record (strict YYYY-MM-DDTHH:MM:SSZ).
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Load and validate inputs only; do not run the pipeline.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress non-essential stderr logs.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
    BadTimestamp(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required flag: {s}"),
            NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadTimestamp(s) => write!(f, "timestamp must be YYYY-MM-DDTHH:MM:SSZ: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    validate(args)
}

fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    if let Some(manifest) = &args.manifest {
        ensure_exists(manifest, "--manifest")?;
    } else {
        let metrics = args.metrics.as_ref().ok_or(CliError::Missing("--metrics"))?;
        let ballots = args.ballots.as_ref().ok_or(CliError::Missing("--ballots"))?;
        let params = args.params.as_ref().ok_or(CliError::Missing("--params"))?;
        ensure_exists(metrics, "--metrics")?;
        ensure_exists(ballots, "--ballots")?;
        ensure_exists(params, "--params")?;
    }

    if let Some(ts) = &args.timestamp {
        if !is_ts_utc_z(ts) {
            return Err(CliError::BadTimestamp(ts.clone()));
        }
    }

    args.out = normalize_path(&args.out);
    Ok(args)
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        args.manifest.as_deref(),
        args.metrics.as_deref(),
        args.ballots.as_deref(),
        args.params.as_deref(),
        Some(args.out.as_path()),
    ]
    .into_iter()
    .flatten()
}

/// Reject any explicit URI scheme (http://, https://, file://, ...).
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        let lower = s.trim().to_ascii_lowercase();
        if lower.contains("://")
            || lower.starts_with("http:")
            || lower.starts_with("https:")
            || lower.starts_with("file:")
        {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn ensure_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta =
        fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path; the out dir may not
/// exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(p)
        }
    })
}

/// Strict "YYYY-MM-DDTHH:MM:SSZ" shape check (same rule the run-record id
/// builder enforces, surfaced early).
fn is_ts_utc_z(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 20
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            10 => *c == b'T',
            13 | 16 => *c == b':',
            19 => *c == b'Z',
            _ => c.is_ascii_digit(),
        })
}
