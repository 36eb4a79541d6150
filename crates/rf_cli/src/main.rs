//! rf — offline command-line runner.
//!
//! Exit codes:
//!   0  success
//!   2  input validation failure (flags, schema, manifest, digests)
//!   3  self-verification failure (post-hoc invariants on the output)
//!   4  I/O failure (read/write/path)
//!   5  engine failure (aggregation or other pipeline logic)

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const SELF_VERIFY: i32 = 3;
    pub const IO: i32 = 4;
    pub const ENGINE: i32 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args};

use rf_io::canonical_json;
use rf_io::loader;
use rf_pipeline::{run_from_manifest_path, run_from_paths, PipelineError, RoundOutputs};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    SelfVerify(String),
    Io(String),
    Engine(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("rf: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    let rc = if args.validate_only {
        match validate_only(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report(&e),
        }
    } else {
        match run_once(&args) {
            Ok(()) => exitcodes::OK,
            Err(e) => report(&e),
        }
    };

    ExitCode::from(rc as u8)
}

fn report(e: &MainError) -> i32 {
    use exitcodes::*;
    let (code, msg) = match e {
        MainError::Validation(m) => (VALIDATION, m),
        MainError::SelfVerify(m) => (SELF_VERIFY, m),
        MainError::Io(m) => (IO, m),
        MainError::Engine(m) => (ENGINE, m),
    };
    eprintln!("rf: error: {msg}");
    code
}

/// Load + validate inputs without running the pipeline.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let loaded = if let Some(manifest) = &args.manifest {
        loader::load_all_from_manifest(manifest)
    } else {
        loader::load_from_paths(
            args.metrics.as_ref().expect("args validated: --metrics"),
            args.ballots.as_ref().expect("args validated: --ballots"),
            args.params.as_ref().expect("args validated: --params"),
        )
    };
    match loaded {
        Ok(ctx) => {
            if !args.quiet {
                eprintln!(
                    "validate-only: inputs OK ({} projects, {} ballots)",
                    ctx.registry.len(),
                    ctx.ballots.len()
                );
            }
            Ok(())
        }
        Err(e) => Err(map_io_err(e)),
    }
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let ts = args.timestamp.as_deref();
    let outs = if let Some(manifest) = &args.manifest {
        run_from_manifest_path(manifest, ts)
    } else {
        run_from_paths(
            args.metrics.as_ref().expect("args validated: --metrics"),
            args.ballots.as_ref().expect("args validated: --ballots"),
            args.params.as_ref().expect("args validated: --params"),
            ts,
        )
    }
    .map_err(map_pipeline_err)?;

    write_artifacts(&args.out, &outs)?;

    if !args.quiet {
        eprintln!("run: {}", outs.result.id);
        eprintln!("run: artifacts written to {}", args.out.display());
    }
    Ok(())
}

fn write_artifacts(out_dir: &Path, outs: &RoundOutputs) -> Result<(), MainError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    canonical_json::write_canonical_file(&out_dir.join("result.json"), &outs.result)
        .map_err(|e| MainError::Io(format!("write result.json: {e}")))?;
    canonical_json::write_canonical_file(&out_dir.join("run_record.json"), &outs.run_record)
        .map_err(|e| MainError::Io(format!("write run_record.json: {e}")))?;
    Ok(())
}

/// Translate rf_io errors into exit-code buckets.
fn map_io_err(e: rf_io::IoError) -> MainError {
    use rf_io::IoError::*;
    match e {
        Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        Manifest(m) => MainError::Validation(format!("manifest: {m}")),
        Digest(m) => MainError::Validation(format!("digest: {m}")),
        Expect(m) => MainError::Validation(format!("expect: {m}")),
        Invalid(m) => MainError::Validation(format!("invalid: {m}")),
        Path(m) => MainError::Io(format!("path: {m}")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Expect(m) => MainError::Validation(format!("expect: {m}")),
        PipelineError::Verify(m) => MainError::SelfVerify(m),
        PipelineError::Aggregate(m) => MainError::Engine(m),
    }
}
