//! # Check Subcommands
//!
//! `ngoreg validate` runs the pre-persistence validator over a zone list.
//! `ngoreg digest` prints the canonical zone-set digest, the value the update
//! path compares to decide whether a save changes anything.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ngoreg_core::zone_set_digest;
use ngoreg_zones::validate;

use crate::input::read_zone_list;

/// Arguments for `ngoreg validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Zone list to check (JSON or YAML, `-` for stdin).
    pub input: PathBuf,

    /// Treat orphaned zones as failures.
    #[arg(long)]
    pub strict: bool,
}

/// Run `ngoreg validate`.
///
/// Exit code 1 on duplicates or name collisions, or on orphans with `--strict`.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let zones = read_zone_list(&args.input)?;
    let report = match validate(&zones) {
        Ok(report) => report,
        Err(e) => {
            for dup in &e.duplicates {
                writeln!(out, "FAIL duplicate {dup}")?;
            }
            for collision in &e.collisions {
                writeln!(out, "FAIL name collision {collision}")?;
            }
            return Ok(1);
        }
    };

    for warning in &report.warnings {
        writeln!(out, "WARN {warning}")?;
    }
    if args.strict && !report.is_clean() {
        writeln!(
            out,
            "FAIL {} of {} zones have no parent",
            report.warnings.len(),
            report.zone_count
        )?;
        return Ok(1);
    }
    writeln!(out, "OK {} zones", report.zone_count)?;
    Ok(0)
}

/// Arguments for `ngoreg digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Zone list to digest (JSON or YAML, `-` for stdin).
    pub input: PathBuf,

    /// Prefix the digest with `sha256:`.
    #[arg(long)]
    pub prefixed: bool,
}

/// Run `ngoreg digest`.
pub fn run_digest(args: &DigestArgs, out: &mut dyn Write) -> Result<u8> {
    let zones = read_zone_list(&args.input)?;
    let digest = zone_set_digest(&zones).context("zone list cannot be canonicalized")?;
    if args.prefixed {
        writeln!(out, "sha256:{}", digest.to_hex())?;
    } else {
        writeln!(out, "{}", digest.to_hex())?;
    }
    Ok(0)
}
