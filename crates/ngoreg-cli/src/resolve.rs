//! # Resolve Subcommand
//!
//! Dry-runs the three-pass resolver against an in-memory store and prints
//! the rows a save would write: ids, parent links and disambiguated
//! municipality names. Nothing leaves the process.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ngoreg_core::{NgoId, ZoneNode};
use ngoreg_store::{
    resolve_and_persist, MemoryZoneStore, ResolutionMode, ResolutionOutcome, ResolveError,
};

use crate::input::{read_zone_list, write_json};

/// Arguments for `ngoreg resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Zone list to resolve (JSON or YAML, `-` for stdin).
    pub input: PathBuf,

    /// Orphan handling: `lenient` stores orphans as roots, `strict` rejects.
    #[arg(long, default_value = "lenient")]
    pub mode: ResolutionMode,
}

/// Run `ngoreg resolve`.
///
/// Exit code 1 when the list is rejected.
pub fn run_resolve(args: &ResolveArgs, out: &mut dyn Write) -> Result<u8> {
    let zones = read_zone_list(&args.input)?;
    match dry_run(&zones, args.mode)? {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                tracing::warn!(%warning, "stored as root");
            }
            write_json(out, &outcome)?;
            Ok(0)
        }
        Err(rejected) => {
            writeln!(out, "REJECTED {rejected}")?;
            Ok(1)
        }
    }
}

/// Resolve `zones` for a throwaway NGO on a fresh in-memory store.
///
/// The outer error covers runtime and store failures; the inner one is a
/// rejection of the list itself.
pub fn dry_run(
    zones: &[ZoneNode],
    mode: ResolutionMode,
) -> Result<std::result::Result<ResolutionOutcome, ResolveError>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let ngo = NgoId::new();
    let mut store = MemoryZoneStore::new();
    match runtime.block_on(resolve_and_persist(&mut store, &ngo, zones, mode)) {
        Ok(outcome) => Ok(Ok(outcome)),
        Err(e @ (ResolveError::Duplicate(_) | ResolveError::UnresolvedParents(_))) => Ok(Err(e)),
        Err(e) => Err(e).context("resolver failed"),
    }
}
