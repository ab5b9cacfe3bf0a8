//! # Edit Subcommands
//!
//! `ngoreg toggle` applies one checkbox toggle with its cascade and prints
//! the next list. `ngoreg tree` prints a list as an indented hierarchy.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ngoreg_core::{ZoneNode, ZoneType};
use ngoreg_zones::{apply_toggle, is_selected, LocalKey, ToggleEvent, ZoneSession};

use crate::input::{read_zone_list, write_json};

/// Arguments for `ngoreg toggle`.
#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Current zone list (JSON or YAML). Omit to start from an empty form.
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Level of the toggled zone.
    #[arg(long = "type", value_name = "LEVEL")]
    pub zone_type: ZoneType,

    /// Name of the toggled zone.
    #[arg(long)]
    pub name: String,

    /// Owning region (department) or department (municipality).
    #[arg(long)]
    pub parent: Option<String>,

    /// Region owning the department; municipalities only.
    #[arg(long)]
    pub region: Option<String>,
}

impl ToggleArgs {
    /// Build the toggle event, checking that the level's parents are given.
    pub fn event(&self) -> Result<ToggleEvent> {
        let name = self.name.clone();
        Ok(match self.zone_type {
            ZoneType::Country => ToggleEvent::Country { name },
            ZoneType::Region => ToggleEvent::Region { name },
            ZoneType::Department => ToggleEvent::Department {
                name,
                parent_name: self
                    .parent
                    .clone()
                    .context("--parent (region) is required for a department")?,
            },
            ZoneType::Municipality => ToggleEvent::Municipality {
                name,
                parent_name: self
                    .parent
                    .clone()
                    .context("--parent (department) is required for a municipality")?,
                region: self
                    .region
                    .clone()
                    .context("--region is required for a municipality")?,
            },
        })
    }
}

/// Run `ngoreg toggle`, writing the next list as JSON.
pub fn run_toggle(args: &ToggleArgs, out: &mut dyn Write) -> Result<u8> {
    let event = args.event()?;
    let zones = match &args.input {
        Some(path) => read_zone_list(path)?,
        None => Vec::new(),
    };
    let next = apply_toggle(&zones, &event);
    tracing::info!(
        zone_type = %event.zone_type(),
        name = event.name(),
        selected = is_selected(&next, &event),
        before = zones.len(),
        after = next.len(),
        "toggle applied"
    );
    write_json(out, &next)?;
    Ok(0)
}

/// Arguments for `ngoreg tree`.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Zone list to print (JSON or YAML, `-` for stdin).
    pub input: PathBuf,
}

/// Run `ngoreg tree`.
pub fn run_tree(args: &TreeArgs, out: &mut dyn Write) -> Result<u8> {
    let zones = read_zone_list(&args.input)?;
    write_tree(&zones, out)?;
    Ok(0)
}

/// Print `zones` as an indented tree, two spaces per level.
///
/// Nodes whose parent is missing are printed at the top level with the
/// parent they declared.
pub fn write_tree(zones: &[ZoneNode], out: &mut dyn Write) -> Result<()> {
    let session = ZoneSession::from_flat(zones).context("cannot build tree")?;
    for root in session.roots() {
        write_subtree(&session, root, 0, out)?;
    }
    Ok(())
}

fn write_subtree(
    session: &ZoneSession,
    key: LocalKey,
    depth: usize,
    out: &mut dyn Write,
) -> Result<()> {
    let Some(node) = session.get(key) else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);
    match &node.detached_parent {
        Some(parent) => writeln!(
            out,
            "{indent}{} ({}, missing parent '{parent}')",
            node.name, node.zone_type
        )?,
        None => writeln!(out, "{indent}{} ({})", node.name, node.zone_type)?,
    }
    for child in session.children(key) {
        write_subtree(session, child, depth + 1, out)?;
    }
    Ok(())
}
