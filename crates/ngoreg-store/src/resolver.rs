//! # Persistence Resolver
//!
//! Converts a flat, name-keyed zone list into `PersistedZone` rows for one
//! NGO through three strictly ordered passes:
//!
//! 1. **Roots** — every country and region, `parent_zone_id = null`.
//! 2. **Departments** — parent resolved through region name → `ZoneId`
//!    built from Pass 1's rows.
//! 3. **Municipalities** — parent resolved through department name →
//!    `ZoneId` built from Pass 2's rows; names shared by several
//!    municipalities are rewritten to `"<department> - <name>"` and the
//!    submitted name is kept in `original_name`.
//!
//! Names and parents come from [`ngoreg_zones::stored_form`], so every
//! stored name is unique per level once validation has passed.
//!
//! ## Orphans
//!
//! In [`ResolutionMode::Lenient`] a node whose parent is missing is logged
//! and stored as a root. In [`ResolutionMode::Strict`] the submission is
//! rejected before the first write.
//!
//! ## Failure
//!
//! A failed batch aborts the remaining passes and surfaces as
//! [`PersistenceBatchError`]. Rows from earlier passes are not removed here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ngoreg_core::{
    CanonicalizationError, DuplicateZoneError, NewZone, NgoId, PersistedZone, UnresolvedParent,
    ZoneId, ZoneNode, ZoneType,
};
use ngoreg_zones::{stored_form, stored_names, validate, ValidationReport};

use crate::store::{StoreError, ZoneStore};

// ─── Configuration ───────────────────────────────────────────────────

/// What to do with a node whose declared parent is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Log a warning and persist the node as a root.
    #[default]
    Lenient,
    /// Reject the submission without writing anything.
    Strict,
}

impl std::str::FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown resolution mode '{other}' (expected 'lenient' or 'strict')"
            )),
        }
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        })
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// The storage operation a batch error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePass {
    Load,
    Delete,
    Roots,
    Departments,
    Municipalities,
    Commit,
}

impl PersistencePass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Delete => "delete",
            Self::Roots => "roots",
            Self::Departments => "departments",
            Self::Municipalities => "municipalities",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for PersistencePass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage batch failed.
#[derive(Error, Debug)]
#[error("zone batch failed during {pass} pass: {source}")]
pub struct PersistenceBatchError {
    pub pass: PersistencePass,
    #[source]
    pub source: StoreError,
}

impl PersistenceBatchError {
    pub fn new(pass: PersistencePass, source: StoreError) -> Self {
        Self { pass, source }
    }
}

/// Errors from resolving a zone list into stored rows.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The list contains structural duplicates; nothing was written.
    #[error(transparent)]
    Duplicate(#[from] DuplicateZoneError),

    /// Strict mode: orphaned nodes; nothing was written.
    #[error("{} zone(s) reference a missing parent", .0.len())]
    UnresolvedParents(Vec<UnresolvedParent>),

    /// A storage batch failed; later passes did not run.
    #[error(transparent)]
    Batch(#[from] PersistenceBatchError),

    /// The zone set could not be canonicalized for comparison.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

// ─── Outcome ─────────────────────────────────────────────────────────

/// Rows written by one resolution, plus the orphans demoted to roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Rows in pass order: roots, departments, municipalities.
    pub zones: Vec<PersistedZone>,
    pub warnings: Vec<UnresolvedParent>,
}

// ─── Resolver ────────────────────────────────────────────────────────

/// Validate a list and apply the resolution mode, without writing.
pub fn check(zones: &[ZoneNode], mode: ResolutionMode) -> Result<ValidationReport, ResolveError> {
    let report = validate(zones)?;
    if mode == ResolutionMode::Strict && !report.is_clean() {
        return Err(ResolveError::UnresolvedParents(report.warnings));
    }
    Ok(report)
}

/// Resolve `zones` into rows owned by `ngo_id` and write them through `store`.
pub async fn resolve_and_persist<S: ZoneStore>(
    store: &mut S,
    ngo_id: &NgoId,
    zones: &[ZoneNode],
    mode: ResolutionMode,
) -> Result<ResolutionOutcome, ResolveError> {
    let report = check(zones, mode)?;
    tracing::info!(
        ngo = %ngo_id,
        zones = zones.len(),
        orphans = report.warnings.len(),
        %mode,
        "resolving zone list"
    );

    let stored = stored_form(zones);
    let names = stored_names(&stored);
    let planned: Vec<(&ZoneNode, &String)> = stored.iter().zip(&names).collect();
    let mut persisted = Vec::with_capacity(zones.len());

    // Pass 1: roots.
    let roots: Vec<NewZone> = of_level(&planned, ZoneType::Country)
        .chain(of_level(&planned, ZoneType::Region))
        .map(|(z, name)| new_zone(z, name, None))
        .collect();
    let roots = write_pass(store, ngo_id, PersistencePass::Roots, roots).await?;
    let region_ids = ids_by_name(&roots, ZoneType::Region);
    persisted.extend(roots);

    // Pass 2: departments.
    let departments: Vec<NewZone> = of_level(&planned, ZoneType::Department)
        .map(|(z, name)| new_zone(z, name, lookup_parent(z, &region_ids)))
        .collect();
    let departments = write_pass(store, ngo_id, PersistencePass::Departments, departments).await?;
    let department_ids = ids_by_name(&departments, ZoneType::Department);
    persisted.extend(departments);

    // Pass 3: municipalities.
    let municipalities: Vec<NewZone> = of_level(&planned, ZoneType::Municipality)
        .map(|(z, name)| new_zone(z, name, lookup_parent(z, &department_ids)))
        .collect();
    let municipalities =
        write_pass(store, ngo_id, PersistencePass::Municipalities, municipalities).await?;
    persisted.extend(municipalities);

    tracing::info!(ngo = %ngo_id, rows = persisted.len(), "zone list persisted");
    Ok(ResolutionOutcome {
        zones: persisted,
        warnings: report.warnings,
    })
}

fn of_level<'a>(
    planned: &'a [(&'a ZoneNode, &'a String)],
    zone_type: ZoneType,
) -> impl Iterator<Item = (&'a ZoneNode, &'a String)> + 'a {
    planned
        .iter()
        .copied()
        .filter(move |(z, _)| z.zone_type == zone_type)
}

fn new_zone(z: &ZoneNode, stored_name: &str, parent_zone_id: Option<ZoneId>) -> NewZone {
    NewZone {
        zone_type: z.zone_type,
        name: stored_name.to_string(),
        parent_zone_id,
        original_name: (stored_name != z.name).then(|| z.name.clone()),
    }
}

/// Map stored names of `zone_type` rows to their keys. Validation has
/// already made names unique per level.
fn ids_by_name(rows: &[PersistedZone], zone_type: ZoneType) -> HashMap<String, ZoneId> {
    rows.iter()
        .filter(|r| r.zone_type == zone_type)
        .map(|r| (r.name.clone(), r.id.clone()))
        .collect()
}

fn lookup_parent(z: &ZoneNode, ids: &HashMap<String, ZoneId>) -> Option<ZoneId> {
    let found = z.parent_name.as_ref().and_then(|p| ids.get(p)).cloned();
    if found.is_none() {
        tracing::warn!(
            zone = %z.key(),
            "parent not resolved; persisting as root"
        );
    }
    found
}

async fn write_pass<S: ZoneStore>(
    store: &mut S,
    ngo_id: &NgoId,
    pass: PersistencePass,
    rows: Vec<NewZone>,
) -> Result<Vec<PersistedZone>, PersistenceBatchError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let count = rows.len();
    let written = store.insert_batch(ngo_id, rows).await.map_err(|e| {
        tracing::error!(ngo = %ngo_id, %pass, error = %e, "zone batch failed");
        metrics::counter!("ngoreg_zone_batch_failures_total", "pass" => pass.as_str()).increment(1);
        PersistenceBatchError::new(pass, e)
    })?;
    metrics::counter!("ngoreg_zone_rows_written_total", "pass" => pass.as_str())
        .increment(count as u64);
    tracing::debug!(ngo = %ngo_id, %pass, rows = count, "zone batch written");
    Ok(written)
}
