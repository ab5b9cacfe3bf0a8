//! # Diff-Based Update
//!
//! Replacing an NGO's zones either writes nothing or rewrites everything:
//!
//! 1. Validate the submission under the resolution mode.
//! 2. Load the stored rows and rehydrate them into a flat list.
//! 3. Compare canonical serializations (sorted by `(zone_type, name)`) of the
//!    rehydrated list and the submission's stored form, where orphans and
//!    roots carry no parent name. Equal → no write at all.
//! 4. Otherwise delete every stored row for the NGO and run the resolver on
//!    the new list.
//!
//! A rejected submission leaves the stored zones untouched. Surrogate keys
//! change on every real update.

use serde::{Deserialize, Serialize};

use ngoreg_core::{CanonicalBytes, NgoId, ZoneNode, ZoneSetDigest};
use ngoreg_zones::stored_form;

use crate::rehydrate::{load_zones, rehydrate};
use crate::resolver::{
    check, resolve_and_persist, PersistenceBatchError, PersistencePass, ResolutionMode,
    ResolutionOutcome, ResolveError,
};
use crate::store::ZoneStore;

/// What `replace_zones` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplaceOutcome {
    /// Stored and submitted sets are canonically equal; nothing was written.
    Unchanged { digest: ZoneSetDigest },
    /// All stored rows were deleted and the new list resolved.
    Replaced {
        deleted: u64,
        outcome: ResolutionOutcome,
    },
}

impl ReplaceOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

/// Replace the zones of `ngo_id` with `zones`, skipping every write when the
/// stored set already matches.
pub async fn replace_zones<S: ZoneStore>(
    store: &mut S,
    ngo_id: &NgoId,
    zones: &[ZoneNode],
    mode: ResolutionMode,
) -> Result<ReplaceOutcome, ResolveError> {
    check(zones, mode)?;

    let stored = rehydrate(&load_zones(store, ngo_id).await?);
    let current = CanonicalBytes::for_zone_set(&stored)?;
    let submitted = CanonicalBytes::for_zone_set(&stored_form(zones))?;
    if current == submitted {
        let digest = ZoneSetDigest::of(&submitted);
        metrics::counter!("ngoreg_zone_replace_skipped_total").increment(1);
        tracing::info!(ngo = %ngo_id, %digest, "zone set unchanged; no write");
        return Ok(ReplaceOutcome::Unchanged { digest });
    }

    let deleted = store
        .delete_for_ngo(ngo_id)
        .await
        .map_err(|e| PersistenceBatchError::new(PersistencePass::Delete, e))?;
    tracing::info!(ngo = %ngo_id, deleted, "stored zones cleared for replacement");

    let outcome = resolve_and_persist(store, ngo_id, zones, mode).await?;
    Ok(ReplaceOutcome::Replaced { deleted, outcome })
}
