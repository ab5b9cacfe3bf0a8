//! # Rehydration — Rows Back to the Editing List
//!
//! The read path. Stored rows reference parents by `ZoneId`; the form edits
//! by name. `rehydrate` joins each row to its parent on `id` and restores
//! `parent_name`. A row the resolver renamed comes back under its
//! `original_name`; every other name is returned as stored.

use std::collections::HashMap;

use ngoreg_core::{NgoId, PersistedZone, ZoneId, ZoneNode, ZoneType};

use crate::resolver::{PersistenceBatchError, PersistencePass};
use crate::store::ZoneStore;

/// Load every zone row owned by `ngo_id`.
pub async fn load_zones<S: ZoneStore>(
    store: &mut S,
    ngo_id: &NgoId,
) -> Result<Vec<PersistedZone>, PersistenceBatchError> {
    let rows = store
        .load_for_ngo(ngo_id)
        .await
        .map_err(|e| PersistenceBatchError::new(PersistencePass::Load, e))?;
    tracing::debug!(ngo = %ngo_id, rows = rows.len(), "zones loaded");
    Ok(rows)
}

/// Rebuild the flat, name-keyed list from stored rows, in row order.
///
/// Regions always come back without a parent name. A row whose parent id is
/// not among `rows` comes back without one too.
pub fn rehydrate(rows: &[PersistedZone]) -> Vec<ZoneNode> {
    let by_id: HashMap<&ZoneId, &PersistedZone> = rows.iter().map(|r| (&r.id, r)).collect();

    rows.iter()
        .map(|r| ZoneNode {
            zone_type: r.zone_type,
            name: r.display_name().to_string(),
            parent_name: match r.zone_type {
                ZoneType::Country | ZoneType::Region => None,
                _ => r
                    .parent_zone_id
                    .as_ref()
                    .and_then(|id| by_id.get(id))
                    .map(|p| p.display_name().to_string()),
            },
        })
        .collect()
}
