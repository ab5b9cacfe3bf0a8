//! # In-Memory Zone Store
//!
//! Thread-safe, cloneable store used in development mode (no `DATABASE_URL`)
//! and in tests. Clones share the same data.
//!
//! The `RwLock` is `parking_lot`, not `tokio::sync`: it is never held across
//! an `.await`, and a panicking writer does not poison it.
//!
//! Mirrors the Postgres schema's `unique (ngo_id, zone_type, name)`
//! constraint, and counts write operations so callers can assert that an
//! unchanged update wrote nothing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use ngoreg_core::{NewZone, NgoId, PersistedZone, ZoneId, ZoneType};

use crate::store::{StoreError, ZoneStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryZoneStore {
    rows: Arc<RwLock<Vec<PersistedZone>>>,
    writes: Arc<AtomicU64>,
    fail_on: Option<ZoneType>,
}

impl MemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects any insert batch containing a zone of `zone_type`.
    pub fn failing_on(zone_type: ZoneType) -> Self {
        Self {
            fail_on: Some(zone_type),
            ..Self::default()
        }
    }

    /// Number of insert or delete operations that reached the store.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Total rows across all NGOs.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Stop injecting failures; the data is shared with `self`.
    pub fn healed(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            writes: Arc::clone(&self.writes),
            fail_on: None,
        }
    }
}

impl ZoneStore for MemoryZoneStore {
    async fn insert_batch(
        &mut self,
        ngo_id: &NgoId,
        rows: Vec<NewZone>,
    ) -> Result<Vec<PersistedZone>, StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);

        if let Some(t) = self.fail_on {
            if rows.iter().any(|r| r.zone_type == t) {
                return Err(StoreError::Unavailable(format!(
                    "injected failure on {t} batch"
                )));
            }
        }

        let mut guard = self.rows.write();
        let mut taken: HashSet<(ZoneType, String)> = guard
            .iter()
            .filter(|z| &z.ngo_id == ngo_id)
            .map(|z| (z.zone_type, z.name.clone()))
            .collect();
        for r in &rows {
            if !taken.insert((r.zone_type, r.name.clone())) {
                return Err(StoreError::Constraint(format!(
                    "{} '{}' already exists for {ngo_id}",
                    r.zone_type, r.name
                )));
            }
        }

        let inserted: Vec<PersistedZone> = rows
            .into_iter()
            .map(|r| PersistedZone::from_new(ZoneId::new(), ngo_id.clone(), r))
            .collect();
        guard.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn delete_for_ngo(&mut self, ngo_id: &NgoId) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.rows.write();
        let before = guard.len();
        guard.retain(|z| &z.ngo_id != ngo_id);
        Ok((before - guard.len()) as u64)
    }

    async fn load_for_ngo(&mut self, ngo_id: &NgoId) -> Result<Vec<PersistedZone>, StoreError> {
        let mut rows: Vec<PersistedZone> = self
            .rows
            .read()
            .iter()
            .filter(|z| &z.ngo_id == ngo_id)
            .cloned()
            .collect();
        // Stable: insertion order is kept within a level.
        rows.sort_by_key(|z| z.zone_type);
        Ok(rows)
    }
}
