//! # Zone Backend
//!
//! The store the service actually runs on, chosen at startup: Postgres when
//! `DATABASE_URL` is set, memory otherwise. An enum rather than a trait
//! object keeps every future concrete, so handlers stay `Send`.

use ngoreg_core::{NewZone, NgoId, PersistedZone, ZoneNode};

use crate::memory::MemoryZoneStore;
use crate::postgres::PgZoneStore;
use crate::resolver::{ResolutionMode, ResolveError};
use crate::store::{StoreError, ZoneStore};
use crate::update::{replace_zones, ReplaceOutcome};

#[derive(Debug, Clone)]
pub enum ZoneBackend {
    Memory(MemoryZoneStore),
    Postgres(PgZoneStore),
}

impl ZoneBackend {
    pub fn memory() -> Self {
        Self::Memory(MemoryZoneStore::new())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Replace an NGO's zones. On Postgres the whole update is one
    /// transaction; in memory a failed pass leaves earlier passes in place.
    pub async fn replace(
        &mut self,
        ngo_id: &NgoId,
        zones: &[ZoneNode],
        mode: ResolutionMode,
    ) -> Result<ReplaceOutcome, ResolveError> {
        match self {
            Self::Memory(store) => replace_zones(store, ngo_id, zones, mode).await,
            Self::Postgres(store) => store.replace_zones_atomic(ngo_id, zones, mode).await,
        }
    }

    /// Whether the backend can serve requests.
    pub async fn ready(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(_) => Ok(()),
            Self::Postgres(store) => store.ping().await,
        }
    }
}

impl ZoneStore for ZoneBackend {
    async fn insert_batch(
        &mut self,
        ngo_id: &NgoId,
        rows: Vec<NewZone>,
    ) -> Result<Vec<PersistedZone>, StoreError> {
        match self {
            Self::Memory(s) => s.insert_batch(ngo_id, rows).await,
            Self::Postgres(s) => s.insert_batch(ngo_id, rows).await,
        }
    }

    async fn delete_for_ngo(&mut self, ngo_id: &NgoId) -> Result<u64, StoreError> {
        match self {
            Self::Memory(s) => s.delete_for_ngo(ngo_id).await,
            Self::Postgres(s) => s.delete_for_ngo(ngo_id).await,
        }
    }

    async fn load_for_ngo(&mut self, ngo_id: &NgoId) -> Result<Vec<PersistedZone>, StoreError> {
        match self {
            Self::Memory(s) => s.load_for_ngo(ngo_id).await,
            Self::Postgres(s) => s.load_for_ngo(ngo_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rehydrate::{load_zones, rehydrate};
    use ngoreg_core::SENEGAL;

    #[tokio::test]
    async fn memory_backend_replaces_and_loads() {
        let mut backend = ZoneBackend::memory();
        assert_eq!(backend.kind(), "memory");
        assert!(backend.ready().await.is_ok());

        let ngo = NgoId::new();
        let zones = vec![ZoneNode::country(SENEGAL), ZoneNode::region("Kolda")];
        let out = backend
            .replace(&ngo, &zones, ResolutionMode::Strict)
            .await
            .unwrap();
        assert!(out.is_changed());

        let rows = load_zones(&mut backend, &ngo).await.unwrap();
        assert_eq!(rehydrate(&rows), zones);
    }

    #[tokio::test]
    async fn clones_share_memory_data() {
        let mut a = ZoneBackend::memory();
        let mut b = a.clone();
        let ngo = NgoId::new();
        a.replace(&ngo, &[ZoneNode::region("Matam")], ResolutionMode::Lenient)
            .await
            .unwrap();
        assert_eq!(b.load_for_ngo(&ngo).await.unwrap().len(), 1);
    }
}
