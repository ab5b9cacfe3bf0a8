//! # Postgres Zone Store
//!
//! Persists zone rows in the `ngo_zones` table via SQLx. Each resolver pass
//! is one `INSERT ... SELECT FROM UNNEST(...)` statement, so a pass is a
//! single round trip regardless of how many zones it carries.
//!
//! Row ids are generated here rather than by the database so that returned
//! rows line up with the input batch without relying on `RETURNING` order.
//!
//! [`PgZoneStore::replace_zones_atomic`] runs the whole load/delete/insert
//! sequence inside one transaction: a failed pass rolls back to the zones
//! stored before the update.

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgExecutor, Postgres, Transaction};
use uuid::Uuid;

use ngoreg_core::{NewZone, NgoId, PersistedZone, ZoneId, ZoneNode, ZoneType};

use crate::resolver::{PersistenceBatchError, PersistencePass, ResolutionMode, ResolveError};
use crate::store::{StoreError, ZoneStore};
use crate::update::{replace_zones, ReplaceOutcome};

/// Connect to Postgres and apply the embedded migrations.
pub async fn init_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Pool-backed store. Each method runs as its own statement.
#[derive(Debug, Clone)]
pub struct PgZoneStore {
    pool: PgPool,
}

impl PgZoneStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; used by the readiness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Replace the zones of `ngo_id` inside one transaction.
    pub async fn replace_zones_atomic(
        &self,
        ngo_id: &NgoId,
        zones: &[ZoneNode],
        mode: ResolutionMode,
    ) -> Result<ReplaceOutcome, ResolveError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceBatchError::new(PersistencePass::Load, e.into()))?;
        let mut store = PgZoneTx { tx };

        // Dropping the transaction on error rolls it back.
        let outcome = replace_zones(&mut store, ngo_id, zones, mode).await?;

        store
            .tx
            .commit()
            .await
            .map_err(|e| PersistenceBatchError::new(PersistencePass::Commit, e.into()))?;
        Ok(outcome)
    }
}

impl ZoneStore for PgZoneStore {
    async fn insert_batch(
        &mut self,
        ngo_id: &NgoId,
        rows: Vec<NewZone>,
    ) -> Result<Vec<PersistedZone>, StoreError> {
        insert_rows(&self.pool, ngo_id, rows).await
    }

    async fn delete_for_ngo(&mut self, ngo_id: &NgoId) -> Result<u64, StoreError> {
        delete_rows(&self.pool, ngo_id).await
    }

    async fn load_for_ngo(&mut self, ngo_id: &NgoId) -> Result<Vec<PersistedZone>, StoreError> {
        load_rows(&self.pool, ngo_id).await
    }
}

/// A store bound to one open transaction.
pub struct PgZoneTx<'c> {
    tx: Transaction<'c, Postgres>,
}

impl ZoneStore for PgZoneTx<'_> {
    async fn insert_batch(
        &mut self,
        ngo_id: &NgoId,
        rows: Vec<NewZone>,
    ) -> Result<Vec<PersistedZone>, StoreError> {
        insert_rows(&mut *self.tx, ngo_id, rows).await
    }

    async fn delete_for_ngo(&mut self, ngo_id: &NgoId) -> Result<u64, StoreError> {
        delete_rows(&mut *self.tx, ngo_id).await
    }

    async fn load_for_ngo(&mut self, ngo_id: &NgoId) -> Result<Vec<PersistedZone>, StoreError> {
        load_rows(&mut *self.tx, ngo_id).await
    }
}

// ─── Queries ─────────────────────────────────────────────────────────

async fn insert_rows<'e, E: PgExecutor<'e>>(
    exec: E,
    ngo_id: &NgoId,
    rows: Vec<NewZone>,
) -> Result<Vec<PersistedZone>, StoreError> {
    let persisted: Vec<PersistedZone> = rows
        .into_iter()
        .map(|r| PersistedZone::from_new(ZoneId::new(), ngo_id.clone(), r))
        .collect();

    let ids: Vec<Uuid> = persisted.iter().map(|z| *z.id.as_uuid()).collect();
    let types: Vec<String> = persisted
        .iter()
        .map(|z| z.zone_type.as_str().to_string())
        .collect();
    let names: Vec<String> = persisted.iter().map(|z| z.name.clone()).collect();
    let parents: Vec<Option<Uuid>> = persisted
        .iter()
        .map(|z| z.parent_zone_id.as_ref().map(|p| *p.as_uuid()))
        .collect();
    let originals: Vec<Option<String>> = persisted
        .iter()
        .map(|z| z.original_name.clone())
        .collect();

    sqlx::query(
        "INSERT INTO ngo_zones (id, ngo_id, zone_type, name, parent_zone_id, original_name)
         SELECT u.id, $1, u.zone_type, u.name, u.parent_zone_id, u.original_name
         FROM UNNEST($2::uuid[], $3::text[], $4::text[], $5::uuid[], $6::text[])
              AS u(id, zone_type, name, parent_zone_id, original_name)",
    )
    .bind(*ngo_id.as_uuid())
    .bind(&ids)
    .bind(&types)
    .bind(&names)
    .bind(&parents)
    .bind(&originals)
    .execute(exec)
    .await
    .map_err(map_write_error)?;

    Ok(persisted)
}

async fn delete_rows<'e, E: PgExecutor<'e>>(exec: E, ngo_id: &NgoId) -> Result<u64, StoreError> {
    let result = sqlx::query("DELETE FROM ngo_zones WHERE ngo_id = $1")
        .bind(*ngo_id.as_uuid())
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}

async fn load_rows<'e, E: PgExecutor<'e>>(
    exec: E,
    ngo_id: &NgoId,
) -> Result<Vec<PersistedZone>, StoreError> {
    let rows = sqlx::query_as::<_, ZoneRow>(
        "SELECT id, ngo_id, zone_type, name, parent_zone_id, original_name
         FROM ngo_zones
         WHERE ngo_id = $1
         ORDER BY CASE zone_type
                    WHEN 'country' THEN 0
                    WHEN 'region' THEN 1
                    WHEN 'department' THEN 2
                    ELSE 3
                  END,
                  name",
    )
    .bind(*ngo_id.as_uuid())
    .fetch_all(exec)
    .await?;

    rows.into_iter().map(ZoneRow::into_record).collect()
}

fn map_write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Constraint(db.message().to_string())
        }
        _ => StoreError::Database(e),
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ZoneRow {
    id: Uuid,
    ngo_id: Uuid,
    zone_type: String,
    name: String,
    parent_zone_id: Option<Uuid>,
    original_name: Option<String>,
}

impl ZoneRow {
    fn into_record(self) -> Result<PersistedZone, StoreError> {
        let zone_type: ZoneType = self
            .zone_type
            .parse()
            .map_err(|reason| StoreError::CorruptRow {
                id: self.id,
                reason,
            })?;
        Ok(PersistedZone {
            id: ZoneId::from(self.id),
            ngo_id: NgoId::from(self.ngo_id),
            zone_type,
            name: self.name,
            parent_zone_id: self.parent_zone_id.map(ZoneId::from),
            original_name: self.original_name,
        })
    }
}
