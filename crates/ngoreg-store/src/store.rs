//! # Zone Store Interface
//!
//! The batch-oriented storage contract the resolver writes through. A store
//! assigns `ZoneId`s; callers never invent them.
//!
//! Methods take `&mut self` so a backend can wrap a single SQL transaction.

use thiserror::Error;

use ngoreg_core::{NewZone, NgoId, PersistedZone};

/// Errors raised by a zone store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQL failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A storage-level uniqueness constraint rejected the batch.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored row could not be mapped back to a zone.
    #[error("corrupt zone row {id}: {reason}")]
    CorruptRow { id: uuid::Uuid, reason: String },

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Batched insert/delete/load of zone rows for one NGO at a time.
#[allow(async_fn_in_trait)]
pub trait ZoneStore {
    /// Insert every row as one batch. Returned rows are in input order.
    async fn insert_batch(
        &mut self,
        ngo_id: &NgoId,
        rows: Vec<NewZone>,
    ) -> Result<Vec<PersistedZone>, StoreError>;

    /// Delete every zone owned by `ngo_id`. Returns the number deleted.
    async fn delete_for_ngo(&mut self, ngo_id: &NgoId) -> Result<u64, StoreError>;

    /// Load every zone owned by `ngo_id`, roots first.
    async fn load_for_ngo(&mut self, ngo_id: &NgoId) -> Result<Vec<PersistedZone>, StoreError>;
}
