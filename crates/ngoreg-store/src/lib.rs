//! # ngoreg-store — Zone Persistence
//!
//! Turns the flat, name-keyed zone list into identifier-keyed rows and back.
//!
//! ## Save path
//!
//! ```text
//! flat list ─▶ validate ─▶ Pass 1 roots ─▶ Pass 2 departments ─▶ Pass 3 municipalities
//!                             │ region name → ZoneId   │ department name → ZoneId
//!                             └────────────────────────┴──▶ parent_zone_id
//! ```
//!
//! Each pass awaits the keys generated by the previous one. A failed pass
//! aborts the rest; earlier passes stay written unless the backend runs the
//! sequence inside a transaction (`PgZoneStore::replace_zones_atomic`).
//!
//! ## Modules
//!
//! - `store.rs` — the [`ZoneStore`] batch interface and its error type.
//! - `memory.rs` — in-process store for development and tests.
//! - `postgres.rs` — SQLx/Postgres store with embedded migrations.
//! - `backend.rs` — runtime choice between the two.
//! - `resolver.rs` — the three-pass resolver.
//! - `update.rs` — canonical-diff replacement.
//! - `rehydrate.rs` — rows back to the flat editing list.

pub mod backend;
pub mod memory;
pub mod postgres;
pub mod rehydrate;
pub mod resolver;
pub mod store;
pub mod update;

pub use backend::ZoneBackend;
pub use memory::MemoryZoneStore;
pub use postgres::{init_pool, PgZoneStore, PgZoneTx};
pub use rehydrate::{load_zones, rehydrate};
pub use resolver::{
    resolve_and_persist, PersistenceBatchError, PersistencePass, ResolutionMode,
    ResolutionOutcome, ResolveError,
};
pub use store::{StoreError, ZoneStore};
pub use update::{replace_zones, ReplaceOutcome};
