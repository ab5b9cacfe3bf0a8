//! # ngoreg-core — Foundational Types for the NGO Registry
//!
//! Every other crate in the workspace depends on `ngoreg-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed four-level hierarchy.** `ZoneType` has exactly four variants
//!    (country, region, department, municipality). Depth and parent level are
//!    derived from the variant, never stored.
//!
//! 2. **Newtype identifiers.** `NgoId` and `ZoneId` wrap UUIDs so an NGO key
//!    cannot be passed where a zone key is expected.
//!
//! 3. **Names are editing-time references.** `ZoneNode` refers to its parent
//!    by name; `PersistedZone` refers to it by `ZoneId`. Conversion between
//!    the two lives in `ngoreg-store`.
//!
//! 4. **`CanonicalBytes` for comparisons.** Zone-set equality used by the
//!    update path flows through `CanonicalBytes::new()` (RFC 8785) and
//!    [`zone_set_digest()`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ngoreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod zone;

// Re-export primary types for ergonomic imports.
pub use canonical::{canonical_zone_set, CanonicalBytes, CanonicalZoneEntry};
pub use digest::{zone_set_digest, ZoneSetDigest};
pub use error::{
    CanonicalizationError, DuplicateTuple, DuplicateZoneError, NameCollision, UnresolvedParent,
};
pub use identity::{NgoId, ZoneId};
pub use zone::{NewZone, PersistedZone, ZoneKey, ZoneNode, ZoneType, SENEGAL};
