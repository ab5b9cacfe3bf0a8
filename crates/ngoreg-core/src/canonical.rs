//! # Canonical Serialization — Zone-Set Comparison Bytes
//!
//! Defines `CanonicalBytes`, the only construction path for bytes used to
//! compare or digest zone sets.
//!
//! ## Invariant
//!
//! The inner `Vec<u8>` is private. The only way to build one is
//! `CanonicalBytes::new()`, which serializes through `serde_jcs` (RFC 8785):
//! sorted object keys, compact separators, deterministic byte sequence.
//!
//! ## Zone sets
//!
//! [`canonical_zone_set()`] maps a flat zone list to a sorted sequence of
//! [`CanonicalZoneEntry`] keyed by `(zone_type, name)`, with `parent_name` as
//! the tie-breaker. List order in the form therefore never shows up as a
//! difference.

use serde::{Deserialize, Serialize};

use crate::error::CanonicalizationError;
use crate::zone::{ZoneNode, ZoneType};

/// Bytes produced exclusively by RFC 8785 canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Canonical form of a flat zone list.
    pub fn for_zone_set(nodes: &[ZoneNode]) -> Result<Self, CanonicalizationError> {
        Self::new(&canonical_zone_set(nodes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One zone in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalZoneEntry {
    pub zone_type: ZoneType,
    pub name: String,
    pub parent_name: Option<String>,
}

/// Sort a flat zone list into its canonical sequence.
///
/// Ordering is depth first, then name, then parent name. Duplicates are kept;
/// a list with a duplicate tuple is never equal to one without.
pub fn canonical_zone_set(nodes: &[ZoneNode]) -> Vec<CanonicalZoneEntry> {
    let mut entries: Vec<CanonicalZoneEntry> = nodes
        .iter()
        .map(|n| CanonicalZoneEntry {
            zone_type: n.zone_type,
            name: n.name.clone(),
            parent_name: n.parent_name.clone(),
        })
        .collect();
    entries.sort();
    entries
}
