//! # Error Types
//!
//! Errors and warnings shared by the validator, the resolver and the API.
//! All errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! ## Design
//!
//! - Duplicate tuples are fatal and reported exhaustively, never one at a time.
//!   So are distinct nodes that would be stored under the same name at one
//!   level.
//! - An unresolved parent is a warning value, not an error. Whether it stops
//!   a submission is decided by the resolution mode in `ngoreg-store`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zone::{ZoneKey, ZoneType};

/// One `(zone_type, name, parent_name)` tuple that appears more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DuplicateTuple {
    pub key: ZoneKey,
    /// How many times the tuple occurs in the submitted list (always >= 2).
    pub occurrences: usize,
}

impl std::fmt::Display for DuplicateTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (x{})", self.key, self.occurrences)
    }
}

/// Distinct nodes that would share one stored name at the same level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NameCollision {
    pub zone_type: ZoneType,
    pub stored_name: String,
    /// The colliding nodes, in list order.
    pub zones: Vec<ZoneKey>,
}

impl std::fmt::Display for NameCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zones = self
            .zones
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ");
        write!(
            f,
            "{} '{}' stored for {}",
            self.zone_type, self.stored_name, zones
        )
    }
}

/// The submitted zone list contains structural duplicates.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("duplicate zones: {}", render_duplicates(.duplicates, .collisions))]
pub struct DuplicateZoneError {
    /// Every colliding tuple, in first-occurrence order.
    pub duplicates: Vec<DuplicateTuple>,
    /// Every stored-name collision between distinct tuples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<NameCollision>,
}

impl DuplicateZoneError {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty() && self.collisions.is_empty()
    }
}

fn render_duplicates(duplicates: &[DuplicateTuple], collisions: &[NameCollision]) -> String {
    duplicates
        .iter()
        .map(ToString::to_string)
        .chain(collisions.iter().map(ToString::to_string))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A node whose declared parent is absent from the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnresolvedParent {
    /// The orphaned node.
    pub key: ZoneKey,
    /// Level the missing parent should have been.
    pub expected_parent_type: ZoneType,
    /// The parent name that matched nothing (`None` when none was declared).
    pub parent_name: Option<String>,
}

impl std::fmt::Display for UnresolvedParent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent_name {
            Some(parent) => write!(
                f,
                "{} references missing {} '{}'",
                self.key, self.expected_parent_type, parent
            ),
            None => write!(
                f,
                "{} has no {} parent",
                self.key, self.expected_parent_type
            ),
        }
    }
}

/// Error during canonical serialization of a zone set.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
