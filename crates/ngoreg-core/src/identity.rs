//! # Identifier Newtypes
//!
//! You cannot pass a `ZoneId` where an `NgoId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the NGO that owns a set of zones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct NgoId(pub Uuid);

/// Surrogate key of a persisted zone row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ZoneId(pub Uuid);

impl NgoId {
    /// Generate a new random NGO identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for NgoId {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneId {
    /// Generate a new random zone key.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for NgoId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<Uuid> for ZoneId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NgoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ngo:{}", self.0)
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone:{}", self.0)
    }
}
