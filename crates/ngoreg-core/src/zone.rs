//! # Intervention-Zone Model
//!
//! The four-level geographic hierarchy an NGO declares it works in:
//!
//! ```text
//! country ──▶ region ──▶ department ──▶ municipality
//!  (0)         (1)         (2)              (3)
//! ```
//!
//! Only "Sénégal" has sub-levels. Region nodes carry no `parent_name`; their
//! country is implied.
//!
//! Two shapes exist for one zone:
//!
//! - [`ZoneNode`]: editing-time, parent referenced by *name*.
//! - [`PersistedZone`]: stored, parent referenced by [`ZoneId`].

use serde::{Deserialize, Serialize};

use crate::identity::{NgoId, ZoneId};

/// The only country whose regions, departments and municipalities are modelled.
pub const SENEGAL: &str = "Sénégal";

// ─── Zone Type ───────────────────────────────────────────────────────

/// Level of a zone in the hierarchy.
///
/// Declaration order is depth order, so the derived `Ord` sorts roots first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Country,
    Region,
    Department,
    Municipality,
}

impl ZoneType {
    /// All levels, root first.
    pub const ALL: [ZoneType; 4] = [
        Self::Country,
        Self::Region,
        Self::Department,
        Self::Municipality,
    ];

    /// Depth in the hierarchy (country = 0, municipality = 3).
    pub fn depth(&self) -> u8 {
        match self {
            Self::Country => 0,
            Self::Region => 1,
            Self::Department => 2,
            Self::Municipality => 3,
        }
    }

    /// The level a node of this type names as its parent.
    ///
    /// Regions report `Country` even though their `parent_name` is left empty.
    pub fn parent_type(&self) -> Option<ZoneType> {
        match self {
            Self::Country => None,
            Self::Region => Some(Self::Country),
            Self::Department => Some(Self::Region),
            Self::Municipality => Some(Self::Department),
        }
    }

    /// Storage/wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Region => "region",
            Self::Department => "department",
            Self::Municipality => "municipality",
        }
    }
}

impl std::fmt::Display for ZoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ZoneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "country" => Ok(Self::Country),
            "region" => Ok(Self::Region),
            "department" => Ok(Self::Department),
            "municipality" => Ok(Self::Municipality),
            other => Err(format!("unknown zone type: {other}")),
        }
    }
}

// ─── Editing-time node ───────────────────────────────────────────────

/// One entry of the flat, name-keyed zone list held by the form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ZoneNode {
    pub zone_type: ZoneType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl ZoneNode {
    pub fn country(name: impl Into<String>) -> Self {
        Self {
            zone_type: ZoneType::Country,
            name: name.into(),
            parent_name: None,
        }
    }

    pub fn region(name: impl Into<String>) -> Self {
        Self {
            zone_type: ZoneType::Region,
            name: name.into(),
            parent_name: None,
        }
    }

    pub fn department(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            zone_type: ZoneType::Department,
            name: name.into(),
            parent_name: Some(region.into()),
        }
    }

    pub fn municipality(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            zone_type: ZoneType::Municipality,
            name: name.into(),
            parent_name: Some(department.into()),
        }
    }

    /// The structural identity of this node.
    pub fn key(&self) -> ZoneKey {
        ZoneKey {
            zone_type: self.zone_type,
            name: self.name.clone(),
            parent_name: self.parent_name.clone(),
        }
    }

    /// Whether this node has the given type and name.
    pub fn is(&self, zone_type: ZoneType, name: &str) -> bool {
        self.zone_type == zone_type && self.name == name
    }

    /// Whether this node is a child of the parent named `parent`.
    pub fn is_child_of(&self, parent: &str) -> bool {
        self.parent_name.as_deref() == Some(parent)
    }

    /// Whether this is the country node for Sénégal.
    pub fn is_senegal(&self) -> bool {
        self.is(ZoneType::Country, SENEGAL)
    }
}

/// `(zone_type, name, parent_name)`: two nodes with the same key are
/// structural duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ZoneKey {
    pub zone_type: ZoneType,
    pub name: String,
    pub parent_name: Option<String>,
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent_name {
            Some(parent) => write!(f, "{}:{}<-{}", self.zone_type, self.name, parent),
            None => write!(f, "{}:{}", self.zone_type, self.name),
        }
    }
}

// ─── Persisted shapes ────────────────────────────────────────────────

/// A zone row ready to be inserted; the store assigns `id` and `ngo_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewZone {
    pub zone_type: ZoneType,
    pub name: String,
    pub parent_zone_id: Option<ZoneId>,
    /// Submitted name when `name` was rewritten to stay unique.
    pub original_name: Option<String>,
}

/// A stored zone row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PersistedZone {
    pub id: ZoneId,
    pub ngo_id: NgoId,
    pub zone_type: ZoneType,
    pub name: String,
    pub parent_zone_id: Option<ZoneId>,
    /// Submitted name when `name` is a disambiguated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl PersistedZone {
    /// Attach store-assigned identity to an insert row.
    pub fn from_new(id: ZoneId, ngo_id: NgoId, row: NewZone) -> Self {
        Self {
            id,
            ngo_id,
            zone_type: row.zone_type,
            name: row.name,
            parent_zone_id: row.parent_zone_id,
            original_name: row.original_name,
        }
    }

    /// The name the editing list uses for this row.
    pub fn display_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_root(&self) -> bool {
        self.parent_zone_id.is_none()
    }
}
