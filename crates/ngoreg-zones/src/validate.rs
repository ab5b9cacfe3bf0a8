//! # Duplicate & Integrity Validator
//!
//! Runs over the full flat list immediately before persistence.
//!
//! - A `(zone_type, name, parent_name)` tuple occurring more than once fails
//!   the whole submission with [`DuplicateZoneError`]. Duplicates are never
//!   silently dropped: they mean the editing layer is broken.
//! - Distinct tuples that would be stored under the same name at one level
//!   (a department name used in two regions, a literal name equal to a
//!   disambiguated one) fail it too, before anything is written.
//! - A node whose parent is missing (a region without Sénégal, a department
//!   naming no present region, a municipality naming no present department)
//!   becomes an [`UnresolvedParent`] warning. The resolver decides whether a
//!   warning is fatal.
//!
//! The same municipality name under two departments is none of these: those
//! are distinct tuples, disambiguated at persistence time.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use ngoreg_core::{
    DuplicateTuple, DuplicateZoneError, UnresolvedParent, ZoneKey, ZoneNode, ZoneType, SENEGAL,
};

use crate::naming::find_name_collisions;

/// Outcome of a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ValidationReport {
    /// Number of nodes checked.
    pub zone_count: usize,
    /// Orphaned nodes, in list order.
    pub warnings: Vec<UnresolvedParent>,
}

impl ValidationReport {
    /// True when every node's parent is present.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Every tuple occurring more than once, in first-occurrence order.
pub fn find_duplicates(zones: &[ZoneNode]) -> Vec<DuplicateTuple> {
    let mut counts: HashMap<ZoneKey, usize> = HashMap::with_capacity(zones.len());
    let mut order: Vec<ZoneKey> = Vec::new();
    for z in zones {
        let key = z.key();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let occurrences = counts.get(&key).copied().unwrap_or(0);
            (occurrences > 1).then_some(DuplicateTuple { key, occurrences })
        })
        .collect()
}

/// Validate a flat list before persistence.
///
/// # Errors
///
/// Returns [`DuplicateZoneError`] listing every colliding tuple and every
/// stored-name collision.
pub fn validate(zones: &[ZoneNode]) -> Result<ValidationReport, DuplicateZoneError> {
    let rejected = DuplicateZoneError {
        duplicates: find_duplicates(zones),
        collisions: find_name_collisions(zones),
    };
    if !rejected.is_empty() {
        tracing::warn!(
            duplicates = rejected.duplicates.len(),
            collisions = rejected.collisions.len(),
            "zone list rejected: duplicate zones"
        );
        return Err(rejected);
    }

    let has_senegal = zones.iter().any(ZoneNode::is_senegal);
    let regions = names_of(zones, ZoneType::Region);
    let departments = names_of(zones, ZoneType::Department);

    let mut warnings = Vec::new();
    for z in zones {
        let missing = match z.zone_type {
            ZoneType::Country => None,
            ZoneType::Region => (!has_senegal).then(|| UnresolvedParent {
                key: z.key(),
                expected_parent_type: ZoneType::Country,
                parent_name: Some(SENEGAL.to_string()),
            }),
            ZoneType::Department => orphan(z, ZoneType::Region, &regions),
            ZoneType::Municipality => orphan(z, ZoneType::Department, &departments),
        };
        if let Some(w) = missing {
            tracing::warn!(zone = %w.key, "unresolved parent: {w}");
            warnings.push(w);
        }
    }

    Ok(ValidationReport {
        zone_count: zones.len(),
        warnings,
    })
}

fn names_of(zones: &[ZoneNode], zone_type: ZoneType) -> HashSet<&str> {
    zones
        .iter()
        .filter(|z| z.zone_type == zone_type)
        .map(|z| z.name.as_str())
        .collect()
}

fn orphan(
    z: &ZoneNode,
    parent_type: ZoneType,
    present: &HashSet<&str>,
) -> Option<UnresolvedParent> {
    let resolved = z
        .parent_name
        .as_deref()
        .is_some_and(|p| present.contains(p));
    (!resolved).then(|| UnresolvedParent {
        key: z.key(),
        expected_parent_type: parent_type,
        parent_name: z.parent_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::toggle_municipality;

    fn scenario() -> Vec<ZoneNode> {
        vec![
            ZoneNode::country(SENEGAL),
            ZoneNode::region("Dakar"),
            ZoneNode::department("Dakar", "Dakar"),
            ZoneNode::municipality("Pikine", "Dakar"),
        ]
    }

    #[test]
    fn clean_list_passes() {
        let report = validate(&scenario()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.zone_count, 4);
    }

    #[test]
    fn empty_list_passes() {
        let report = validate(&[]).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.zone_count, 0);
    }

    #[test]
    fn duplicates_are_all_listed() {
        let mut zones = scenario();
        zones.push(ZoneNode::region("Dakar"));
        zones.push(ZoneNode::municipality("Pikine", "Dakar"));
        zones.push(ZoneNode::municipality("Pikine", "Dakar"));

        let err = validate(&zones).unwrap_err();
        assert_eq!(
            err.duplicates,
            vec![
                DuplicateTuple {
                    key: ZoneNode::region("Dakar").key(),
                    occurrences: 2,
                },
                DuplicateTuple {
                    key: ZoneNode::municipality("Pikine", "Dakar").key(),
                    occurrences: 3,
                },
            ]
        );
    }

    #[test]
    fn shared_municipality_name_is_not_a_duplicate() {
        let zones = vec![
            ZoneNode::country(SENEGAL),
            ZoneNode::region("R"),
            ZoneNode::department("Alpha", "R"),
            ZoneNode::department("Beta", "R"),
            ZoneNode::municipality("Centre", "Alpha"),
            ZoneNode::municipality("Centre", "Beta"),
        ];
        assert!(find_duplicates(&zones).is_empty());
        assert!(validate(&zones).unwrap().is_clean());
    }

    #[test]
    fn department_name_reused_across_regions_is_rejected() {
        let zones = toggle_municipality(
            &toggle_municipality(&[], "Nord", "Centre", "R1"),
            "Sud",
            "Centre",
            "R2",
        );
        let err = validate(&zones).unwrap_err();
        assert!(err.duplicates.is_empty());
        assert_eq!(err.collisions.len(), 1);
        assert_eq!(err.collisions[0].zone_type, ZoneType::Department);
        assert_eq!(err.collisions[0].stored_name, "Centre");
    }

    #[test]
    fn region_without_senegal_warns() {
        let report = validate(&[ZoneNode::region("Louga")]).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].expected_parent_type, ZoneType::Country);
        assert_eq!(report.warnings[0].parent_name.as_deref(), Some(SENEGAL));
    }

    #[test]
    fn department_with_unknown_region_warns() {
        let zones = vec![
            ZoneNode::country(SENEGAL),
            ZoneNode::department("Mbour", "Thiès"),
        ];
        let report = validate(&zones).unwrap();
        assert_eq!(
            report.warnings,
            vec![UnresolvedParent {
                key: ZoneNode::department("Mbour", "Thiès").key(),
                expected_parent_type: ZoneType::Region,
                parent_name: Some("Thiès".into()),
            }]
        );
    }

    #[test]
    fn municipality_parent_must_be_a_department() {
        // "Dakar" exists only as a region here.
        let zones = vec![
            ZoneNode::country(SENEGAL),
            ZoneNode::region("Dakar"),
            ZoneNode::municipality("Pikine", "Dakar"),
        ];
        let report = validate(&zones).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].expected_parent_type,
            ZoneType::Department
        );
    }

    #[test]
    fn missing_parent_name_warns() {
        let zones = vec![ZoneNode {
            zone_type: ZoneType::Municipality,
            name: "Pikine".into(),
            parent_name: None,
        }];
        let report = validate(&zones).unwrap();
        assert_eq!(report.warnings[0].parent_name, None);
    }
}
