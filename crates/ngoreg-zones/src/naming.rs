//! # Stored Form
//!
//! What a flat list looks like once saved and read back, and the name each
//! node is stored under.
//!
//! - Countries and regions are always roots.
//! - A department or municipality keeps its parent name only when a node of
//!   the parent level carries that name; otherwise it is stored as a root.
//! - Among municipalities, a name carried by several is stored as
//!   `"<department> - <name>"` for every member with a parent.
//!
//! Stored names are unique per level. A list where two distinct nodes would
//! share one is reported by [`find_name_collisions`].

use std::collections::{HashMap, HashSet};

use ngoreg_core::{NameCollision, ZoneKey, ZoneNode, ZoneType};

/// Joins a department name to a shared municipality name.
pub const DISAMBIGUATION_SEPARATOR: &str = " - ";

/// The list as rehydration returns it after a save, in input order.
pub fn stored_form(zones: &[ZoneNode]) -> Vec<ZoneNode> {
    let names_at = |level: ZoneType| {
        zones
            .iter()
            .filter(|z| z.zone_type == level)
            .map(|z| z.name.as_str())
            .collect::<HashSet<&str>>()
    };
    let regions = names_at(ZoneType::Region);
    let departments = names_at(ZoneType::Department);

    zones
        .iter()
        .map(|z| {
            let present = match z.zone_type {
                ZoneType::Country | ZoneType::Region => None,
                ZoneType::Department => Some(&regions),
                ZoneType::Municipality => Some(&departments),
            };
            let parent_name = present.and_then(|names| {
                z.parent_name
                    .clone()
                    .filter(|p| names.contains(p.as_str()))
            });
            ZoneNode {
                zone_type: z.zone_type,
                name: z.name.clone(),
                parent_name,
            }
        })
        .collect()
}

/// Stored names for a list of municipalities, in input order.
///
/// A name carried by more than one municipality becomes
/// `"<parent_name> - <name>"` for every member of the group. A member with
/// no parent name keeps its name.
pub fn disambiguate_municipalities(municipalities: &[&ZoneNode]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in municipalities {
        *counts.entry(m.name.as_str()).or_insert(0) += 1;
    }

    municipalities
        .iter()
        .map(|m| match (&m.parent_name, counts.get(m.name.as_str())) {
            (Some(parent), Some(&n)) if n > 1 => {
                let renamed = format!("{parent}{DISAMBIGUATION_SEPARATOR}{}", m.name);
                tracing::debug!(municipality = %m.name, persisted_as = %renamed, "disambiguated");
                renamed
            }
            _ => m.name.clone(),
        })
        .collect()
}

/// Stored name of every node of a list already in stored form, in input
/// order.
pub fn stored_names(zones: &[ZoneNode]) -> Vec<String> {
    let municipalities: Vec<&ZoneNode> = zones
        .iter()
        .filter(|z| z.zone_type == ZoneType::Municipality)
        .collect();
    let mut renamed = disambiguate_municipalities(&municipalities).into_iter();

    zones
        .iter()
        .map(|z| match z.zone_type {
            ZoneType::Municipality => renamed.next().unwrap_or_else(|| z.name.clone()),
            _ => z.name.clone(),
        })
        .collect()
}

/// Distinct tuples of `zones` that would be stored under the same name at
/// one level, in first-occurrence order.
pub fn find_name_collisions(zones: &[ZoneNode]) -> Vec<NameCollision> {
    let names = stored_names(&stored_form(zones));

    let mut groups: HashMap<(ZoneType, &str), Vec<ZoneKey>> = HashMap::new();
    let mut order: Vec<(ZoneType, &str)> = Vec::new();
    for (z, name) in zones.iter().zip(&names) {
        let slot = (z.zone_type, name.as_str());
        let keys = groups.entry(slot).or_insert_with(|| {
            order.push(slot);
            Vec::new()
        });
        let key = z.key();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    order
        .into_iter()
        .filter_map(|slot| {
            let keys = groups.remove(&slot)?;
            (keys.len() > 1).then(|| NameCollision {
                zone_type: slot.0,
                stored_name: slot.1.to_string(),
                zones: keys,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::toggle_municipality;
    use ngoreg_core::SENEGAL;

    #[test]
    fn stored_form_drops_unresolvable_parents() {
        let zones = vec![
            ZoneNode::country(SENEGAL),
            ZoneNode {
                zone_type: ZoneType::Region,
                name: "Thiès".into(),
                parent_name: Some(SENEGAL.into()),
            },
            ZoneNode::department("Mbour", "Thiès"),
            ZoneNode::department("Kolda", "Sédhiou"),
            ZoneNode::municipality("Saly", "Mbour"),
            ZoneNode::municipality("Dabo", "Kolda"),
            ZoneNode::municipality("Ghost town", "Ghost"),
        ];
        let stored = stored_form(&zones);
        assert_eq!(stored[1], ZoneNode::region("Thiès"));
        assert_eq!(stored[2], ZoneNode::department("Mbour", "Thiès"));
        assert_eq!(stored[3].parent_name, None);
        assert_eq!(stored[4], ZoneNode::municipality("Saly", "Mbour"));
        // Still resolves: the demoted department keeps its name.
        assert_eq!(stored[5], ZoneNode::municipality("Dabo", "Kolda"));
        assert_eq!(stored[6].parent_name, None);
    }

    #[test]
    fn disambiguation_without_parent_keeps_name() {
        let orphan = ZoneNode {
            zone_type: ZoneType::Municipality,
            name: "Centre".into(),
            parent_name: None,
        };
        let placed = ZoneNode::municipality("Centre", "Alpha");
        assert_eq!(
            disambiguate_municipalities(&[&orphan, &placed]),
            vec!["Centre".to_string(), "Alpha - Centre".to_string()]
        );
    }

    #[test]
    fn orphan_municipality_is_not_prefixed_with_a_missing_department() {
        let zones = vec![
            ZoneNode::department("Mbour", "Thiès"),
            ZoneNode::municipality("Centre", "Mbour"),
            ZoneNode::municipality("Centre", "Ghost"),
        ];
        assert_eq!(
            stored_names(&stored_form(&zones)),
            vec!["Mbour", "Mbour - Centre", "Centre"]
        );
        assert!(find_name_collisions(&zones).is_empty());
    }

    #[test]
    fn same_department_name_in_two_regions_collides() {
        let zones = toggle_municipality(
            &toggle_municipality(&[], "Nord", "Centre", "R1"),
            "Sud",
            "Centre",
            "R2",
        );
        assert_eq!(
            find_name_collisions(&zones),
            vec![NameCollision {
                zone_type: ZoneType::Department,
                stored_name: "Centre".into(),
                zones: vec![
                    ZoneNode::department("Centre", "R1").key(),
                    ZoneNode::department("Centre", "R2").key(),
                ],
            }]
        );
    }

    #[test]
    fn literal_name_colliding_with_a_rename_is_reported() {
        let zones = vec![
            ZoneNode::department("Mbour", "Thiès"),
            ZoneNode::department("Joal", "Thiès"),
            ZoneNode::municipality("Centre", "Mbour"),
            ZoneNode::municipality("Centre", "Joal"),
            ZoneNode::municipality("Mbour - Centre", "Joal"),
        ];
        let collisions = find_name_collisions(&zones);
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].stored_name, "Mbour - Centre");
        assert_eq!(collisions[0].zones.len(), 2);
    }

    #[test]
    fn roots_declared_with_and_without_parent_collide() {
        let zones = vec![
            ZoneNode::region("Dakar"),
            ZoneNode {
                zone_type: ZoneType::Region,
                name: "Dakar".into(),
                parent_name: Some(SENEGAL.into()),
            },
        ];
        assert_eq!(find_name_collisions(&zones).len(), 1);
    }

    #[test]
    fn exact_duplicates_are_not_collisions() {
        let zones = vec![ZoneNode::region("Dakar"), ZoneNode::region("Dakar")];
        assert!(find_name_collisions(&zones).is_empty());
    }

    #[test]
    fn separator_in_a_unique_name_is_kept() {
        let zones = vec![
            ZoneNode::department("Dakar", "Dakar"),
            ZoneNode::municipality("Dakar - Plateau", "Dakar"),
        ];
        assert_eq!(
            stored_names(&stored_form(&zones)),
            vec!["Dakar", "Dakar - Plateau"]
        );
    }
}
