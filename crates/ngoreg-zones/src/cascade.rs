//! # Cascade Selection Engine
//!
//! Computes the next flat zone list when the user toggles one zone. Every
//! function is pure: it borrows the current list and returns a new one.
//!
//! ## Rules
//!
//! ```text
//! select   municipality ─▶ ensure department ─▶ ensure region ─▶ ensure Sénégal
//! deselect Sénégal      ─▶ drop every region, department and municipality
//! deselect region       ─▶ drop its departments and their municipalities
//! deselect department   ─▶ drop its municipalities
//! deselect municipality ─▶ drop only itself
//! ```
//!
//! Deselection never removes an ancestor. In particular, deselecting the last
//! region leaves "Sénégal" selected.
//!
//! Every ensure step checks presence before appending, so no toggle can
//! introduce a duplicate `(zone_type, name, parent_name)` tuple. Departments
//! are looked up within their region, so the same department name can be
//! picked under two regions; `validate` rejects such a list before a save.

use serde::{Deserialize, Serialize};

use ngoreg_core::{ZoneNode, ZoneType, SENEGAL};

/// A user toggle on one checkbox of the zone picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "zone_type", rename_all = "lowercase")]
pub enum ToggleEvent {
    Country {
        name: String,
    },
    Region {
        name: String,
    },
    Department {
        name: String,
        /// Owning region.
        parent_name: String,
    },
    Municipality {
        name: String,
        /// Owning department.
        parent_name: String,
        /// Region owning the department, needed to select missing ancestors.
        region: String,
    },
}

impl ToggleEvent {
    pub fn zone_type(&self) -> ZoneType {
        match self {
            Self::Country { .. } => ZoneType::Country,
            Self::Region { .. } => ZoneType::Region,
            Self::Department { .. } => ZoneType::Department,
            Self::Municipality { .. } => ZoneType::Municipality,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Country { name }
            | Self::Region { name }
            | Self::Department { name, .. }
            | Self::Municipality { name, .. } => name,
        }
    }
}

/// Apply a toggle event to the flat list.
pub fn apply_toggle(zones: &[ZoneNode], event: &ToggleEvent) -> Vec<ZoneNode> {
    match event {
        ToggleEvent::Country { name } => toggle_country(zones, name),
        ToggleEvent::Region { name } => toggle_region(zones, name),
        ToggleEvent::Department { name, parent_name } => {
            toggle_department(zones, name, parent_name)
        }
        ToggleEvent::Municipality {
            name,
            parent_name,
            region,
        } => toggle_municipality(zones, name, parent_name, region),
    }
}

/// Whether the zone targeted by `event` is currently in the list.
pub fn is_selected(zones: &[ZoneNode], event: &ToggleEvent) -> bool {
    match event {
        ToggleEvent::Country { name } => has_country(zones, name),
        ToggleEvent::Region { name } => has_region(zones, name),
        ToggleEvent::Department { name, parent_name } => {
            has_department(zones, name, parent_name)
        }
        ToggleEvent::Municipality {
            name, parent_name, ..
        } => has_municipality(zones, name, parent_name),
    }
}

/// Toggle a country.
///
/// Deselecting Sénégal clears its whole subtree; any other country has none.
pub fn toggle_country(zones: &[ZoneNode], name: &str) -> Vec<ZoneNode> {
    if !has_country(zones, name) {
        tracing::debug!(country = name, "select country");
        let mut next = zones.to_vec();
        next.push(ZoneNode::country(name));
        return next;
    }

    if name == SENEGAL {
        tracing::debug!(country = name, "deselect country with subtree");
        zones
            .iter()
            .filter(|z| z.zone_type == ZoneType::Country && !z.is_senegal())
            .cloned()
            .collect()
    } else {
        tracing::debug!(country = name, "deselect country");
        zones
            .iter()
            .filter(|z| !z.is(ZoneType::Country, name))
            .cloned()
            .collect()
    }
}

/// Toggle a region, selecting Sénégal if needed.
pub fn toggle_region(zones: &[ZoneNode], name: &str) -> Vec<ZoneNode> {
    if has_region(zones, name) {
        tracing::debug!(region = name, "deselect region");
        return remove_region(zones, name);
    }

    tracing::debug!(region = name, "select region");
    let mut next = zones.to_vec();
    ensure_region(&mut next, name);
    next
}

/// Toggle department `name` of region `region`.
pub fn toggle_department(zones: &[ZoneNode], name: &str, region: &str) -> Vec<ZoneNode> {
    if has_department(zones, name, region) {
        tracing::debug!(department = name, region, "deselect department");
        return zones
            .iter()
            .filter(|z| !is_department_of(z, name, region))
            .filter(|z| !(z.zone_type == ZoneType::Municipality && z.is_child_of(name)))
            .cloned()
            .collect();
    }

    tracing::debug!(department = name, region, "select department");
    let mut next = zones.to_vec();
    ensure_department(&mut next, name, region);
    next
}

/// Toggle municipality `name` of department `department` in region `region`.
pub fn toggle_municipality(
    zones: &[ZoneNode],
    name: &str,
    department: &str,
    region: &str,
) -> Vec<ZoneNode> {
    if has_municipality(zones, name, department) {
        tracing::debug!(municipality = name, department, "deselect municipality");
        return zones
            .iter()
            .filter(|z| !is_municipality_of(z, name, department))
            .cloned()
            .collect();
    }

    tracing::debug!(municipality = name, department, region, "select municipality");
    let mut next = zones.to_vec();
    ensure_department(&mut next, department, region);
    next.push(ZoneNode::municipality(name, department));
    next
}

// ─── Presence ────────────────────────────────────────────────────────

fn has_country(zones: &[ZoneNode], name: &str) -> bool {
    zones.iter().any(|z| z.is(ZoneType::Country, name))
}

fn has_region(zones: &[ZoneNode], name: &str) -> bool {
    zones.iter().any(|z| z.is(ZoneType::Region, name))
}

fn has_department(zones: &[ZoneNode], name: &str, region: &str) -> bool {
    zones.iter().any(|z| is_department_of(z, name, region))
}

fn has_municipality(zones: &[ZoneNode], name: &str, department: &str) -> bool {
    zones.iter().any(|z| is_municipality_of(z, name, department))
}

fn is_department_of(z: &ZoneNode, name: &str, region: &str) -> bool {
    z.is(ZoneType::Department, name) && z.is_child_of(region)
}

fn is_municipality_of(z: &ZoneNode, name: &str, department: &str) -> bool {
    z.is(ZoneType::Municipality, name) && z.is_child_of(department)
}

// ─── Cascade steps ───────────────────────────────────────────────────

fn ensure_senegal(zones: &mut Vec<ZoneNode>) {
    if !has_country(zones, SENEGAL) {
        zones.push(ZoneNode::country(SENEGAL));
    }
}

fn ensure_region(zones: &mut Vec<ZoneNode>, region: &str) {
    ensure_senegal(zones);
    if !has_region(zones, region) {
        zones.push(ZoneNode::region(region));
    }
}

fn ensure_department(zones: &mut Vec<ZoneNode>, department: &str, region: &str) {
    ensure_region(zones, region);
    if !has_department(zones, department, region) {
        zones.push(ZoneNode::department(department, region));
    }
}

fn remove_region(zones: &[ZoneNode], region: &str) -> Vec<ZoneNode> {
    let departments: Vec<&str> = zones
        .iter()
        .filter(|z| z.zone_type == ZoneType::Department && z.is_child_of(region))
        .map(|z| z.name.as_str())
        .collect();

    zones
        .iter()
        .filter(|z| match z.zone_type {
            ZoneType::Country => true,
            ZoneType::Region => z.name != region,
            ZoneType::Department => !z.is_child_of(region),
            ZoneType::Municipality => !z
                .parent_name
                .as_deref()
                .is_some_and(|p| departments.contains(&p)),
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dakar_chain() -> Vec<ZoneNode> {
        toggle_municipality(&[], "Pikine", "Pikine", "Dakar")
    }

    fn keys(zones: &[ZoneNode]) -> HashSet<ngoreg_core::ZoneKey> {
        zones.iter().map(ZoneNode::key).collect()
    }

    // ── Selection ────────────────────────────────────────────────────

    #[test]
    fn select_municipality_from_empty_yields_full_chain() {
        let zones = dakar_chain();
        assert_eq!(
            zones,
            vec![
                ZoneNode::country(SENEGAL),
                ZoneNode::region("Dakar"),
                ZoneNode::department("Pikine", "Dakar"),
                ZoneNode::municipality("Pikine", "Pikine"),
            ]
        );
    }

    #[test]
    fn select_region_adds_senegal_once() {
        let zones = toggle_region(&[], "Dakar");
        let zones = toggle_region(&zones, "Thiès");
        let countries = zones.iter().filter(|z| z.is_senegal()).count();
        assert_eq!(countries, 1);
        assert_eq!(zones.len(), 3);
    }

    #[test]
    fn select_department_reuses_existing_region() {
        let zones = toggle_region(&[], "Thiès");
        let zones = toggle_department(&zones, "Mbour", "Thiès");
        assert_eq!(
            zones,
            vec![
                ZoneNode::country(SENEGAL),
                ZoneNode::region("Thiès"),
                ZoneNode::department("Mbour", "Thiès"),
            ]
        );
    }

    #[test]
    fn select_other_country_has_no_cascade() {
        let zones = toggle_country(&[], "Mali");
        assert_eq!(zones, vec![ZoneNode::country("Mali")]);
    }

    #[test]
    fn same_municipality_name_under_two_departments() {
        let zones = toggle_municipality(&[], "Centre", "Alpha", "R1");
        let zones = toggle_municipality(&zones, "Centre", "Beta", "R1");
        let centres = zones.iter().filter(|z| z.name == "Centre").count();
        assert_eq!(centres, 2);
        assert_eq!(keys(&zones).len(), zones.len());
    }

    // ── Deselection ──────────────────────────────────────────────────

    #[test]
    fn deselect_senegal_clears_subtree_but_keeps_other_countries() {
        let zones = toggle_country(&dakar_chain(), "Mali");
        let zones = toggle_country(&zones, SENEGAL);
        assert_eq!(zones, vec![ZoneNode::country("Mali")]);
    }

    #[test]
    fn deselect_other_country_removes_only_it() {
        let zones = toggle_country(&dakar_chain(), "Mali");
        let zones = toggle_country(&zones, "Mali");
        assert_eq!(zones, dakar_chain());
    }

    #[test]
    fn deselect_region_cascades_down() {
        let mut zones = dakar_chain();
        zones = toggle_municipality(&zones, "Guédiawaye", "Guédiawaye", "Dakar");
        zones = toggle_municipality(&zones, "Mbour", "Mbour", "Thiès");

        let zones = toggle_region(&zones, "Dakar");
        assert_eq!(
            zones,
            vec![
                ZoneNode::country(SENEGAL),
                ZoneNode::region("Thiès"),
                ZoneNode::department("Mbour", "Thiès"),
                ZoneNode::municipality("Mbour", "Mbour"),
            ]
        );
    }

    #[test]
    fn deselect_last_region_keeps_senegal() {
        let zones = toggle_region(&[], "Dakar");
        let zones = toggle_region(&zones, "Dakar");
        assert_eq!(zones, vec![ZoneNode::country(SENEGAL)]);
    }

    #[test]
    fn deselect_department_removes_its_municipalities_only() {
        let mut zones = dakar_chain();
        zones = toggle_municipality(&zones, "Rufisque Est", "Rufisque", "Dakar");
        let zones = toggle_department(&zones, "Pikine", "Dakar");
        assert_eq!(
            zones,
            vec![
                ZoneNode::country(SENEGAL),
                ZoneNode::region("Dakar"),
                ZoneNode::department("Rufisque", "Dakar"),
                ZoneNode::municipality("Rufisque Est", "Rufisque"),
            ]
        );
    }

    #[test]
    fn deselect_municipality_keeps_ancestors() {
        let zones = toggle_municipality(&dakar_chain(), "Pikine", "Pikine", "Dakar");
        assert_eq!(zones.len(), 3);
        assert!(zones.iter().all(|z| z.zone_type != ZoneType::Municipality));
    }

    #[test]
    fn department_toggle_is_scoped_to_its_region() {
        // A department toggled under a different region is a different node.
        let zones = toggle_department(&[], "Centre", "R1");
        let zones = toggle_department(&zones, "Centre", "R2");
        assert_eq!(
            zones
                .iter()
                .filter(|z| z.zone_type == ZoneType::Department)
                .count(),
            2
        );
    }

    // ── Event dispatch ───────────────────────────────────────────────

    #[test]
    fn apply_toggle_matches_direct_calls() {
        let event = ToggleEvent::Municipality {
            name: "Pikine".into(),
            parent_name: "Pikine".into(),
            region: "Dakar".into(),
        };
        assert_eq!(apply_toggle(&[], &event), dakar_chain());
        assert!(is_selected(&dakar_chain(), &event));
        assert!(!is_selected(&[], &event));
    }

    #[test]
    fn toggle_event_json_is_tagged_by_zone_type() {
        let event: ToggleEvent = serde_json::from_str(
            r#"{"zone_type":"department","name":"Mbour","parent_name":"Thiès"}"#,
        )
        .unwrap();
        assert_eq!(event.zone_type(), ZoneType::Department);
        assert_eq!(event.name(), "Mbour");
    }

    // ── Property-based tests ─────────────────────────────────────────

    use proptest::prelude::*;

    fn toggle_event() -> impl Strategy<Value = ToggleEvent> {
        let names = || prop::sample::select(vec!["Dakar", "Thiès", "Centre", "Mbour"]);
        prop_oneof![
            prop::sample::select(vec![SENEGAL, "Mali"])
                .prop_map(|n| ToggleEvent::Country { name: n.into() }),
            names().prop_map(|n| ToggleEvent::Region { name: n.into() }),
            (names(), names()).prop_map(|(n, r)| ToggleEvent::Department {
                name: n.into(),
                parent_name: r.into(),
            }),
            (names(), names(), names()).prop_map(|(n, d, r)| ToggleEvent::Municipality {
                name: n.into(),
                parent_name: d.into(),
                region: r.into(),
            }),
        ]
    }

    fn run(events: &[ToggleEvent]) -> Vec<ZoneNode> {
        events
            .iter()
            .fold(Vec::new(), |zones, e| apply_toggle(&zones, e))
    }

    proptest! {
        /// Any region implies Sénégal.
        #[test]
        fn region_implies_senegal(events in prop::collection::vec(toggle_event(), 0..30)) {
            let zones = run(&events);
            if zones.iter().any(|z| z.zone_type == ZoneType::Region) {
                prop_assert!(zones.iter().any(ZoneNode::is_senegal));
            }
        }

        /// No toggle sequence produces a duplicate tuple.
        #[test]
        fn no_duplicate_tuples(events in prop::collection::vec(toggle_event(), 0..30)) {
            let zones = run(&events);
            prop_assert_eq!(keys(&zones).len(), zones.len());
        }

        /// Every department names a present region; every municipality a
        /// present department.
        #[test]
        fn parents_are_present(events in prop::collection::vec(toggle_event(), 0..30)) {
            let zones = run(&events);
            for z in &zones {
                let parent_type = match z.zone_type {
                    ZoneType::Department => ZoneType::Region,
                    ZoneType::Municipality => ZoneType::Department,
                    _ => continue,
                };
                let parent = z.parent_name.as_deref().unwrap_or_default();
                prop_assert!(zones.iter().any(|p| p.is(parent_type, parent)), "orphan {}", z.key());
            }
        }

        /// Toggling the same event twice from a state where it was absent
        /// returns the original list.
        #[test]
        fn select_then_deselect_leaf_is_identity(
            events in prop::collection::vec(toggle_event(), 0..20),
            name in prop::sample::select(vec!["Ndiaye", "Keur"]),
        ) {
            let zones = run(&events);
            let leaf = ToggleEvent::Country { name: name.into() };
            let back = apply_toggle(&apply_toggle(&zones, &leaf), &leaf);
            prop_assert_eq!(back, zones);
        }
    }
}
