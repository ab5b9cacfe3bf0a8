//! # Editing Session — Stable Local Keys
//!
//! The flat list refers to parents by name, so renaming a region silently
//! orphans its departments. `ZoneSession` holds the same hierarchy as a tree
//! whose nodes reference their parent by [`LocalKey`], a monotonic counter
//! assigned when the node enters the session. Names are display attributes
//! only.
//!
//! The session applies the cascade rules of [`crate::cascade`] (ancestors on
//! select, descendants on deselect) and exports to the flat list on demand;
//! the resolver still consumes the flat list.
//!
//! Keys are never reused within a session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ngoreg_core::{DuplicateZoneError, ZoneNode, ZoneType, SENEGAL};

use crate::naming::find_name_collisions;
use crate::validate::find_duplicates;

/// Session-scoped identity of an editing-time node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalKey(u64);

impl std::fmt::Display for LocalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "local:{}", self.0)
    }
}

/// A node of the editing tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNode {
    pub key: LocalKey,
    pub zone_type: ZoneType,
    pub name: String,
    pub parent: Option<LocalKey>,
    /// Parent name carried over from an imported list when it matched no node.
    pub detached_parent: Option<String>,
}

/// Errors raised by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unknown session key {0}")]
    UnknownKey(LocalKey),

    #[error("{key} is a {actual}, expected a {expected}")]
    WrongLevel {
        key: LocalKey,
        expected: ZoneType,
        actual: ZoneType,
    },

    #[error("a {zone_type} named '{name}' already exists in this scope")]
    NameTaken { zone_type: ZoneType, name: String },

    #[error(transparent)]
    Duplicate(#[from] DuplicateZoneError),
}

/// Editing-time zone tree keyed by [`LocalKey`].
#[derive(Debug, Clone, Default)]
pub struct ZoneSession {
    next_key: u64,
    nodes: BTreeMap<LocalKey, SessionNode>,
}

impl ZoneSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a flat list, linking each node to its parent by name.
    ///
    /// Nodes whose parent cannot be found keep the declared name in
    /// `detached_parent` so the export reproduces the input.
    /// Duplicate tuples and stored-name collisions are rejected, so every
    /// parent name matches at most one node.
    pub fn from_flat(zones: &[ZoneNode]) -> Result<Self, SessionError> {
        let rejected = DuplicateZoneError {
            duplicates: find_duplicates(zones),
            collisions: find_name_collisions(zones),
        };
        if !rejected.is_empty() {
            return Err(rejected.into());
        }

        let mut session = Self::new();
        for level in ZoneType::ALL {
            for z in zones.iter().filter(|z| z.zone_type == level) {
                let parent = match level {
                    ZoneType::Country => None,
                    ZoneType::Region => session.find(ZoneType::Country, SENEGAL, None),
                    ZoneType::Department | ZoneType::Municipality => z
                        .parent_name
                        .as_deref()
                        .and_then(|p| session.find_by_name(level.parent_type()?, p)),
                };
                let detached_parent = match (level, parent) {
                    (ZoneType::Department | ZoneType::Municipality, None) => z.parent_name.clone(),
                    _ => None,
                };
                session.insert(level, &z.name, parent, detached_parent);
            }
        }
        Ok(session)
    }

    /// Export to the flat, name-keyed list, in key order.
    pub fn to_flat(&self) -> Vec<ZoneNode> {
        self.nodes
            .values()
            .map(|n| ZoneNode {
                zone_type: n.zone_type,
                name: n.name.clone(),
                parent_name: match n.zone_type {
                    ZoneType::Country | ZoneType::Region => None,
                    _ => n
                        .parent
                        .and_then(|p| self.nodes.get(&p))
                        .map(|p| p.name.clone())
                        .or_else(|| n.detached_parent.clone()),
                },
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: LocalKey) -> Option<&SessionNode> {
        self.nodes.get(&key)
    }

    /// Find a node by level, name and parent key.
    ///
    /// Regions are matched by name alone.
    pub fn find(&self, zone_type: ZoneType, name: &str, parent: Option<LocalKey>) -> Option<LocalKey> {
        self.nodes
            .values()
            .find(|n| {
                n.zone_type == zone_type
                    && n.name == name
                    && (matches!(zone_type, ZoneType::Country | ZoneType::Region)
                        || n.parent == parent)
            })
            .map(|n| n.key)
    }

    /// Direct children of `key`, in key order.
    pub fn children(&self, key: LocalKey) -> Vec<LocalKey> {
        self.nodes
            .values()
            .filter(|n| n.parent == Some(key))
            .map(|n| n.key)
            .collect()
    }

    /// Nodes without a parent key, in key order.
    pub fn roots(&self) -> Vec<LocalKey> {
        self.nodes
            .values()
            .filter(|n| n.parent.is_none())
            .map(|n| n.key)
            .collect()
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn select_country(&mut self, name: &str) -> LocalKey {
        match self.find(ZoneType::Country, name, None) {
            Some(key) => key,
            None => self.insert(ZoneType::Country, name, None, None),
        }
    }

    /// Select a region, selecting Sénégal first when absent.
    pub fn select_region(&mut self, name: &str) -> LocalKey {
        let country = self.select_country(SENEGAL);
        match self.find(ZoneType::Region, name, None) {
            Some(key) => key,
            None => self.insert(ZoneType::Region, name, Some(country), None),
        }
    }

    pub fn select_department(&mut self, region: LocalKey, name: &str) -> Result<LocalKey, SessionError> {
        self.expect_level(region, ZoneType::Region)?;
        Ok(match self.find(ZoneType::Department, name, Some(region)) {
            Some(key) => key,
            None => self.insert(ZoneType::Department, name, Some(region), None),
        })
    }

    pub fn select_municipality(
        &mut self,
        department: LocalKey,
        name: &str,
    ) -> Result<LocalKey, SessionError> {
        self.expect_level(department, ZoneType::Department)?;
        Ok(match self.find(ZoneType::Municipality, name, Some(department)) {
            Some(key) => key,
            None => self.insert(ZoneType::Municipality, name, Some(department), None),
        })
    }

    /// Select a full municipality path by names, creating missing ancestors.
    pub fn select_path(&mut self, region: &str, department: &str, municipality: &str) -> Result<LocalKey, SessionError> {
        let r = self.select_region(region);
        let d = self.select_department(r, department)?;
        self.select_municipality(d, municipality)
    }

    // ── Deselection ──────────────────────────────────────────────────

    /// Remove `key` and its whole subtree. Returns the removed keys.
    ///
    /// Deselecting Sénégal also removes regions imported without a parent.
    pub fn deselect(&mut self, key: LocalKey) -> Result<Vec<LocalKey>, SessionError> {
        let node = self.nodes.get(&key).ok_or(SessionError::UnknownKey(key))?;

        let removed: Vec<LocalKey> = if node.zone_type == ZoneType::Country && node.name == SENEGAL {
            self.nodes
                .values()
                .filter(|n| n.key == key || n.zone_type != ZoneType::Country)
                .map(|n| n.key)
                .collect()
        } else {
            let mut subtree = vec![key];
            let mut i = 0;
            while i < subtree.len() {
                subtree.extend(self.children(subtree[i]));
                i += 1;
            }
            subtree
        };

        for k in &removed {
            self.nodes.remove(k);
        }
        tracing::debug!(key = %key, removed = removed.len(), "deselect subtree");
        Ok(removed)
    }

    /// Rename a node. Children follow automatically.
    ///
    /// Nodes one level down whose detached parent name equals the new name
    /// are attached to the renamed node.
    pub fn rename(&mut self, key: LocalKey, name: &str) -> Result<(), SessionError> {
        let node = self.nodes.get(&key).ok_or(SessionError::UnknownKey(key))?;
        let (zone_type, parent) = (node.zone_type, node.parent);
        if let Some(existing) = self.find(zone_type, name, parent) {
            if existing != key {
                return Err(SessionError::NameTaken {
                    zone_type,
                    name: name.to_string(),
                });
            }
        }
        if let Some(node) = self.nodes.get_mut(&key) {
            node.name = name.to_string();
        }
        let attached = self.attach_detached(key, zone_type, name);
        if attached > 0 {
            tracing::debug!(key = %key, attached, "detached nodes attached on rename");
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn insert(
        &mut self,
        zone_type: ZoneType,
        name: &str,
        parent: Option<LocalKey>,
        detached_parent: Option<String>,
    ) -> LocalKey {
        let key = LocalKey(self.next_key);
        self.next_key += 1;
        self.nodes.insert(
            key,
            SessionNode {
                key,
                zone_type,
                name: name.to_string(),
                parent,
                detached_parent,
            },
        );
        key
    }

    fn attach_detached(&mut self, parent: LocalKey, parent_type: ZoneType, name: &str) -> usize {
        let mut attached = 0;
        for n in self.nodes.values_mut() {
            if n.parent.is_none()
                && n.zone_type.parent_type() == Some(parent_type)
                && n.detached_parent.as_deref() == Some(name)
            {
                n.parent = Some(parent);
                n.detached_parent = None;
                attached += 1;
            }
        }
        attached
    }

    fn find_by_name(&self, zone_type: ZoneType, name: &str) -> Option<LocalKey> {
        self.nodes
            .values()
            .find(|n| n.zone_type == zone_type && n.name == name)
            .map(|n| n.key)
    }

    fn expect_level(&self, key: LocalKey, expected: ZoneType) -> Result<(), SessionError> {
        let node = self.nodes.get(&key).ok_or(SessionError::UnknownKey(key))?;
        if node.zone_type != expected {
            return Err(SessionError::WrongLevel {
                key,
                expected,
                actual: node.zone_type,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::toggle_municipality;
    use std::collections::HashSet;

    fn set(zones: &[ZoneNode]) -> HashSet<ngoreg_core::ZoneKey> {
        zones.iter().map(ZoneNode::key).collect()
    }

    #[test]
    fn select_path_matches_flat_cascade() {
        let mut s = ZoneSession::new();
        s.select_path("Dakar", "Pikine", "Thiaroye").unwrap();
        let flat = toggle_municipality(&[], "Thiaroye", "Pikine", "Dakar");
        assert_eq!(s.to_flat(), flat);
    }

    #[test]
    fn keys_are_monotonic_and_never_reused() {
        let mut s = ZoneSession::new();
        let a = s.select_region("Dakar");
        s.deselect(a).unwrap();
        let b = s.select_region("Dakar");
        assert!(b > a);
    }

    #[test]
    fn selecting_twice_returns_the_same_key() {
        let mut s = ZoneSession::new();
        let r = s.select_region("Thiès");
        assert_eq!(s.select_region("Thiès"), r);
        let d = s.select_department(r, "Mbour").unwrap();
        assert_eq!(s.select_department(r, "Mbour").unwrap(), d);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn rename_department_carries_municipalities() {
        let mut s = ZoneSession::new();
        let r = s.select_region("Thiès");
        let d = s.select_department(r, "Mbour").unwrap();
        s.select_municipality(d, "Saly").unwrap();

        s.rename(d, "M'bour").unwrap();
        let flat = s.to_flat();
        assert!(flat.contains(&ZoneNode::department("M'bour", "Thiès")));
        assert!(flat.contains(&ZoneNode::municipality("Saly", "M'bour")));
    }

    #[test]
    fn rename_attaches_nodes_detached_under_the_new_name() {
        let mut s = ZoneSession::from_flat(&[
            ZoneNode::country(SENEGAL),
            ZoneNode::region("Thiès"),
            ZoneNode::department("Mbour", "Thies"),
            ZoneNode::municipality("Saly", "M'bour"),
            ZoneNode::municipality("Ndiass", "Thies"),
        ])
        .unwrap();
        let thies = s.find(ZoneType::Region, "Thiès", None).unwrap();
        s.rename(thies, "Thies").unwrap();

        let mbour = s.find(ZoneType::Department, "Mbour", Some(thies)).unwrap();
        assert_eq!(s.get(mbour).unwrap().detached_parent, None);
        s.rename(mbour, "M'bour").unwrap();
        assert_eq!(s.children(mbour).len(), 1);

        // A municipality never attaches to a region.
        let ndiass = s.find_by_name(ZoneType::Municipality, "Ndiass").unwrap();
        assert_eq!(s.get(ndiass).unwrap().parent, None);

        // Attached nodes follow later renames.
        s.rename(thies, "Thiès").unwrap();
        let flat = s.to_flat();
        assert!(flat.contains(&ZoneNode::department("M'bour", "Thiès")));
        assert!(flat.contains(&ZoneNode::municipality("Saly", "M'bour")));
        assert!(flat.contains(&ZoneNode::municipality("Ndiass", "Thies")));
    }

    #[test]
    fn rename_rejects_sibling_collision() {
        let mut s = ZoneSession::new();
        let r = s.select_region("Thiès");
        s.select_department(r, "Mbour").unwrap();
        let tivaouane = s.select_department(r, "Tivaouane").unwrap();
        let err = s.rename(tivaouane, "Mbour").unwrap_err();
        assert!(matches!(err, SessionError::NameTaken { .. }));
    }

    #[test]
    fn deselect_removes_subtree_not_ancestors() {
        let mut s = ZoneSession::new();
        let r = s.select_region("Dakar");
        let d = s.select_department(r, "Pikine").unwrap();
        s.select_municipality(d, "Thiaroye").unwrap();

        let removed = s.deselect(d).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(
            s.to_flat(),
            vec![ZoneNode::country(SENEGAL), ZoneNode::region("Dakar")]
        );
    }

    #[test]
    fn deselect_senegal_keeps_other_countries() {
        let mut s = ZoneSession::new();
        s.select_path("Dakar", "Pikine", "Thiaroye").unwrap();
        s.select_country("Gambie");
        let senegal = s.find(ZoneType::Country, SENEGAL, None).unwrap();
        s.deselect(senegal).unwrap();
        assert_eq!(s.to_flat(), vec![ZoneNode::country("Gambie")]);
    }

    #[test]
    fn wrong_level_is_rejected() {
        let mut s = ZoneSession::new();
        let r = s.select_region("Dakar");
        let err = s.select_municipality(r, "Pikine").unwrap_err();
        assert!(matches!(
            err,
            SessionError::WrongLevel {
                expected: ZoneType::Department,
                actual: ZoneType::Region,
                ..
            }
        ));
    }

    #[test]
    fn flat_import_export_preserves_the_set() {
        let flat = vec![
            ZoneNode::country(SENEGAL),
            ZoneNode::region("R"),
            ZoneNode::department("Alpha", "R"),
            ZoneNode::department("Beta", "R"),
            ZoneNode::municipality("Centre", "Alpha"),
            ZoneNode::municipality("Centre", "Beta"),
            ZoneNode::department("Orphan", "Nowhere"),
        ];
        let s = ZoneSession::from_flat(&flat).unwrap();
        assert_eq!(set(&s.to_flat()), set(&flat));
    }

    #[test]
    fn flat_import_rejects_duplicates() {
        let flat = vec![ZoneNode::region("R"), ZoneNode::region("R")];
        assert!(matches!(
            ZoneSession::from_flat(&flat),
            Err(SessionError::Duplicate(_))
        ));
    }

    #[test]
    fn roots_are_countries_and_detached_nodes() {
        let s = ZoneSession::from_flat(&[
            ZoneNode::country(SENEGAL),
            ZoneNode::region("Dakar"),
            ZoneNode::department("Mbour", "Thiès"),
        ])
        .unwrap();
        let names: Vec<&str> = s
            .roots()
            .into_iter()
            .filter_map(|k| s.get(k))
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec![SENEGAL, "Mbour"]);
    }
}
