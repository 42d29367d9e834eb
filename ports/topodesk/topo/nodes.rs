/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Node registry: owns every known topological node, keyed by name.
//!
//! Coordinate-collision correction lives here: when a requested position
//! exactly matches an existing node's corrected position, a small random
//! offset is added so markers never fully overlap. The uncorrected position
//! is kept alongside for snapshot diffing.

use euclid::default::Point2D;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::{LatLng, Node, NodeKind, TopoError};

/// Registry of known nodes, keyed by unique name.
pub struct NodeRegistry {
    nodes: HashMap<String, Node>,
    rng: StdRng,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Registry with a fixed random source, so jitter is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            nodes: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    /// All switch nodes.
    pub fn switches(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter(|n| n.kind == NodeKind::Switch)
    }

    /// All host nodes, standalone or not.
    pub fn hosts(&self) -> impl Iterator<Item = &Node> {
        self.iter().filter(|n| n.kind == NodeKind::Host)
    }

    /// Insert a new node at the given reported position.
    ///
    /// The stored position is jitter-corrected; `original_position` keeps the
    /// reported coordinates. Creation is not idempotent: a duplicate name is
    /// an error and the caller is expected to have checked `has` first.
    pub fn create(
        &mut self,
        name: &str,
        lat: f64,
        lng: f64,
        kind: NodeKind,
        standalone: bool,
        is_virtual: bool,
        layout_hint: Option<Point2D<f32>>,
    ) -> Result<&Node, TopoError> {
        if self.nodes.contains_key(name) {
            return Err(TopoError::DuplicateNode(name.to_string()));
        }

        let corrected = self.corrected_coords(lat, lng);
        let node = Node {
            name: name.to_string(),
            position: corrected,
            original_position: LatLng::new(lat, lng),
            kind,
            standalone,
            is_virtual,
            layout_hint,
        };
        Ok(self.nodes.entry(name.to_string()).or_insert(node))
    }

    /// Move a node to a newly reported position.
    ///
    /// Compares against the node's *original* position: the stored corrected
    /// coordinates may have been jittered, so comparing against them would
    /// re-jitter a node that never actually moved. Returns the new corrected
    /// position, or `None` when the report matches the last one (no-op).
    pub fn update_position(&mut self, name: &str, lat: f64, lng: f64) -> Option<LatLng> {
        let reported = LatLng::new(lat, lng);
        match self.nodes.get(name) {
            Some(node) if node.original_position == reported => return None,
            Some(_) => {}
            None => return None,
        }

        let corrected = self.corrected_coords(lat, lng);
        let node = self.nodes.get_mut(name)?;
        node.original_position = reported;
        node.position = corrected;
        Some(corrected)
    }

    /// Replace a node's force-layout hint. Returns true when it changed.
    pub fn set_layout_hint(&mut self, name: &str, hint: Option<Point2D<f32>>) -> bool {
        match self.nodes.get_mut(name) {
            Some(node) if node.layout_hint != hint => {
                node.layout_hint = hint;
                true
            }
            _ => false,
        }
    }

    /// Delete a node. Dependent links and circles are the caller's problem;
    /// the registry does not cascade.
    pub fn remove(&mut self, name: &str) -> Option<Node> {
        self.nodes.remove(name)
    }

    /// Position near `origin`, shifted by a random sub-degree offset on each
    /// axis. Used when placing a host next to its anchoring switch.
    pub fn shifted_near(&mut self, origin: LatLng) -> LatLng {
        let mut shift = || {
            let magnitude = round3(self.rng.random::<f64>() / 3.0);
            if self.rng.random::<f64>() < 0.5 {
                -magnitude
            } else {
                magnitude
            }
        };
        let lat = origin.lat + shift();
        let lng = origin.lng + shift();
        LatLng::new(lat, lng)
    }

    /// Collision-corrected coordinates: if any node already sits exactly at
    /// the requested corrected position, add an independent random fraction
    /// (three decimal places, under one degree) to both axes.
    fn corrected_coords(&mut self, lat: f64, lng: f64) -> LatLng {
        for node in self.nodes.values() {
            if node.position.lat == lat && node.position.lng == lng {
                let corrected = LatLng::new(
                    lat + round3(self.rng.random::<f64>()),
                    lng + round3(self.rng.random::<f64>()),
                );
                log::debug!(
                    "coordinates ({lat}, {lng}) corrected to ({}, {}) to avoid overlap",
                    corrected.lat,
                    corrected.lng
                );
                return corrected;
            }
        }
        LatLng::new(lat, lng)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NodeRegistry {
        NodeRegistry::with_seed(7)
    }

    #[test]
    fn test_create_and_get() {
        let mut reg = registry();
        reg.create("s1", 10.0, 20.0, NodeKind::Switch, true, false, None)
            .unwrap();

        let node = reg.get("s1").unwrap();
        assert_eq!(node.kind, NodeKind::Switch);
        assert_eq!(node.position, LatLng::new(10.0, 20.0));
        assert_eq!(node.original_position, LatLng::new(10.0, 20.0));
        assert!(reg.has("s1"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_create_duplicate_fails() {
        let mut reg = registry();
        reg.create("s1", 0.0, 0.0, NodeKind::Switch, true, false, None)
            .unwrap();

        let err = reg
            .create("s1", 1.0, 1.0, NodeKind::Switch, true, false, None)
            .unwrap_err();
        assert_eq!(err, TopoError::DuplicateNode("s1".to_string()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_collision_jitters_corrected_only() {
        let mut reg = registry();
        reg.create("s1", 5.0, 5.0, NodeKind::Switch, true, false, None)
            .unwrap();
        reg.create("s2", 5.0, 5.0, NodeKind::Switch, true, false, None)
            .unwrap();

        let s1 = reg.get("s1").unwrap();
        let s2 = reg.get("s2").unwrap();
        assert_ne!(s1.position, s2.position);

        // Original coordinates are preserved untouched for future diffing.
        assert_eq!(s2.original_position, LatLng::new(5.0, 5.0));

        // Correction is bounded: strictly less than one degree per axis.
        assert!((s2.position.lat - 5.0).abs() < 1.0);
        assert!((s2.position.lng - 5.0).abs() < 1.0);
    }

    #[test]
    fn test_collision_deterministic_with_seed() {
        let place = |seed: u64| {
            let mut reg = NodeRegistry::with_seed(seed);
            reg.create("a", 1.0, 1.0, NodeKind::Switch, true, false, None)
                .unwrap();
            reg.create("b", 1.0, 1.0, NodeKind::Switch, true, false, None)
                .unwrap();
            reg.get("b").unwrap().position
        };
        assert_eq!(place(42), place(42));
    }

    #[test]
    fn test_update_position_noop_on_same_report() {
        let mut reg = registry();
        reg.create("other", 3.0, 4.0, NodeKind::Switch, true, false, None)
            .unwrap();
        reg.create("s1", 1.0, 2.0, NodeKind::Switch, true, false, None)
            .unwrap();

        // Move onto the other node's position: the stored coordinates get
        // jittered, but the original is the reported value.
        assert!(reg.update_position("s1", 3.0, 4.0).is_some());
        let after_first = reg.get("s1").unwrap().position;
        assert_ne!(after_first, LatLng::new(3.0, 4.0));

        // Reporting the same position again must not re-jitter.
        assert!(reg.update_position("s1", 3.0, 4.0).is_none());
        assert_eq!(reg.get("s1").unwrap().position, after_first);
    }

    #[test]
    fn test_update_position_unknown_node() {
        let mut reg = registry();
        assert!(reg.update_position("ghost", 0.0, 0.0).is_none());
    }

    #[test]
    fn test_update_position_moves_node() {
        let mut reg = registry();
        reg.create("s1", 1.0, 2.0, NodeKind::Switch, true, false, None)
            .unwrap();

        let moved = reg.update_position("s1", 9.0, 9.0).unwrap();
        assert_eq!(moved, LatLng::new(9.0, 9.0));
        let node = reg.get("s1").unwrap();
        assert_eq!(node.original_position, LatLng::new(9.0, 9.0));
        assert_eq!(node.position, LatLng::new(9.0, 9.0));
    }

    #[test]
    fn test_set_layout_hint() {
        let mut reg = registry();
        reg.create("s1", 0.0, 0.0, NodeKind::Switch, true, false, None)
            .unwrap();

        let hint = Some(Point2D::new(10.0, 20.0));
        assert!(reg.set_layout_hint("s1", hint));
        assert!(!reg.set_layout_hint("s1", hint));
        assert_eq!(reg.get("s1").unwrap().layout_hint, hint);
    }

    #[test]
    fn test_remove() {
        let mut reg = registry();
        reg.create("s1", 0.0, 0.0, NodeKind::Switch, true, false, None)
            .unwrap();
        assert!(reg.remove("s1").is_some());
        assert!(reg.remove("s1").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn test_switch_and_host_census() {
        let mut reg = registry();
        reg.create("s1", 0.0, 0.0, NodeKind::Switch, true, false, None)
            .unwrap();
        reg.create("s2", 1.0, 0.0, NodeKind::Switch, true, false, None)
            .unwrap();
        reg.create("h1", 2.0, 0.0, NodeKind::Host, true, false, None)
            .unwrap();

        assert_eq!(reg.switches().count(), 2);
        assert_eq!(reg.hosts().count(), 1);
    }

    #[test]
    fn test_shifted_near_stays_close() {
        let mut reg = registry();
        let shifted = reg.shifted_near(LatLng::new(50.0, 8.0));
        assert!((shifted.lat - 50.0).abs() < 1.0 / 3.0 + f64::EPSILON);
        assert!((shifted.lng - 8.0).abs() < 1.0 / 3.0 + f64::EPSILON);
    }
}
