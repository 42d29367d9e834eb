/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The topology reconciler: diffs incoming snapshots against the registries
//! and drives a visual sink with the minimal set of create/update/remove
//! operations.
//!
//! One reconciler exists per view; each owns its sink and its registries.
//! Processing is synchronous and runs to completion, so a snapshot is either
//! fully applied or (when rejected at the parse layer) not applied at all.

use log::{debug, warn};
use std::collections::HashSet;

use super::circles::CircleTracker;
use super::links::{canonical_key, LinkChange, LinkRegistry};
use super::nodes::NodeRegistry;
use super::snapshot::TopoSnapshot;
use super::{NodeKind, TopoError};
use crate::sink::VisualSink;

pub struct Reconciler<S: VisualSink> {
    nodes: NodeRegistry,
    links: LinkRegistry,
    circles: CircleTracker,
    sink: S,
}

impl<S: VisualSink> Reconciler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            nodes: NodeRegistry::new(),
            links: LinkRegistry::new(),
            circles: CircleTracker::new(),
            sink,
        }
    }

    /// Reconciler with a fixed jitter seed, for reproducible placement.
    pub fn with_seed(sink: S, seed: u64) -> Self {
        Self {
            nodes: NodeRegistry::with_seed(seed),
            links: LinkRegistry::new(),
            circles: CircleTracker::new(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.has(name)
    }

    pub fn has_link(&self, key: &str) -> bool {
        self.links.has(key)
    }

    pub fn node(&self, name: &str) -> Option<&super::Node> {
        self.nodes.get(name)
    }

    pub fn link(&self, key: &str) -> Option<&super::links::Link> {
        self.links.get(key)
    }

    /// Apply a full topology snapshot.
    ///
    /// Nodes are diffed first so that the link pass only ever references
    /// identities already reflecting the snapshot; then links are diffed and
    /// stale ones swept.
    pub fn apply(&mut self, snapshot: &TopoSnapshot) {
        self.diff_nodes(snapshot);
        self.diff_links(snapshot);
    }

    /// Anchor a new virtual host to a known switch, next to it on the map,
    /// and make sure the switch shows its host indicator circle.
    pub fn attach_host(&mut self, host: &str, switch: &str) -> Result<(), TopoError> {
        if self.nodes.has(host) {
            return Err(TopoError::DuplicateNode(host.to_string()));
        }
        let center = match self.nodes.get(switch) {
            Some(anchor) => anchor.position,
            None => return Err(TopoError::UnknownSwitch(switch.to_string())),
        };

        let shifted = self.nodes.shifted_near(center);
        let node = self.nodes.create(
            host,
            shifted.lat,
            shifted.lng,
            NodeKind::Host,
            false,
            true,
            None,
        )?;
        let (position, icon, color) = (node.position, node.icon(), node.display_color());
        self.sink.create_node(host, position, icon, color, host, None);

        self.circles.associate(host, switch);
        if self.circles.ensure_circle(switch) {
            self.sink.create_circle(switch, center);
        }
        Ok(())
    }

    /// Remove a node together with its links, attached virtual hosts and
    /// indicator circle, mirroring every step to the sink.
    pub fn remove_node(&mut self, name: &str) {
        let Some(node) = self.nodes.get(name) else {
            warn!("{name} not found");
            return;
        };
        let (kind, standalone) = (node.kind, node.standalone);

        self.remove_links_touching(name);

        match kind {
            NodeKind::Switch => {
                let attached = self.circles.hosts_of(name);
                let had_virtual_hosts = !attached.is_empty();
                for host in attached {
                    self.remove_links_touching(&host);
                    self.circles.remove_association(&host);
                    self.nodes.remove(&host);
                    self.sink.remove_node(&host);
                }
                if had_virtual_hosts {
                    match self.circles.remove_circle(name) {
                        Ok(()) => self.sink.remove_circle(name),
                        Err(e) => warn!("{e}"),
                    }
                }
                self.nodes.remove(name);
                self.sink.remove_node(name);
            }
            NodeKind::Host if standalone => {
                self.nodes.remove(name);
                self.sink.remove_node(name);
            }
            NodeKind::Host => {
                self.nodes.remove(name);
                self.sink.remove_node(name);
                if let Some(anchor) = self.circles.remove_association(name) {
                    if !self.circles.has_hosts(&anchor) {
                        match self.circles.remove_circle(&anchor) {
                            Ok(()) => self.sink.remove_circle(&anchor),
                            Err(e) => warn!("{e}"),
                        }
                    }
                }
            }
        }
    }

    fn diff_nodes(&mut self, snapshot: &TopoSnapshot) {
        // Union of snapshot names and currently known names; the three
        // per-name cases (update, create, remove) are mutually exclusive.
        let mut names: Vec<String> = snapshot.switches.keys().cloned().collect();
        names.extend(
            self.nodes
                .names()
                .filter(|n| !snapshot.switches.contains_key(*n))
                .cloned(),
        );

        for name in names {
            match snapshot.switches.get(&name) {
                Some(incoming) if self.nodes.has(&name) => {
                    let moved = self
                        .nodes
                        .update_position(&name, incoming.latitude, incoming.longitude);
                    let hint = incoming.hint();
                    let hint_changed = self.nodes.set_layout_hint(&name, hint);
                    if moved.is_some() || hint_changed {
                        if let Some(node) = self.nodes.get(&name) {
                            let position = node.position;
                            self.sink.update_node(&name, position, hint);
                        }
                    }
                }
                Some(incoming) => {
                    let (kind, standalone, is_virtual) = incoming.kind();
                    let label = incoming.label.clone().unwrap_or_else(|| name.clone());
                    let hint = incoming.hint();
                    match self.nodes.create(
                        &name,
                        incoming.latitude,
                        incoming.longitude,
                        kind,
                        standalone,
                        is_virtual,
                        hint,
                    ) {
                        Ok(node) => {
                            let (position, icon, color) =
                                (node.position, node.icon(), node.display_color());
                            self.sink.create_node(&name, position, icon, color, &label, hint);
                        }
                        Err(e) => warn!("skipping node {name}: {e}"),
                    }
                }
                None => {
                    // A removed-switch cascade earlier in this loop may have
                    // taken the node with it already.
                    let Some(node) = self.nodes.get(&name) else {
                        continue;
                    };

                    // Virtual hosts anchored to a surviving switch are not
                    // part of the snapshot's switch set; they live and die
                    // with their anchor instead.
                    if node.is_virtual && !node.standalone {
                        if let Some(anchor) = self.circles.anchor_of(&name) {
                            if snapshot.switches.contains_key(anchor) {
                                continue;
                            }
                        }
                    }

                    debug!("remove {name}");
                    self.remove_node(&name);
                }
            }
        }
    }

    fn diff_links(&mut self, snapshot: &TopoSnapshot) {
        let mut dead: HashSet<String> = self.links.keys().cloned().collect();

        for edge in &snapshot.links {
            let (a, b) = (edge.a(), edge.b());
            // Nodes were diffed first, but a malformed snapshot can still
            // reference names it never declared; such edges are skipped.
            if !self.nodes.has(a) || !self.nodes.has(b) {
                debug!("skipping link {a} {b}: unknown endpoint");
                continue;
            }

            let key = canonical_key(a, b);
            let existed = self.links.has(&key);
            if existed {
                dead.remove(&key);
            }

            let (change, link) = self.links.upsert(a, b, edge.load());
            if existed {
                if change == LinkChange::Updated {
                    let (color, label) = (link.color.clone(), link.label.clone());
                    self.sink.update_link(&key, &color, &label);
                }
            } else {
                let (first, second) = link.sorted_endpoints();
                let (first, second) = (first.to_string(), second.to_string());
                let (color, label) = (link.color.clone(), link.label.clone());
                let label_position = match (self.nodes.get(a), self.nodes.get(b)) {
                    (Some(na), Some(nb)) => na.position.midpoint(nb.position),
                    _ => continue,
                };
                self.sink
                    .create_link(&first, &second, &color, &label, label_position);
            }
        }

        // Whatever is left was not reported any more.
        for key in dead {
            let Some(link) = self.links.remove(&key) else {
                continue;
            };
            self.sink.remove_link(&key);

            for endpoint in [&link.endpoint_a, &link.endpoint_b] {
                let is_switch = self
                    .nodes
                    .get(endpoint)
                    .is_some_and(|n| n.kind == NodeKind::Switch);
                if is_switch && self.circles.release_circle_if_unused(endpoint) {
                    self.sink.remove_circle(endpoint);
                }
            }
        }
    }

    fn remove_links_touching(&mut self, name: &str) {
        let touching: Vec<String> = self
            .links
            .iter()
            .filter(|l| l.endpoint_a == name || l.endpoint_b == name)
            .map(|l| l.key())
            .collect();
        for key in touching {
            self.links.remove(&key);
            self.sink.remove_link(&key);
        }
    }
}
