/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Force-directed graph sink backed by petgraph::StableGraph.
//!
//! Maintains an undirected graph mirroring the reconciler's state, with
//! name-to-index and key-to-index maps for incremental updates. Node
//! positions start from the snapshot's layout hint (or a flat projection of
//! the geographic position) and are then relaxed by the layout engine.

use euclid::default::{Point2D, Vector2D};
use log::warn;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use std::collections::HashMap;

use super::VisualSink;
use crate::physics::LayoutEngine;
use crate::topo::links::LoadLabel;
use crate::topo::{LatLng, NodeIcon};

/// Pixels per degree when seeding positions from geography.
const DEGREE_SCALE: f32 = 10.0;

/// A node in the force-directed view.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub label: String,
    pub color: String,
    pub position: Point2D<f32>,
    pub velocity: Vector2D<f32>,
}

/// An edge in the force-directed view.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub key: String,
    pub color: String,
    pub label: String,
}

/// The graph structure the layout engine relaxes.
pub type TopoGraph = StableGraph<GraphNode, GraphEdge, Undirected>;

pub struct GraphSink {
    graph: TopoGraph,
    name_to_node: HashMap<String, NodeIndex>,
    key_to_edge: HashMap<String, EdgeIndex>,
    layout: LayoutEngine,
}

impl GraphSink {
    pub fn new() -> Self {
        Self {
            graph: TopoGraph::default(),
            name_to_node: HashMap::new(),
            key_to_edge: HashMap::new(),
            layout: LayoutEngine::default(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.name_to_node
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn edge(&self, key: &str) -> Option<&GraphEdge> {
        self.key_to_edge
            .get(key)
            .and_then(|&idx| self.graph.edge_weight(idx))
    }

    pub fn graph(&self) -> &TopoGraph {
        &self.graph
    }

    /// Run one layout timestep.
    pub fn step_layout(&mut self, dt: f32) {
        self.layout.step(&mut self.graph, dt);
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    fn project(position: LatLng) -> Point2D<f32> {
        // Flat projection, longitude east and latitude up (screen y down).
        Point2D::new(
            position.lng as f32 * DEGREE_SCALE,
            -(position.lat as f32) * DEGREE_SCALE,
        )
    }
}

impl Default for GraphSink {
    fn default() -> Self {
        Self::new()
    }
}

impl VisualSink for GraphSink {
    fn create_node(
        &mut self,
        name: &str,
        position: LatLng,
        _icon: NodeIcon,
        color: &str,
        label: &str,
        hint: Option<Point2D<f32>>,
    ) {
        let seed = hint.unwrap_or_else(|| Self::project(position));
        let idx = self.graph.add_node(GraphNode {
            name: name.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            position: seed,
            velocity: Vector2D::zero(),
        });
        self.name_to_node.insert(name.to_string(), idx);
        self.layout.wake();
    }

    fn update_node(&mut self, name: &str, _position: LatLng, hint: Option<Point2D<f32>>) {
        // Geographic moves do not teleport the force layout; only an
        // explicit hint repositions the node here.
        let Some(&idx) = self.name_to_node.get(name) else {
            warn!("update for unknown graph node {name}");
            return;
        };
        if let (Some(hint), Some(node)) = (hint, self.graph.node_weight_mut(idx)) {
            node.position = hint;
            node.velocity = Vector2D::zero();
            self.layout.wake();
        }
    }

    fn remove_node(&mut self, name: &str) {
        let Some(idx) = self.name_to_node.remove(name) else {
            return;
        };
        // StableGraph drops incident edges with the node; forget their keys
        // too so the edge map never holds dangling indices.
        let incident: Vec<String> = self
            .graph
            .edges(idx)
            .map(|edge| edge.weight().key.clone())
            .collect();
        for key in incident {
            self.key_to_edge.remove(&key);
        }
        self.graph.remove_node(idx);
        self.layout.wake();
    }

    fn create_link(
        &mut self,
        a: &str,
        b: &str,
        color: &str,
        label: &LoadLabel,
        _label_position: LatLng,
    ) {
        let (Some(&ia), Some(&ib)) = (self.name_to_node.get(a), self.name_to_node.get(b)) else {
            warn!("link {a} {b} references an unknown graph node");
            return;
        };
        let key = crate::topo::links::canonical_key(a, b);
        let idx = self.graph.add_edge(
            ia,
            ib,
            GraphEdge {
                key: key.clone(),
                color: color.to_string(),
                label: label.to_string(),
            },
        );
        self.key_to_edge.insert(key, idx);
        self.layout.wake();
    }

    fn update_link(&mut self, key: &str, color: &str, label: &LoadLabel) {
        let Some(&idx) = self.key_to_edge.get(key) else {
            warn!("update for unknown graph edge {key}");
            return;
        };
        if let Some(edge) = self.graph.edge_weight_mut(idx) {
            edge.color = color.to_string();
            edge.label = label.to_string();
        }
    }

    fn remove_link(&mut self, key: &str) {
        if let Some(idx) = self.key_to_edge.remove(key) {
            self.graph.remove_edge(idx);
            self.layout.wake();
        }
    }

    fn create_circle(&mut self, _switch: &str, _center: LatLng) {
        // The force view has no indicator circles; virtual hosts are already
        // distinguished by color.
    }

    fn remove_circle(&mut self, _switch: &str) {}
}
