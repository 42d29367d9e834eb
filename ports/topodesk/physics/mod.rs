/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Force-directed layout for the graph view.
//!
//! Uses:
//! - Spatial hash grid for O(n) average-case repulsion
//! - Hooke's law springs on edges
//! - Velocity damping
//! - Auto-pause on convergence

use euclid::default::Vector2D;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::physics::spatial::SpatialGrid;
use crate::sink::graph::TopoGraph;

pub mod spatial;

/// Maximum distance at which node repulsion applies.
const REPULSION_RANGE: f32 = 300.0;

/// Layout engine configuration
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Repulsion strength between nodes
    pub repulsion_strength: f32,

    /// Spring strength for edges (Hooke's law)
    pub spring_strength: f32,

    /// Velocity damping factor (0.0 - 1.0)
    pub damping: f32,

    /// Ideal spring length for edges
    pub spring_rest_length: f32,

    /// Velocity threshold for auto-pause (px/frame)
    pub velocity_threshold: f32,

    /// Time to wait at low velocity before pausing (seconds)
    pub pause_delay: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: 5000.0,
            spring_strength: 0.1,
            damping: 0.92,
            spring_rest_length: 100.0,
            velocity_threshold: 0.001,
            pause_delay: 5.0,
        }
    }
}

/// Layout simulation state
pub struct LayoutEngine {
    pub config: LayoutConfig,
    grid: SpatialGrid,
    pub is_running: bool,
    low_velocity_time: f32,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let cell_size = REPULSION_RANGE;
        Self {
            config,
            grid: SpatialGrid::new(cell_size),
            is_running: true,
            low_velocity_time: 0.0,
        }
    }

    /// Restart the simulation after a structural change.
    pub fn wake(&mut self) {
        self.is_running = true;
        self.low_velocity_time = 0.0;
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    /// Run one layout timestep over the graph.
    pub fn step(&mut self, graph: &mut TopoGraph, dt: f32) {
        if !self.is_running {
            return;
        }

        self.grid.clear();
        for idx in graph.node_indices() {
            if let Some(node) = graph.node_weight(idx) {
                self.grid.insert(idx, node.position);
            }
        }

        let indices: Vec<NodeIndex> = graph.node_indices().collect();

        for &idx in &indices {
            let Some(node) = graph.node_weight(idx) else {
                continue;
            };
            let position = node.position;
            let mut force = Vector2D::zero();

            // Repulsion from nearby nodes (spatial hash optimization)
            for other_idx in self.grid.query_nearby(position) {
                if other_idx == idx {
                    continue;
                }
                if let Some(other) = graph.node_weight(other_idx) {
                    let delta = position - other.position;
                    let distance = delta.length();
                    if distance > 0.0 && distance < REPULSION_RANGE {
                        let repulsion = self.config.repulsion_strength / (distance * distance);
                        force += delta.normalize() * repulsion;
                    }
                }
            }

            // Attraction along incident edges (Hooke's law)
            for edge in graph.edges(idx) {
                let other_idx = if edge.source() == idx {
                    edge.target()
                } else {
                    edge.source()
                };
                if let Some(other) = graph.node_weight(other_idx) {
                    let delta = other.position - position;
                    let distance = delta.length();
                    if distance > 0.0 {
                        let displacement = distance - self.config.spring_rest_length;
                        force +=
                            delta.normalize() * (self.config.spring_strength * displacement);
                    }
                }
            }

            if let Some(node) = graph.node_weight_mut(idx) {
                node.velocity += force * dt;
                node.velocity *= self.config.damping;
            }
        }

        // Integrate positions
        let mut max_velocity = 0.0_f32;
        for &idx in &indices {
            if let Some(node) = graph.node_weight_mut(idx) {
                node.position += node.velocity * dt;
                max_velocity = max_velocity.max(node.velocity.length());
            }
        }

        // Auto-pause detection
        if max_velocity < self.config.velocity_threshold {
            self.low_velocity_time += dt;
            if self.low_velocity_time >= self.config.pause_delay {
                self.is_running = false;
            }
        } else {
            self.low_velocity_time = 0.0;
        }
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
