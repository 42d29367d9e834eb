/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Spatial hash grid for O(n) average-case neighbor queries.
//!
//! Used by the layout engine to find nearby nodes without checking all
//! pairs (which would be O(n²)).

use euclid::default::Point2D;
use petgraph::stable_graph::NodeIndex;
use std::collections::HashMap;

/// Spatial hash grid for efficient neighbor queries
pub struct SpatialGrid {
    cell_size: f32,

    /// Grid cells: (x, y) -> list of nodes in that cell
    cells: HashMap<(i32, i32), Vec<NodeIndex>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, idx: NodeIndex, position: Point2D<f32>) {
        let cell = self.position_to_cell(position);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// All nodes in the same cell and the eight adjacent cells.
    pub fn query_nearby(&self, position: Point2D<f32>) -> Vec<NodeIndex> {
        let center = self.position_to_cell(position);
        let mut nearby = Vec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                let cell = (center.0 + dx, center.1 + dy);
                if let Some(nodes) = self.cells.get(&cell) {
                    nearby.extend_from_slice(nodes);
                }
            }
        }

        nearby
    }

    fn position_to_cell(&self, position: Point2D<f32>) -> (i32, i32) {
        let x = (position.x / self.cell_size).floor() as i32;
        let y = (position.y / self.cell_size).floor() as i32;
        (x, y)
    }
}
