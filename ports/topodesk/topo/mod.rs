/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Topology domain model.
//!
//! Core structures:
//! - `Node`: a switch or host with corrected and original geographic positions
//! - `LatLng`: geographic position in degrees
//! - `TopoError`: error taxonomy shared by the registries and the reconciler

use euclid::default::Point2D;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod circles;
pub mod links;
pub mod nodes;
pub mod reconciler;
pub mod snapshot;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Midpoint between two positions, used for link label placement.
    pub fn midpoint(self, other: LatLng) -> LatLng {
        LatLng::new((self.lat + other.lat) / 2.0, (self.lng + other.lng) / 2.0)
    }
}

/// What a node is, topologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Switch,
    Host,
}

/// Marker icon variant shown for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeIcon {
    Router,
    Host,
    VirtualHost,
}

impl NodeIcon {
    /// Icon asset name for the map view.
    pub fn asset_name(self) -> &'static str {
        match self {
            NodeIcon::Router => "router.png",
            NodeIcon::Host => "host.png",
            NodeIcon::VirtualHost => "virtual_host.png",
        }
    }
}

/// A topological node owned by the node registry.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique name, the registry key
    pub name: String,

    /// Jitter-corrected position shown on the map
    pub position: LatLng,

    /// Position as last reported by a snapshot, before correction
    pub original_position: LatLng,

    /// Switch or host
    pub kind: NodeKind,

    /// Standalone hosts are not anchored to a switch's indicator circle
    pub standalone: bool,

    /// Virtual hosts (VMs simulated on a switch) get their own icon and color
    pub is_virtual: bool,

    /// Optional force-layout seed carried through from the snapshot
    pub layout_hint: Option<Point2D<f32>>,
}

impl Node {
    /// Icon variant derived from kind and virtualness.
    pub fn icon(&self) -> NodeIcon {
        match (self.kind, self.is_virtual) {
            (NodeKind::Switch, _) => NodeIcon::Router,
            (NodeKind::Host, true) => NodeIcon::VirtualHost,
            (NodeKind::Host, false) => NodeIcon::Host,
        }
    }

    /// Display color used by the force-graph view.
    pub fn display_color(&self) -> &'static str {
        match (self.kind, self.is_virtual) {
            (NodeKind::Switch, _) => "#000000",
            (NodeKind::Host, true) => "#00FFFF",
            (NodeKind::Host, false) => "#EB6841",
        }
    }
}

/// Errors raised by the registries and snapshot handling.
///
/// All of these are local and recoverable: a failed operation is logged and
/// skipped, it never poisons registry state for later snapshots.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopoError {
    /// `create` was called for a name that is already registered.
    #[error("a node named `{0}` already exists")]
    DuplicateNode(String),

    /// `remove_circle` was called for a switch without an active circle.
    #[error("switch `{0}` does not have any active host circle")]
    NoCircle(String),

    /// A snapshot payload did not have the expected shape. The whole
    /// snapshot is dropped before any registry mutation.
    #[error("snapshot rejected: {0}")]
    MalformedSnapshot(String),

    /// `attach_host` referenced a switch that is not registered.
    #[error("corresponding switch `{0}` not found")]
    UnknownSwitch(String),
}
