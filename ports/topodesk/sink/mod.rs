/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Visual backend contract.
//!
//! The reconciler drives a sink through create/update/remove calls; the sink
//! owns only the rendered representations and is never consulted as a source
//! of truth. Sinks must not call back into the reconciler.

use euclid::default::Point2D;

use crate::topo::links::LoadLabel;
use crate::topo::{LatLng, NodeIcon};

pub mod graph;
pub mod map;

pub trait VisualSink {
    fn create_node(
        &mut self,
        name: &str,
        position: LatLng,
        icon: NodeIcon,
        color: &str,
        label: &str,
        hint: Option<Point2D<f32>>,
    );

    fn update_node(&mut self, name: &str, position: LatLng, hint: Option<Point2D<f32>>);

    fn remove_node(&mut self, name: &str);

    fn create_link(
        &mut self,
        a: &str,
        b: &str,
        color: &str,
        label: &LoadLabel,
        label_position: LatLng,
    );

    fn update_link(&mut self, key: &str, color: &str, label: &LoadLabel);

    fn remove_link(&mut self, key: &str);

    fn create_circle(&mut self, switch: &str, center: LatLng);

    fn remove_circle(&mut self, switch: &str);
}
