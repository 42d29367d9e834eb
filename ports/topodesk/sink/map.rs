/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tile-map overlay sink: markers, polylines and host circles.
//!
//! Owns the rendered representations for the map view — where every marker
//! sits, what each polyline connects and what its label says. Painting is
//! someone else's job; this model is what a tile renderer draws from.

use euclid::default::Point2D;
use log::warn;
use std::collections::HashMap;

use super::VisualSink;
use crate::topo::links::{canonical_key, is_valid_color, LoadLabel};
use crate::topo::{LatLng, NodeIcon};

/// Host indicator circle appearance.
const CIRCLE_RADIUS_M: f64 = 40_000.0;
const CIRCLE_COLOR: &str = "#aa00aa";
const CIRCLE_FILL_COLOR: &str = "#00aa00";
const CIRCLE_FILL_OPACITY: f64 = 0.5;

/// Link color used when a caller hands over something unparsable.
const FALLBACK_LINK_COLOR: &str = "#000";

/// A node marker on the map.
#[derive(Debug, Clone)]
pub struct Marker {
    pub position: LatLng,
    pub icon: NodeIcon,
    pub popup: String,
}

/// A link polyline with its load label.
#[derive(Debug, Clone)]
pub struct Polyline {
    pub endpoint_a: String,
    pub endpoint_b: String,
    pub positions: [LatLng; 2],
    pub color: String,
    pub label: String,
    pub label_position: LatLng,
    pub label_visible: bool,
}

/// Indicator circle around a switch that anchors virtual hosts.
#[derive(Debug, Clone)]
pub struct HostCircle {
    pub center: LatLng,
    pub radius_m: f64,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
}

#[derive(Default)]
pub struct MapSink {
    markers: HashMap<String, Marker>,
    polylines: HashMap<String, Polyline>,
    circles: HashMap<String, HostCircle>,
}

impl MapSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, name: &str) -> Option<&Marker> {
        self.markers.get(name)
    }

    pub fn polyline(&self, key: &str) -> Option<&Polyline> {
        self.polylines.get(key)
    }

    pub fn circle(&self, switch: &str) -> Option<&HostCircle> {
        self.circles.get(switch)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }

    fn accepted_color(color: &str) -> String {
        if is_valid_color(color) {
            color.to_string()
        } else {
            warn!("color attribute ({color}) is not a valid HTML/RGB code, using {FALLBACK_LINK_COLOR}");
            FALLBACK_LINK_COLOR.to_string()
        }
    }
}

impl VisualSink for MapSink {
    fn create_node(
        &mut self,
        name: &str,
        position: LatLng,
        icon: NodeIcon,
        _color: &str,
        label: &str,
        _hint: Option<Point2D<f32>>,
    ) {
        self.markers.insert(
            name.to_string(),
            Marker {
                position,
                icon,
                popup: label.to_string(),
            },
        );
    }

    fn update_node(&mut self, name: &str, position: LatLng, _hint: Option<Point2D<f32>>) {
        let Some(marker) = self.markers.get_mut(name) else {
            warn!("update for unknown marker {name}");
            return;
        };
        marker.position = position;

        // Re-anchor every polyline touching this node and keep its label at
        // the midpoint.
        for polyline in self.polylines.values_mut() {
            let end = if polyline.endpoint_a == name {
                0
            } else if polyline.endpoint_b == name {
                1
            } else {
                continue;
            };
            polyline.positions[end] = position;
            polyline.label_position = polyline.positions[0].midpoint(polyline.positions[1]);
        }
    }

    fn remove_node(&mut self, name: &str) {
        self.markers.remove(name);
    }

    fn create_link(
        &mut self,
        a: &str,
        b: &str,
        color: &str,
        label: &LoadLabel,
        label_position: LatLng,
    ) {
        let (Some(ma), Some(mb)) = (self.markers.get(a), self.markers.get(b)) else {
            warn!("one of the given nodes ({a}, {b}) does not exist");
            return;
        };
        let positions = [ma.position, mb.position];
        let label_text = label.to_string();
        self.polylines.insert(
            canonical_key(a, b),
            Polyline {
                endpoint_a: a.to_string(),
                endpoint_b: b.to_string(),
                positions,
                color: Self::accepted_color(color),
                label_visible: !label.is_blank(),
                label: label_text,
                label_position,
            },
        );
    }

    fn update_link(&mut self, key: &str, color: &str, label: &LoadLabel) {
        let Some(polyline) = self.polylines.get_mut(key) else {
            warn!("update for unknown polyline {key}");
            return;
        };
        polyline.color = Self::accepted_color(color);
        polyline.label = label.to_string();
        polyline.label_visible = !label.is_blank();
    }

    fn remove_link(&mut self, key: &str) {
        self.polylines.remove(key);
    }

    fn create_circle(&mut self, switch: &str, center: LatLng) {
        self.circles.insert(
            switch.to_string(),
            HostCircle {
                center,
                radius_m: CIRCLE_RADIUS_M,
                color: CIRCLE_COLOR.to_string(),
                fill_color: CIRCLE_FILL_COLOR.to_string(),
                fill_opacity: CIRCLE_FILL_OPACITY,
            },
        );
    }

    fn remove_circle(&mut self, switch: &str) {
        self.circles.remove(switch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_with_nodes() -> MapSink {
        let mut sink = MapSink::new();
        sink.create_node(
            "s1",
            LatLng::new(0.0, 0.0),
            NodeIcon::Router,
            "#000000",
            "s1",
            None,
        );
        sink.create_node(
            "s2",
            LatLng::new(10.0, 10.0),
            NodeIcon::Router,
            "#000000",
            "s2",
            None,
        );
        sink
    }

    #[test]
    fn test_marker_lifecycle() {
        let mut sink = sink_with_nodes();
        assert_eq!(sink.marker_count(), 2);
        assert_eq!(sink.marker("s1").unwrap().icon, NodeIcon::Router);

        sink.remove_node("s1");
        assert!(sink.marker("s1").is_none());
        assert_eq!(sink.marker_count(), 1);
    }

    #[test]
    fn test_polyline_anchors_to_markers() {
        let mut sink = sink_with_nodes();
        sink.create_link(
            "s1",
            "s2",
            "rgb(0,255,0)",
            &LoadLabel::Text("8.00 bps".to_string()),
            LatLng::new(5.0, 5.0),
        );

        let polyline = sink.polyline("s1 s2").unwrap();
        assert_eq!(polyline.positions, [LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)]);
        assert_eq!(polyline.color, "rgb(0,255,0)");
        assert!(polyline.label_visible);
    }

    #[test]
    fn test_update_node_reanchors_polylines() {
        let mut sink = sink_with_nodes();
        sink.create_link(
            "s1",
            "s2",
            "#00f",
            &LoadLabel::Text("x".to_string()),
            LatLng::new(5.0, 5.0),
        );

        sink.update_node("s1", LatLng::new(20.0, 30.0), None);

        let polyline = sink.polyline("s1 s2").unwrap();
        assert_eq!(polyline.positions[0], LatLng::new(20.0, 30.0));
        assert_eq!(polyline.label_position, LatLng::new(15.0, 20.0));
        assert_eq!(sink.marker("s1").unwrap().position, LatLng::new(20.0, 30.0));
    }

    #[test]
    fn test_link_with_unknown_marker_is_dropped() {
        let mut sink = sink_with_nodes();
        sink.create_link(
            "s1",
            "ghost",
            "#00f",
            &LoadLabel::Text("x".to_string()),
            LatLng::new(0.0, 0.0),
        );
        assert_eq!(sink.polyline_count(), 0);
    }

    #[test]
    fn test_invalid_color_falls_back_to_black() {
        let mut sink = sink_with_nodes();
        sink.create_link(
            "s1",
            "s2",
            "chartreuse",
            &LoadLabel::Text("x".to_string()),
            LatLng::new(5.0, 5.0),
        );
        assert_eq!(sink.polyline("s1 s2").unwrap().color, "#000");
    }

    #[test]
    fn test_blank_label_is_hidden() {
        let mut sink = sink_with_nodes();
        sink.create_link(
            "s1",
            "s2",
            "#00f",
            &LoadLabel::Text(" ".to_string()),
            LatLng::new(5.0, 5.0),
        );
        assert!(!sink.polyline("s1 s2").unwrap().label_visible);

        sink.update_link(
            "s1 s2",
            "#00f",
            &LoadLabel::Text("1.00 Kbps".to_string()),
        );
        let polyline = sink.polyline("s1 s2").unwrap();
        assert!(polyline.label_visible);
        assert_eq!(polyline.label, "1.00 Kbps");
    }

    #[test]
    fn test_circle_appearance() {
        let mut sink = MapSink::new();
        sink.create_circle("s1", LatLng::new(1.0, 2.0));

        let circle = sink.circle("s1").unwrap();
        assert_eq!(circle.center, LatLng::new(1.0, 2.0));
        assert_eq!(circle.radius_m, 40_000.0);
        assert_eq!(circle.color, "#aa00aa");
        assert_eq!(circle.fill_color, "#00aa00");
        assert_eq!(circle.fill_opacity, 0.5);

        sink.remove_circle("s1");
        assert_eq!(sink.circle_count(), 0);
    }
}
