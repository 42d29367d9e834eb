/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Wire types for topology snapshots.
//!
//! A snapshot is a full topology push (all switches + all links), never a
//! delta. Parsing happens before any registry is touched: a payload that
//! does not deserialize is rejected whole, so a bad snapshot can never leave
//! the registries half-updated.

use euclid::default::Point2D;
use serde::{Deserialize, Serialize};

use super::{NodeKind, TopoError};

/// One switch/host entry in a snapshot. The `type`, `label`, `x` and `y`
/// fields are optional on the wire; absent `type` means a switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Display label; the node name is used when absent
    pub label: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// `"host"` or `"qemu"`; anything else (or nothing) is a switch
    #[serde(rename = "type")]
    pub node_type: Option<String>,

    /// Optional force-layout seed coordinates
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl NodeSnapshot {
    /// Kind, standalone flag and virtual flag implied by the `type` field.
    pub fn kind(&self) -> (NodeKind, bool, bool) {
        match self.node_type.as_deref() {
            Some("host") => (NodeKind::Host, true, false),
            Some("qemu") => (NodeKind::Host, true, true),
            _ => (NodeKind::Switch, true, false),
        }
    }

    /// Layout hint, present only when both coordinates are.
    pub fn hint(&self) -> Option<Point2D<f32>> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point2D::new(x, y)),
            _ => None,
        }
    }
}

/// One edge entry: `[name_a, name_b, load]` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSnapshot(pub String, pub String, pub f64);

impl LinkSnapshot {
    pub fn a(&self) -> &str {
        &self.0
    }

    pub fn b(&self) -> &str {
        &self.1
    }

    pub fn load(&self) -> f64 {
        self.2
    }
}

/// A full topology snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopoSnapshot {
    pub switches: std::collections::HashMap<String, NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
}

/// Envelope for messages on the snapshot channel. Messages without a `topo`
/// payload (e.g. `{"cmd": "refresh"}`) are ignored by viewers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topo: Option<TopoSnapshot>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

/// Parse a raw channel message. Any shape problem — bad JSON, missing
/// `switches`/`links` inside `topo`, wrong field types — rejects the whole
/// message with no partial result.
pub fn parse_message(raw: &str) -> Result<ChannelMessage, TopoError> {
    serde_json::from_str(raw).map_err(|e| TopoError::MalformedSnapshot(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_message() {
        let raw = r#"{
            "topo": {
                "switches": {
                    "s1": {"latitude": 47.5, "longitude": 19.0},
                    "h1": {"latitude": 47.6, "longitude": 19.1, "type": "host",
                           "label": "laptop", "x": 10.0, "y": 20.0}
                },
                "links": [["s1", "h1", 125.0]]
            }
        }"#;

        let message = parse_message(raw).unwrap();
        let topo = message.topo.unwrap();
        assert_eq!(topo.switches.len(), 2);
        assert_eq!(topo.links.len(), 1);
        assert_eq!(topo.links[0].a(), "s1");
        assert_eq!(topo.links[0].b(), "h1");
        assert_eq!(topo.links[0].load(), 125.0);

        let h1 = &topo.switches["h1"];
        assert_eq!(h1.label.as_deref(), Some("laptop"));
        assert_eq!(h1.hint(), Some(Point2D::new(10.0, 20.0)));
    }

    #[test]
    fn test_message_without_topo_is_ok() {
        let message = parse_message(r#"{"cmd": "refresh"}"#).unwrap();
        assert!(message.topo.is_none());
        assert_eq!(message.cmd.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_missing_links_is_rejected() {
        let raw = r#"{"topo": {"switches": {}}}"#;
        assert!(matches!(
            parse_message(raw),
            Err(TopoError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_missing_switches_is_rejected() {
        let raw = r#"{"topo": {"links": []}}"#;
        assert!(matches!(
            parse_message(raw),
            Err(TopoError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_bad_json_is_rejected() {
        assert!(matches!(
            parse_message("not json"),
            Err(TopoError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_kind_mapping() {
        let snap = |t: Option<&str>| NodeSnapshot {
            label: None,
            latitude: 0.0,
            longitude: 0.0,
            node_type: t.map(String::from),
            x: None,
            y: None,
        };

        assert_eq!(snap(None).kind(), (NodeKind::Switch, true, false));
        assert_eq!(snap(Some("host")).kind(), (NodeKind::Host, true, false));
        assert_eq!(snap(Some("qemu")).kind(), (NodeKind::Host, true, true));
        // Unrecognized types fall back to switch rather than failing.
        assert_eq!(snap(Some("router")).kind(), (NodeKind::Switch, true, false));
    }

    #[test]
    fn test_hint_requires_both_coordinates() {
        let snap = NodeSnapshot {
            label: None,
            latitude: 0.0,
            longitude: 0.0,
            node_type: None,
            x: Some(1.0),
            y: None,
        };
        assert_eq!(snap.hint(), None);
    }
}
