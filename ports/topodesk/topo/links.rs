/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Link registry: owns every known edge, keyed by an order-independent
//! canonical key, and derives display color and load label from the load.
//!
//! Derived fields are cached on the link and recomputed exactly when the
//! load value changes, so sink notifications stay minimal.

use std::collections::HashMap;
use std::fmt;

/// Color ramp breakpoints: (threshold in bits/sec, RGB).
const COLOR_RAMP: [(f64, [f64; 3]); 9] = [
    (0.0, [0.0, 0.0, 0.0]),
    (1_000.0, [100.0, 100.0, 100.0]),
    (5_000.0, [115.0, 255.0, 0.0]),
    (10_000.0, [0.0, 255.0, 0.0]),
    (500_000.0, [0.0, 255.0, 255.0]),
    (1_000_000.0, [0.0, 0.0, 255.0]),
    (50_000_000.0, [255.0, 0.0, 255.0]),
    (100_000_000.0, [255.0, 0.0, 0.0]),
    (1_000_000_000.0, [125.0, 0.0, 0.0]),
];

const UNITS: [&str; 5] = ["", "K", "M", "G", "T"];

/// Display label derived from a link's load.
///
/// Non-positive loads pass through as the raw number rather than a formatted
/// string; downstream rendering depends on this, so it is part of the
/// contract and encoded as its own variant instead of being "fixed".
#[derive(Debug, Clone, PartialEq)]
pub enum LoadLabel {
    Raw(f64),
    Text(String),
}

impl LoadLabel {
    /// True for labels the map view should hide entirely.
    pub fn is_blank(&self) -> bool {
        match self {
            LoadLabel::Raw(_) => false,
            LoadLabel::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for LoadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadLabel::Raw(value) => write!(f, "{value}"),
            LoadLabel::Text(text) => f.write_str(text),
        }
    }
}

/// An undirected edge between two named nodes.
#[derive(Debug, Clone)]
pub struct Link {
    /// First endpoint as reported (pre-sort)
    pub endpoint_a: String,

    /// Second endpoint as reported (pre-sort)
    pub endpoint_b: String,

    /// Load in bytes/sec as last reported
    pub load: f64,

    /// Cached `rgb(r,g,b)` color derived from the load
    pub color: String,

    /// Cached load label derived from the load
    pub label: LoadLabel,
}

impl Link {
    /// The registry key for this link.
    pub fn key(&self) -> String {
        canonical_key(&self.endpoint_a, &self.endpoint_b)
    }

    /// Endpoints in canonical (sorted) order.
    pub fn sorted_endpoints(&self) -> (&str, &str) {
        if self.endpoint_a <= self.endpoint_b {
            (&self.endpoint_a, &self.endpoint_b)
        } else {
            (&self.endpoint_b, &self.endpoint_a)
        }
    }
}

/// What `upsert` did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Created,
    Updated,
    Unchanged,
}

/// Order-independent identifier for an undirected link: the two endpoint
/// names in lexicographic order, joined with a single space.
pub fn canonical_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a} {b}")
    } else {
        format!("{b} {a}")
    }
}

/// Registry of known links, keyed by canonical key.
#[derive(Default)]
pub struct LinkRegistry {
    links: HashMap<String, Link>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.links.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Link> {
        self.links.get(key)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.links.keys()
    }

    /// Create the link if its canonical key is new, otherwise update the
    /// load in place. Derived color/label are recomputed only when the load
    /// value actually changed.
    pub fn upsert(&mut self, a: &str, b: &str, load: f64) -> (LinkChange, &Link) {
        let key = canonical_key(a, b);
        match self.links.entry(key) {
            std::collections::hash_map::Entry::Occupied(entry) => {
                let link = entry.into_mut();
                if link.load == load {
                    (LinkChange::Unchanged, &*link)
                } else {
                    link.load = load;
                    link.color = load_to_color(load);
                    link.label = load_to_label(load);
                    (LinkChange::Updated, &*link)
                }
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                let link = entry.insert(Link {
                    endpoint_a: a.to_string(),
                    endpoint_b: b.to_string(),
                    load,
                    color: load_to_color(load),
                    label: load_to_label(load),
                });
                (LinkChange::Created, &*link)
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Link> {
        self.links.remove(key)
    }
}

/// Map a load (bytes/sec) to an `rgb(r,g,b)` string by piecewise-linear
/// interpolation over the fixed ramp. Loads at or beyond the ramp ends
/// clamp to the end colors.
pub fn load_to_color(load: f64) -> String {
    let bits = load * 8.0;

    let (first_threshold, first_color) = COLOR_RAMP[0];
    if bits <= first_threshold {
        return format_rgb(first_color);
    }
    let (last_threshold, last_color) = COLOR_RAMP[COLOR_RAMP.len() - 1];
    if bits >= last_threshold {
        return format_rgb(last_color);
    }

    for pair in COLOR_RAMP.windows(2) {
        let (low, low_color) = pair[0];
        let (high, high_color) = pair[1];
        if bits >= low && bits < high {
            let f = (bits - low) / (high - low);
            let channel = |i: usize| low_color[i] * (1.0 - f) + high_color[i] * f;
            return format_rgb([channel(0), channel(1), channel(2)]);
        }
    }
    format_rgb(last_color)
}

/// Format a load (bytes/sec) with a scaled unit suffix, e.g. `1.00 Kbps`.
/// Non-positive loads pass through unformatted (see [`LoadLabel`]).
pub fn load_to_label(load: f64) -> LoadLabel {
    if load <= 0.0 {
        return LoadLabel::Raw(load);
    }

    let bits = load * 8.0;
    let digits = bits.log10().floor() as i32;
    let unit_index = digits.div_euclid(3).clamp(0, UNITS.len() as i32 - 1);
    let precision = (2 - digits.rem_euclid(3)).max(0) as usize;
    let scaled = bits / 1000f64.powi(unit_index);
    LoadLabel::Text(format!(
        "{scaled:.precision$} {}bps",
        UNITS[unit_index as usize]
    ))
}

/// Accept `#rgb` / `#rrggbb` hex codes and `rgb(r,g,b)` strings. Color
/// names are deliberately not accepted.
pub fn is_valid_color(code: &str) -> bool {
    if let Some(hex) = code.strip_prefix('#') {
        return (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let Some(inner) = code
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    let channels: Vec<&str> = inner.split(',').map(str::trim).collect();
    channels.len() == 3
        && channels
            .iter()
            .all(|c| !c.is_empty() && c.len() <= 3 && c.chars().all(|d| d.is_ascii_digit()))
}

fn format_rgb(color: [f64; 3]) -> String {
    format!(
        "rgb({},{},{})",
        color[0].round() as i64,
        color[1].round() as i64,
        color[2].round() as i64
    )
}
