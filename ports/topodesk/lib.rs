/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! topodesk: SDN topology visualization core.
//!
//! Receives full topology snapshots over a channel, diffs them against the
//! in-memory model and keeps two visual backends — a tile-map overlay and a
//! force-directed graph — synchronized with the last-seen snapshot.

pub mod app;
pub mod channel;
pub mod config;
pub mod physics;
pub mod sink;
pub mod topo;
