/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Application state: two viewers fed from one snapshot channel.

use log::{debug, info};

use crate::channel::{SnapshotChannel, SnapshotPublisher};
use crate::config::TopodeskConfig;
use crate::sink::graph::GraphSink;
use crate::sink::map::MapSink;
use crate::topo::reconciler::Reconciler;
use crate::topo::snapshot::ChannelMessage;

/// Main application state
pub struct TopodeskApp {
    channel: SnapshotChannel,

    /// Tile-map view of the topology
    pub map_view: Reconciler<MapSink>,

    /// Force-directed graph view of the topology
    pub graph_view: Reconciler<GraphSink>,
}

impl TopodeskApp {
    pub fn new(config: &TopodeskConfig) -> Self {
        Self {
            channel: SnapshotChannel::new(config.channel.clone()),
            map_view: Reconciler::new(MapSink::new()),
            graph_view: Reconciler::new(GraphSink::new()),
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    pub fn publisher(&self) -> SnapshotPublisher {
        self.channel.publisher()
    }

    /// Ask the topology source for a full snapshot (sent once on startup).
    pub fn request_refresh(&self) {
        self.channel.publisher().refresh();
    }

    /// Drain the channel, applying every pending snapshot to both views in
    /// order. Returns the number of snapshots applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.channel.try_recv() {
            if self.apply_message(&message) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply one channel message. Returns true when it carried a snapshot.
    pub fn apply_message(&mut self, message: &ChannelMessage) -> bool {
        let Some(topo) = &message.topo else {
            debug!("ignoring message without topology payload (cmd: {:?})", message.cmd);
            return false;
        };

        self.map_view.apply(topo);
        self.graph_view.apply(topo);
        info!(
            "applied snapshot: {} nodes, {} links",
            self.map_view.node_count(),
            self.map_view.link_count()
        );
        true
    }

    /// Advance the force layout of the graph view.
    pub fn step_layout(&mut self, dt: f32) {
        self.graph_view.sink_mut().step_layout(dt);
    }
}
