/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Snapshot delivery channel.
//!
//! Viewers consume topology snapshots from a named channel; where the
//! messages come from (a controller connection, a file, a test) is the
//! publisher's business. Delivery is a queue: snapshots published while one
//! is being applied wait their turn, so reconciliation is never concurrent.

use crossbeam_channel::{Receiver, Sender};
use log::debug;

use crate::topo::snapshot::{parse_message, ChannelMessage};
use crate::topo::TopoError;

/// Subscriber end of a named snapshot channel.
pub struct SnapshotChannel {
    name: String,
    tx: Sender<ChannelMessage>,
    rx: Receiver<ChannelMessage>,
}

/// Cloneable publisher handle for a channel.
#[derive(Clone)]
pub struct SnapshotPublisher {
    name: String,
    tx: Sender<ChannelMessage>,
}

impl SnapshotChannel {
    pub fn new(name: impl Into<String>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            name: name.into(),
            tx,
            rx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn publisher(&self) -> SnapshotPublisher {
        SnapshotPublisher {
            name: self.name.clone(),
            tx: self.tx.clone(),
        }
    }

    /// Next pending message, if any (non-blocking).
    pub fn try_recv(&self) -> Option<ChannelMessage> {
        self.rx.try_recv().ok()
    }
}

impl SnapshotPublisher {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish an already-parsed message.
    pub fn publish(&self, message: ChannelMessage) {
        let _ = self.tx.send(message);
    }

    /// Parse and publish a raw JSON message. A malformed payload is
    /// rejected whole; nothing reaches subscribers.
    pub fn publish_raw(&self, raw: &str) -> Result<(), TopoError> {
        let message = parse_message(raw)?;
        self.publish(message);
        Ok(())
    }

    /// Ask the topology source for a fresh snapshot.
    pub fn refresh(&self) {
        debug!("requesting refresh on channel {}", self.name);
        self.publish(ChannelMessage {
            topo: None,
            cmd: Some("refresh".to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_receive() {
        let channel = SnapshotChannel::new("topo_test");
        let publisher = channel.publisher();

        publisher
            .publish_raw(r#"{"topo": {"switches": {}, "links": []}}"#)
            .unwrap();

        let message = channel.try_recv().unwrap();
        assert!(message.topo.is_some());
        assert!(channel.try_recv().is_none());
    }

    #[test]
    fn test_malformed_payload_never_reaches_subscribers() {
        let channel = SnapshotChannel::new("topo_test");
        let publisher = channel.publisher();

        assert!(matches!(
            publisher.publish_raw(r#"{"topo": {"switches": {}}}"#),
            Err(TopoError::MalformedSnapshot(_))
        ));
        assert!(channel.try_recv().is_none());
    }

    #[test]
    fn test_messages_queue_in_order() {
        let channel = SnapshotChannel::new("topo_test");
        let publisher = channel.publisher();

        publisher.publish(ChannelMessage {
            topo: None,
            cmd: Some("first".to_string()),
        });
        publisher.publish(ChannelMessage {
            topo: None,
            cmd: Some("second".to_string()),
        });

        assert_eq!(channel.try_recv().unwrap().cmd.as_deref(), Some("first"));
        assert_eq!(channel.try_recv().unwrap().cmd.as_deref(), Some("second"));
    }

    #[test]
    fn test_refresh_message_shape() {
        let channel = SnapshotChannel::new("topo_test");
        channel.publisher().refresh();

        let message = channel.try_recv().unwrap();
        assert!(message.topo.is_none());
        assert_eq!(message.cmd.as_deref(), Some("refresh"));
    }
}
