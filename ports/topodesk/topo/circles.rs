/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Host indicator circle bookkeeping.
//!
//! A switch that anchors at least one virtual host shows exactly one
//! indicator circle. This tracker owns the host-to-switch associations and
//! the set of switches with an active circle; the rendered circle itself
//! belongs to the visual sink.

use std::collections::{HashMap, HashSet};

use super::TopoError;

#[derive(Default)]
pub struct CircleTracker {
    /// Virtual/non-standalone host name -> anchoring switch name
    associations: HashMap<String, String>,

    /// Switches that currently show an indicator circle
    active: HashSet<String>,
}

impl CircleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_circle(&self, switch: &str) -> bool {
        self.active.contains(switch)
    }

    /// Make sure the switch shows a circle. Idempotent; returns true only
    /// when the circle was newly created (the caller then notifies the sink).
    pub fn ensure_circle(&mut self, switch: &str) -> bool {
        self.active.insert(switch.to_string())
    }

    /// Drop the switch's circle. Asking for a switch without one is a
    /// recoverable error the caller is expected to log.
    pub fn remove_circle(&mut self, switch: &str) -> Result<(), TopoError> {
        if self.active.remove(switch) {
            Ok(())
        } else {
            Err(TopoError::NoCircle(switch.to_string()))
        }
    }

    /// Drop the switch's circle only if no host association still points at
    /// it. Returns true when a circle was actually removed.
    pub fn release_circle_if_unused(&mut self, switch: &str) -> bool {
        if self.has_hosts(switch) {
            return false;
        }
        self.active.remove(switch)
    }

    /// Record that `host` is anchored to `switch`.
    pub fn associate(&mut self, host: &str, switch: &str) {
        self.associations
            .insert(host.to_string(), switch.to_string());
    }

    /// Forget the host's association, returning the switch it pointed at.
    pub fn remove_association(&mut self, host: &str) -> Option<String> {
        self.associations.remove(host)
    }

    /// The switch a host is anchored to, if any.
    pub fn anchor_of(&self, host: &str) -> Option<&str> {
        self.associations.get(host).map(String::as_str)
    }

    /// True when at least one association still points at the switch.
    pub fn has_hosts(&self, switch: &str) -> bool {
        self.associations.values().any(|s| s == switch)
    }

    /// Names of every host anchored to the switch.
    pub fn hosts_of(&self, switch: &str) -> Vec<String> {
        self.associations
            .iter()
            .filter(|(_, s)| s.as_str() == switch)
            .map(|(h, _)| h.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_circle_is_idempotent() {
        let mut tracker = CircleTracker::new();
        assert!(tracker.ensure_circle("s1"));
        assert!(!tracker.ensure_circle("s1"));
        assert!(tracker.has_circle("s1"));
    }

    #[test]
    fn test_remove_missing_circle_is_an_error() {
        let mut tracker = CircleTracker::new();
        assert_eq!(
            tracker.remove_circle("s1"),
            Err(TopoError::NoCircle("s1".to_string()))
        );

        tracker.ensure_circle("s1");
        assert_eq!(tracker.remove_circle("s1"), Ok(()));
        assert!(!tracker.has_circle("s1"));
    }

    #[test]
    fn test_associations() {
        let mut tracker = CircleTracker::new();
        tracker.associate("h1", "s1");
        tracker.associate("h2", "s1");
        tracker.associate("h3", "s2");

        assert_eq!(tracker.anchor_of("h1"), Some("s1"));
        assert!(tracker.has_hosts("s1"));
        let mut hosts = tracker.hosts_of("s1");
        hosts.sort();
        assert_eq!(hosts, vec!["h1".to_string(), "h2".to_string()]);

        assert_eq!(tracker.remove_association("h1"), Some("s1".to_string()));
        assert!(tracker.has_hosts("s1"));
        assert_eq!(tracker.remove_association("h2"), Some("s1".to_string()));
        assert!(!tracker.has_hosts("s1"));
    }

    #[test]
    fn test_release_circle_if_unused() {
        let mut tracker = CircleTracker::new();
        tracker.ensure_circle("s1");
        tracker.associate("h1", "s1");

        // Still anchored: circle stays.
        assert!(!tracker.release_circle_if_unused("s1"));
        assert!(tracker.has_circle("s1"));

        tracker.remove_association("h1");
        assert!(tracker.release_circle_if_unused("s1"));
        assert!(!tracker.has_circle("s1"));

        // Nothing left to release.
        assert!(!tracker.release_circle_if_unused("s1"));
    }
}
