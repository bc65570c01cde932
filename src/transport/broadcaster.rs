//! Fan-out of events to every registered extension host.
//!
//! # Delivery
//!
//! | Property | Behavior |
//! |----------|----------|
//! | Order across hosts | Unspecified |
//! | Guarantee | At most once per host |
//! | Per-host failure | Logged, never aborts the rest |
//! | Closed host | Dropped from the set |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, info, trace, warn};

use crate::error::Error;
use crate::identifiers::HostId;
use crate::protocol::{Event, ExtensionEvent};

use super::sink::EventSink;

// ============================================================================
// EventBroadcaster
// ============================================================================

/// Registered extension hosts and their sinks.
#[derive(Default)]
pub struct EventBroadcaster {
    hosts: RwLock<FxHashMap<HostId, Arc<dyn EventSink>>>,
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("host_count", &self.len())
            .finish()
    }
}

impl EventBroadcaster {
    /// Creates a broadcaster with no hosts.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host. Returns `false` if the host ID is already registered.
    pub fn register(&self, sink: Arc<dyn EventSink>) -> bool {
        let host_id = sink.host_id();
        let mut hosts = self.hosts.write();
        if hosts.contains_key(&host_id) {
            return false;
        }
        hosts.insert(host_id, sink);
        true
    }

    /// Removes a host, returning its sink.
    pub fn unregister(&self, host_id: HostId) -> Option<Arc<dyn EventSink>> {
        self.hosts.write().remove(&host_id)
    }

    /// Returns `true` if the host is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, host_id: HostId) -> bool {
        self.hosts.read().contains_key(&host_id)
    }

    /// Returns the number of registered hosts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    /// Returns `true` if no host is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }

    /// Serializes `event` once and delivers it to every host.
    ///
    /// Returns the number of hosts that accepted the event.
    pub fn broadcast(&self, event: &ExtensionEvent) -> usize {
        match event.to_event() {
            Ok(envelope) => self.broadcast_envelope(&envelope),
            Err(e) => {
                warn!(method = event.method(), error = %e, "Failed to serialize event");
                0
            }
        }
    }

    /// Delivers an already serialized event to every host.
    pub fn broadcast_envelope(&self, event: &Event) -> usize {
        // Snapshot the set so no lock is held while sinks run.
        let sinks: Vec<Arc<dyn EventSink>> = self.hosts.read().values().cloned().collect();

        let mut delivered = 0;
        let mut closed = Vec::new();

        for sink in sinks {
            let host_id = sink.host_id();
            if sink.is_closed() {
                closed.push(host_id);
                continue;
            }

            match sink.deliver(event) {
                Ok(()) => {
                    delivered += 1;
                    trace!(host_id = %host_id, method = %event.method, "Event delivered");
                }
                Err(Error::HostClosed { .. }) => closed.push(host_id),
                Err(e) => {
                    warn!(host_id = %host_id, method = %event.method, error = %e, "Event delivery failed");
                }
            }
        }

        if !closed.is_empty() {
            let mut hosts = self.hosts.write();
            for host_id in closed {
                if hosts.remove(&host_id).is_some() {
                    info!(host_id = %host_id, "Dropped closed extension host");
                }
            }
        }

        debug!(method = %event.method, delivered, "Event broadcast");
        delivered
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::identifiers::{TabId, WindowId};
    use crate::protocol::ActiveInfo;
    use crate::transport::ChannelSink;

    use parking_lot::Mutex;

    /// Sink that fails every delivery.
    struct FailingSink {
        host_id: HostId,
        attempts: Mutex<usize>,
    }

    impl EventSink for FailingSink {
        fn host_id(&self) -> HostId {
            self.host_id
        }

        fn deliver(&self, _event: &Event) -> Result<()> {
            *self.attempts.lock() += 1;
            Err(Error::delivery_failed(self.host_id, "renderer crashed"))
        }

        fn is_closed(&self) -> bool {
            false
        }
    }

    fn activated() -> ExtensionEvent {
        ExtensionEvent::TabActivated(ActiveInfo {
            tab_id: TabId::new(1),
            window_id: WindowId::new(1),
        })
    }

    #[test]
    fn test_broadcast_reaches_every_host() {
        let broadcaster = EventBroadcaster::new();
        let (a, mut rx_a) = ChannelSink::channel(HostId::next(), 8);
        let (b, mut rx_b) = ChannelSink::channel(HostId::next(), 8);
        broadcaster.register(Arc::new(a));
        broadcaster.register(Arc::new(b));

        assert_eq!(broadcaster.broadcast(&activated()), 2);
        assert_eq!(rx_a.try_recv().expect("a").method, "tabs.onActivated");
        assert_eq!(rx_b.try_recv().expect("b").method, "tabs.onActivated");
    }

    #[test]
    fn test_failure_does_not_abort_fanout() {
        let broadcaster = EventBroadcaster::new();
        let failing = Arc::new(FailingSink {
            host_id: HostId::next(),
            attempts: Mutex::new(0),
        });
        let (ok, mut rx) = ChannelSink::channel(HostId::next(), 8);
        broadcaster.register(failing.clone());
        broadcaster.register(Arc::new(ok));

        assert_eq!(broadcaster.broadcast(&activated()), 1);
        assert_eq!(*failing.attempts.lock(), 1);
        assert!(rx.try_recv().is_ok());
        // Failing but open hosts stay registered.
        assert_eq!(broadcaster.len(), 2);
    }

    #[test]
    fn test_closed_hosts_are_dropped() {
        let broadcaster = EventBroadcaster::new();
        let (sink, rx) = ChannelSink::channel(HostId::next(), 8);
        let host_id = sink.host_id();
        broadcaster.register(Arc::new(sink));
        drop(rx);

        assert_eq!(broadcaster.broadcast(&activated()), 0);
        assert!(!broadcaster.contains(host_id));
        assert!(broadcaster.is_empty());
    }

    #[test]
    fn test_register_twice() {
        let broadcaster = EventBroadcaster::new();
        let (sink, _rx) = ChannelSink::channel(HostId::next(), 8);
        let sink: Arc<dyn EventSink> = Arc::new(sink);

        assert!(broadcaster.register(Arc::clone(&sink)));
        assert!(!broadcaster.register(Arc::clone(&sink)));
        assert!(broadcaster.unregister(sink.host_id()).is_some());
        assert!(broadcaster.unregister(sink.host_id()).is_none());
    }
}
