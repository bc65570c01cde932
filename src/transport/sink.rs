//! Event delivery endpoints.
//!
//! An [`EventSink`] is one extension host as seen by the broadcaster.
//! [`ChannelSink`] feeds a bounded mailbox that a connection task drains.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::{Error, Result};
use crate::identifiers::HostId;
use crate::protocol::Event;

// ============================================================================
// EventSink
// ============================================================================

/// Delivery endpoint of one extension host.
///
/// `deliver` must not block; it runs on the lifecycle control path.
pub trait EventSink: Send + Sync {
    /// Host this sink delivers to.
    fn host_id(&self) -> HostId;

    /// Hands one event to the host.
    ///
    /// # Errors
    ///
    /// - [`Error::MailboxFull`] if the host is not keeping up
    /// - [`Error::HostClosed`] if the host is gone
    fn deliver(&self, event: &Event) -> Result<()>;

    /// Returns `true` once the host is gone for good.
    fn is_closed(&self) -> bool;
}

// ============================================================================
// ChannelSink
// ============================================================================

/// Sink backed by a bounded `tokio` channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    host_id: HostId,
    tx: mpsc::Sender<Event>,
}

impl ChannelSink {
    /// Creates a sink and the receiving half of its mailbox.
    ///
    /// `capacity` must be greater than zero.
    #[must_use]
    pub fn channel(host_id: HostId, capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { host_id, tx }, rx)
    }
}

impl EventSink for ChannelSink {
    #[inline]
    fn host_id(&self) -> HostId {
        self.host_id
    }

    fn deliver(&self, event: &Event) -> Result<()> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => Error::MailboxFull {
                host_id: self.host_id,
            },
            TrySendError::Closed(_) => Error::HostClosed {
                host_id: self.host_id,
            },
        })
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Tests
// ============================================================================
