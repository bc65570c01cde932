//! Event fan-out and host transport.
//!
//! This module delivers events to extension hosts and, for hosts running
//! out of process, carries requests and events over WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌─────────────────┐
//! │ ExtensionContext │                              │ Extension host  │
//! │                  │         WebSocket            │                 │
//! │ EventBroadcaster │◄────────────────────────────►│  requests       │
//! │  → ChannelSink   │      HostServer:PORT         │  events         │
//! │  → HostConnection│                              │                 │
//! └──────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `broadcaster` | Fan-out to every registered host |
//! | `connection` | WebSocket connection and event loop |
//! | `server` | WebSocket server binding and acceptance |
//! | `sink` | [`EventSink`] trait and bounded [`ChannelSink`] |

// ============================================================================
// Submodules
// ============================================================================

/// Fan-out to registered hosts.
pub mod broadcaster;

/// WebSocket connection and event loop.
pub mod connection;

/// WebSocket server for extension hosts.
pub mod server;

/// Event delivery endpoints.
pub mod sink;

// ============================================================================
// Re-exports
// ============================================================================

pub use broadcaster::EventBroadcaster;
pub use connection::HostConnection;
pub use server::HostServer;
pub use sink::{ChannelSink, EventSink};
