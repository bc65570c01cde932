//! webext-tabs - Tab-state observation core for WebExtension hosts.
//!
//! This library keeps a live model of the tabs an embedding browser shell
//! exposes, and presents it to extension hosts through the `tabs`,
//! `windows`, `webNavigation` and `browserAction` extension APIs.
//!
//! # Architecture
//!
//! The core sits between two sides:
//!
//! - **Host environment (embedder)**: Owns windows and browsing surfaces,
//!   reports lifecycle signals, executes navigation / reload / CSS requests
//! - **Extension hosts**: Receive `tabs.*` / `webNavigation.*` events and
//!   send commands that get exactly one reply
//!
//! Key design principles:
//!
//! - One [`ExtensionContext`] owns every collection; clones share it
//! - Snapshots are cached and replaced wholesale, never mutated in place
//! - `tabs.onUpdated` fires only when a watched field changed by value
//! - Protocol uses `module.methodName` format
//!
//! # Quick Start
//!
//! ```ignore
//! use webext_tabs::{ExtensionContext, Result, TabSignal};
//! use webext_tabs::browser::{MemoryEnvironment, MemoryTab};
//!
//! fn main() -> Result<()> {
//!     let context = ExtensionContext::builder()
//!         .environment(MemoryEnvironment::new())
//!         .build()?;
//!
//!     let (_host_id, mut events) = context.open_host_channel();
//!
//!     let tab = MemoryTab::new(1, "https://example.com", "Example");
//!     let tab_id = context.observe_tab(tab.clone());
//!
//!     tab.set_title("Example Domain");
//!     context.handle_signal(tab_id, TabSignal::TitleUpdated);
//!
//!     while let Ok(event) = events.try_recv() {
//!         println!("{} {:?}", event.method, event.args);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Tab handles, snapshots, registry, cache, change detection |
//! | [`context`] | [`ExtensionContext`], lifecycle handlers, command surface |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Request, response and event message types |
//! | [`transport`] | Event fan-out and WebSocket host transport |

// ============================================================================
// Modules
// ============================================================================

/// Tab state entities.
///
/// - [`Tab`] - Observed tab
/// - [`TabSnapshot`] - Observable state of a tab
/// - [`ChangeDetector`] - Watched-field diff
pub mod browser;

/// Extension context and command surface.
///
/// Use [`ExtensionContext::builder()`] to create a configured context.
pub mod context;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Extension protocol message types.
pub mod protocol;

/// Event fan-out and host transport.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{
    ChangeDetector, ChangeInfo, CreatedWindow, HostEnvironment, MutedInfo, NavigationStart,
    SurfaceKind, Tab, TabHandle, TabSignal, TabSnapshot, TabStatus, WindowInfo,
};

// Context types
pub use context::{ContextBuilder, ContextOptions, CreatedTab, ExtensionContext, NotFoundPolicy};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{FrameId, HostId, RequestId, TabId, WindowId};

// Protocol types
pub use protocol::{Command, Event, ExtensionEvent, Request, Response};

// Transport types
pub use transport::{ChannelSink, EventSink, HostServer};
