//! Extension protocol message types.
//!
//! This module defines the message format exchanged between the core and
//! extension hosts.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Host → Core | Command request |
//! | `Response` | Core → Host | Command response, to the caller only |
//! | `Event` | Core → every host | Tab state notification |
//!
//! # Command Naming
//!
//! Commands and events follow `module.methodName` format:
//!
//! - `tabs.get`
//! - `windows.create`
//! - `tabs.onUpdated`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event envelope and payloads |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by module.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    BrowserActionCommand, Command, CreateData, CreateProperties, InjectDetails, QueryInfo,
    ReloadProperties, TabsCommand, UpdateProperties, WindowsCommand,
};
pub use event::{
    ActiveInfo, CommittedDetails, CreatedNavigationTargetDetails, Event, ExtensionEvent,
    RemoveInfo,
};
pub use request::{Request, Response, ResponseType};
