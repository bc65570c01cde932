//! Extension context and command surface.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Fluent [`ContextBuilder`] |
//! | `commands` | `tabs.*`, `windows.*`, `browserAction.*` handlers and dispatch |
//! | `core` | [`ExtensionContext`] state, hosts, lazy snapshots |
//! | `lifecycle` | Signal routing and `tabs.*` / `webNavigation.*` events |
//! | `options` | [`ContextOptions`] and [`NotFoundPolicy`] |
//! | `subscriptions` | Per-tab [`SubscriptionTable`] |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for context configuration.
pub mod builder;

/// Command handlers.
pub mod commands;

/// Core context type.
pub mod core;

/// Lifecycle handlers.
pub mod lifecycle;

/// Context configuration.
pub mod options;

/// Per-tab subscription bookkeeping.
pub mod subscriptions;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ContextBuilder;
pub use commands::CreatedTab;
pub use core::ExtensionContext;
pub use options::{ContextOptions, NotFoundPolicy};
pub use subscriptions::{SubscriptionTable, TabSubscriptions};
