//! Tab state entities.
//!
//! This module provides the building blocks of the observation core:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Tab`] | Observed tab (non-owning handle + favicon) |
//! | [`TabSnapshot`] | Whole-record view broadcast to hosts |
//! | [`TabRegistry`] | Live tabs keyed by ID |
//! | [`TabSnapshotCache`] | Last-broadcast snapshot per tab |
//! | [`ChangeDetector`] | Watched-field diff |
//! | [`NavigationObserver`] | `webNavigation` normalization |
//! | [`HostEnvironment`] | Window resolution seam |
//!
//! # Example
//!
//! ```ignore
//! use webext_tabs::browser::{ChangeDetector, MemoryTab, Tab, TabSnapshot};
//!
//! let handle = MemoryTab::new(1, "https://a.example", "A");
//! let tab = Tab::new(handle.clone());
//! let before = TabSnapshot::capture(&tab, None, false);
//!
//! handle.set_title("B");
//! let after = TabSnapshot::capture(&tab, None, false);
//! assert_eq!(ChangeDetector::diff(&before, &after).title.as_deref(), Some("B"));
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Snapshot cache.
pub mod cache;

/// Watched-field change detection.
pub mod detector;

/// In-memory tab and environment implementations.
pub mod memory;

/// Navigation event normalization.
pub mod navigation;

/// Live tab registry.
pub mod registry;

/// Snapshot and change map types.
pub mod snapshot;

/// Tab handles and lifecycle signals.
pub mod tab;

/// Window resolution and host environment.
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use cache::TabSnapshotCache;
pub use detector::ChangeDetector;
pub use memory::{MemoryEnvironment, MemoryTab};
pub use navigation::NavigationObserver;
pub use registry::TabRegistry;
pub use snapshot::{ChangeInfo, MutedInfo, TabSnapshot, TabStatus};
pub use tab::{NavigationStart, SurfaceKind, Tab, TabHandle, TabSignal};
pub use window::{CreatedWindow, HostEnvironment, WindowInfo};
