//! Window resolution and the host environment seam.
//!
//! The core never owns windows. It reads their ID and geometry through
//! [`HostEnvironment`] and asks the environment to open new ones.
//!
//! # Example
//!
//! ```ignore
//! use webext_tabs::{HostEnvironment, TabId};
//!
//! if let Some(window) = env.parent_window_of(TabId::new(1)) {
//!     println!("tab 1 lives in window {} ({}x{})", window.id, window.width, window.height);
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;
use crate::identifiers::{HostId, TabId, WindowId};

// ============================================================================
// WindowInfo
// ============================================================================

/// Minimal view of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowInfo {
    /// Window ID.
    pub id: WindowId,
    /// Outer width in pixels.
    pub width: u32,
    /// Outer height in pixels.
    pub height: u32,
    /// Window has been torn down.
    pub destroyed: bool,
}

impl WindowInfo {
    /// Creates a live window description.
    #[inline]
    #[must_use]
    pub const fn new(id: WindowId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            destroyed: false,
        }
    }
}

// ============================================================================
// CreatedWindow
// ============================================================================

/// Identity of a window opened on behalf of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedWindow {
    /// The new window.
    pub window_id: WindowId,
    /// Its initial tab, if the environment knows it.
    pub tab_id: Option<TabId>,
}

// ============================================================================
// HostEnvironment
// ============================================================================

/// Collaborator interface implemented by the embedding application.
///
/// Synchronous lookups must be cheap; they run on the control path of every
/// lifecycle signal.
#[async_trait]
pub trait HostEnvironment: Send + Sync {
    /// Resolves the top-level window that contains a tab.
    fn parent_window_of(&self, tab_id: TabId) -> Option<WindowInfo>;

    /// Resolves a window by ID.
    fn window(&self, window_id: WindowId) -> Option<WindowInfo>;

    /// Resolves the window containing an extension host's surface.
    ///
    /// Background hosts have no window.
    fn window_of_host(&self, host_id: HostId) -> Option<WindowInfo>;

    /// Opens a new top-level window, optionally loading `url`.
    async fn create_window(&self, url: Option<String>) -> Result<CreatedWindow>;
}
