//! Observed tab handles and their lifecycle signals.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::identifiers::TabId;

// ============================================================================
// SurfaceKind
// ============================================================================

/// Kind of browsing surface behind a tab handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Primary content of a top-level window.
    Window,
    /// Embedded view attached to a window.
    BrowserView,
    /// Extension background context.
    BackgroundPage,
    /// Anything else.
    Other,
}

impl SurfaceKind {
    /// Returns the host environment's name for this kind.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::BrowserView => "browserView",
            Self::BackgroundPage => "backgroundPage",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TabHandle
// ============================================================================

/// Non-owning access to a live browsing surface.
///
/// Implemented by the host environment. Getters read current live state;
/// mutators ask the surface to act and report state changes later through
/// [`TabSignal`]s.
pub trait TabHandle: Send + Sync {
    /// Host-assigned identifier, stable for the surface's lifetime.
    fn id(&self) -> TabId;

    /// Surface kind, used for logging.
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Other
    }

    /// Current document title.
    fn title(&self) -> String;

    /// Current URL.
    fn url(&self) -> String;

    /// Whether a load is in progress.
    fn is_loading(&self) -> bool;

    /// Whether media is currently audible.
    fn is_audible(&self) -> bool;

    /// Whether audio is muted.
    fn is_muted(&self) -> bool;

    /// Renderer process ID.
    fn process_id(&self) -> i32;

    /// Navigates to `url`.
    fn load_url(&self, url: &str) -> Result<()>;

    /// Reloads the current page.
    fn reload(&self) -> Result<()>;

    /// Reloads the current page bypassing the cache.
    fn reload_ignoring_cache(&self) -> Result<()>;

    /// Injects a stylesheet into the page.
    fn insert_css(&self, code: &str) -> Result<()>;

    /// Mutes or unmutes audio.
    fn set_audio_muted(&self, muted: bool) -> Result<()>;
}

// ============================================================================
// Tab
// ============================================================================

/// Internal shared state for a tab.
struct TabInner {
    /// Tab ID, captured once at observation time.
    id: TabId,
    /// Live content handle.
    handle: Arc<dyn TabHandle>,
    /// Last favicon reported by the surface.
    favicon: RwLock<Option<String>>,
}

/// A tab tracked by the registry.
///
/// Cheap to clone; all clones share the same handle and favicon slot.
#[derive(Clone)]
pub struct Tab {
    inner: Arc<TabInner>,
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.handle.kind())
            .finish_non_exhaustive()
    }
}

impl Tab {
    /// Wraps a content handle.
    #[must_use]
    pub fn new(handle: Arc<dyn TabHandle>) -> Self {
        Self {
            inner: Arc::new(TabInner {
                id: handle.id(),
                handle,
                favicon: RwLock::new(None),
            }),
        }
    }

    /// Returns the tab ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TabId {
        self.inner.id
    }

    /// Returns the content handle.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &Arc<dyn TabHandle> {
        &self.inner.handle
    }

    /// Returns the surface kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        self.inner.handle.kind()
    }

    /// Returns the last reported favicon URL.
    #[must_use]
    pub fn favicon(&self) -> Option<String> {
        self.inner.favicon.read().clone()
    }

    /// Records the favicon reported by the surface.
    pub fn set_favicon(&self, favicon: Option<String>) {
        *self.inner.favicon.write() = favicon;
    }

    /// Returns `true` if both values wrap the same content handle.
    #[inline]
    #[must_use]
    pub fn same_handle(&self, other: &Tab) -> bool {
        Arc::ptr_eq(&self.inner.handle, &other.inner.handle)
    }
}

// ============================================================================
// TabSignal
// ============================================================================

/// Metadata of a navigation that has started in a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStart {
    /// Target URL.
    pub url: String,
    /// Same-document navigation.
    pub is_in_place: bool,
    /// Navigation happens in the main frame.
    pub is_main_frame: bool,
    /// Process hosting the navigating frame.
    pub frame_process_id: i32,
    /// Host routing ID of the navigating frame.
    pub frame_routing_id: i64,
}

/// Lifecycle signal raised by the host environment for one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabSignal {
    /// Document title changed.
    TitleUpdated,
    /// Load started.
    LoadStarted,
    /// Load finished.
    LoadStopped,
    /// Media began playing.
    MediaStarted,
    /// Media paused.
    MediaPaused,
    /// Navigation started.
    NavigationStarted(NavigationStart),
    /// Navigation redirected.
    NavigationRedirected,
    /// In-page navigation (fragment, history API).
    NavigatedInPage,
    /// Favicons reported; the first entry is used.
    FaviconUpdated {
        /// Candidate favicon URLs.
        favicons: Vec<String>,
    },
    /// A navigation is about to occur.
    WillNavigate {
        /// Target URL.
        url: String,
    },
    /// The surface was torn down.
    Destroyed,
}

impl TabSignal {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TitleUpdated => "title-updated",
            Self::LoadStarted => "load-started",
            Self::LoadStopped => "load-stopped",
            Self::MediaStarted => "media-started",
            Self::MediaPaused => "media-paused",
            Self::NavigationStarted(_) => "navigation-started",
            Self::NavigationRedirected => "navigation-redirected",
            Self::NavigatedInPage => "navigated-in-page",
            Self::FaviconUpdated { .. } => "favicon-updated",
            Self::WillNavigate { .. } => "will-navigate",
            Self::Destroyed => "destroyed",
        }
    }

    /// Returns `true` if this signal triggers change detection.
    #[must_use]
    pub const fn triggers_update(&self) -> bool {
        !matches!(self, Self::WillNavigate { .. } | Self::Destroyed)
    }
}

// ============================================================================
// Tests
// ============================================================================
