//! In-memory tab and environment implementations.
//!
//! Useful as a reference host and for tests and benchmarks: state is plain
//! data behind locks, and every mutation requested by a command is recorded.
//!
//! # Example
//!
//! ```ignore
//! use webext_tabs::browser::{MemoryEnvironment, MemoryTab};
//! use webext_tabs::{TabId, WindowId};
//!
//! let env = MemoryEnvironment::new();
//! env.add_window(WindowId::new(1), 1280, 720);
//! let tab = MemoryTab::new(1, "https://a.example", "A");
//! env.attach_tab(TabId::new(1), WindowId::new(1));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::identifiers::{HostId, TabId, WindowId};

use super::tab::{SurfaceKind, TabHandle};
use super::window::{CreatedWindow, HostEnvironment, WindowInfo};

// ============================================================================
// MemoryTab
// ============================================================================

/// Mutable live state of a [`MemoryTab`].
#[derive(Debug, Clone, Default)]
struct MemoryTabState {
    title: String,
    url: String,
    loading: bool,
    audible: bool,
    muted: bool,
    inserted_css: Vec<String>,
    reloads: Vec<bool>,
    loaded_urls: Vec<String>,
}

/// A tab whose live state is set directly.
#[derive(Debug)]
pub struct MemoryTab {
    id: TabId,
    kind: SurfaceKind,
    process_id: i32,
    state: Mutex<MemoryTabState>,
}

impl MemoryTab {
    /// Creates a window-kind tab.
    #[must_use]
    pub fn new(id: i32, url: &str, title: &str) -> Arc<Self> {
        Arc::new(Self {
            id: TabId::new(id),
            kind: SurfaceKind::Window,
            process_id: 1000 + id,
            state: Mutex::new(MemoryTabState {
                title: title.to_string(),
                url: url.to_string(),
                ..Default::default()
            }),
        })
    }

    /// Sets the title.
    pub fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    /// Sets the URL without recording a navigation.
    pub fn set_url(&self, url: &str) {
        self.state.lock().url = url.to_string();
    }

    /// Sets the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.state.lock().loading = loading;
    }

    /// Sets the audible flag.
    pub fn set_audible(&self, audible: bool) {
        self.state.lock().audible = audible;
    }

    /// Stylesheets injected so far.
    #[must_use]
    pub fn inserted_css(&self) -> Vec<String> {
        self.state.lock().inserted_css.clone()
    }

    /// Reloads requested so far; `true` marks a cache-bypassing reload.
    #[must_use]
    pub fn reloads(&self) -> Vec<bool> {
        self.state.lock().reloads.clone()
    }

    /// URLs loaded through [`TabHandle::load_url`].
    #[must_use]
    pub fn loaded_urls(&self) -> Vec<String> {
        self.state.lock().loaded_urls.clone()
    }
}

impl TabHandle for MemoryTab {
    fn id(&self) -> TabId {
        self.id
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn title(&self) -> String {
        self.state.lock().title.clone()
    }

    fn url(&self) -> String {
        self.state.lock().url.clone()
    }

    fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    fn is_audible(&self) -> bool {
        self.state.lock().audible
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn process_id(&self) -> i32 {
        self.process_id
    }

    fn load_url(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.loading = true;
        state.loaded_urls.push(url.to_string());
        Ok(())
    }

    fn reload(&self) -> Result<()> {
        self.state.lock().reloads.push(false);
        Ok(())
    }

    fn reload_ignoring_cache(&self) -> Result<()> {
        self.state.lock().reloads.push(true);
        Ok(())
    }

    fn insert_css(&self, code: &str) -> Result<()> {
        self.state.lock().inserted_css.push(code.to_string());
        Ok(())
    }

    fn set_audio_muted(&self, muted: bool) -> Result<()> {
        self.state.lock().muted = muted;
        Ok(())
    }
}

// ============================================================================
// MemoryEnvironment
// ============================================================================

/// A host environment backed by plain maps.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    windows: Mutex<FxHashMap<WindowId, WindowInfo>>,
    tab_windows: Mutex<FxHashMap<TabId, WindowId>>,
    host_windows: Mutex<FxHashMap<HostId, WindowId>>,
    created_urls: Mutex<Vec<Option<String>>>,
    next_window_id: AtomicI32,
    create_delay: Mutex<Option<Duration>>,
}

impl MemoryEnvironment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_window_id: AtomicI32::new(100),
            ..Default::default()
        })
    }

    /// Adds a live window.
    pub fn add_window(&self, window_id: WindowId, width: u32, height: u32) {
        self.windows
            .lock()
            .insert(window_id, WindowInfo::new(window_id, width, height));
    }

    /// Marks a window as destroyed.
    pub fn destroy_window(&self, window_id: WindowId) {
        if let Some(window) = self.windows.lock().get_mut(&window_id) {
            window.destroyed = true;
        }
    }

    /// Places a tab in a window.
    pub fn attach_tab(&self, tab_id: TabId, window_id: WindowId) {
        self.tab_windows.lock().insert(tab_id, window_id);
    }

    /// Places an extension host's surface in a window.
    pub fn attach_host(&self, host_id: HostId, window_id: WindowId) {
        self.host_windows.lock().insert(host_id, window_id);
    }

    /// URLs passed to [`HostEnvironment::create_window`].
    #[must_use]
    pub fn created_urls(&self) -> Vec<Option<String>> {
        self.created_urls.lock().clone()
    }

    /// Delays every window creation, for timeout tests.
    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = Some(delay);
    }

    fn resolve(&self, window_id: Option<WindowId>) -> Option<WindowInfo> {
        window_id.and_then(|id| self.windows.lock().get(&id).copied())
    }
}

#[async_trait]
impl HostEnvironment for MemoryEnvironment {
    fn parent_window_of(&self, tab_id: TabId) -> Option<WindowInfo> {
        let window_id = self.tab_windows.lock().get(&tab_id).copied();
        self.resolve(window_id)
    }

    fn window(&self, window_id: WindowId) -> Option<WindowInfo> {
        self.resolve(Some(window_id))
    }

    fn window_of_host(&self, host_id: HostId) -> Option<WindowInfo> {
        let window_id = self.host_windows.lock().get(&host_id).copied();
        self.resolve(window_id)
    }

    async fn create_window(&self, url: Option<String>) -> Result<CreatedWindow> {
        let delay = *self.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let window_id = WindowId::new(self.next_window_id.fetch_add(1, Ordering::Relaxed));
        if window_id.as_i32() < 0 {
            return Err(Error::environment("window ID space exhausted"));
        }

        self.add_window(window_id, 800, 600);
        self.created_urls.lock().push(url);

        Ok(CreatedWindow {
            window_id,
            tab_id: None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
