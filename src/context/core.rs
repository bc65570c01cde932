//! Extension context: shared state of the observation core.
//!
//! The [`ExtensionContext`] owns the tab registry, snapshot cache,
//! subscription table, selected tab, and the set of extension hosts. It is
//! created once by the embedding application and cloned into collaborators.
//!
//! # Example
//!
//! ```ignore
//! use webext_tabs::ExtensionContext;
//! use webext_tabs::browser::{MemoryEnvironment, MemoryTab};
//!
//! let context = ExtensionContext::builder()
//!     .environment(MemoryEnvironment::new())
//!     .build()?;
//!
//! let (host_id, mut events) = context.open_host_channel();
//! let tab_id = context.observe_tab(MemoryTab::new(1, "https://a.example", "A"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::info;

use crate::browser::{HostEnvironment, Tab, TabRegistry, TabSnapshot, TabSnapshotCache};
use crate::identifiers::{HostId, TabId};
use crate::protocol::Event;
use crate::transport::{ChannelSink, EventBroadcaster, EventSink};

use super::builder::ContextBuilder;
use super::options::ContextOptions;
use super::subscriptions::SubscriptionTable;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the context.
///
/// Locks are never held across a call into a tab handle, the environment,
/// or a sink. When two are nested, the cache lock is taken first.
pub(crate) struct ContextInner {
    /// Live tabs.
    pub registry: Mutex<TabRegistry>,

    /// Last-broadcast snapshots.
    pub cache: Mutex<TabSnapshotCache>,

    /// Per-tab subscriptions.
    pub subscriptions: Mutex<SubscriptionTable>,

    /// Currently selected tab.
    pub active_tab: Mutex<Option<TabId>>,

    /// Registered extension hosts.
    pub broadcaster: EventBroadcaster,

    /// Window resolution and creation.
    pub environment: Arc<dyn HostEnvironment>,

    /// Tunables.
    pub options: ContextOptions,
}

// ============================================================================
// ExtensionContext
// ============================================================================

/// Tab-state observation core.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ExtensionContext {
    /// Shared inner state.
    pub(crate) inner: Arc<ContextInner>,
}

// ============================================================================
// ExtensionContext - Display
// ============================================================================

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("tab_count", &self.tab_count())
            .field("host_count", &self.host_count())
            .field("active_tab", &self.active_tab())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ExtensionContext - Constructor
// ============================================================================

impl ExtensionContext {
    /// Creates a configuration builder for the context.
    #[inline]
    #[must_use]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Creates a context from validated parts.
    pub(crate) fn new(environment: Arc<dyn HostEnvironment>, options: ContextOptions) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                registry: Mutex::new(TabRegistry::new()),
                cache: Mutex::new(TabSnapshotCache::new()),
                subscriptions: Mutex::new(SubscriptionTable::new()),
                active_tab: Mutex::new(None),
                broadcaster: EventBroadcaster::new(),
                environment,
                options,
            }),
        }
    }
}

// ============================================================================
// ExtensionContext - Accessors
// ============================================================================

impl ExtensionContext {
    /// Returns the configured options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ContextOptions {
        &self.inner.options
    }

    /// Returns the host environment.
    #[inline]
    #[must_use]
    pub fn environment(&self) -> &Arc<dyn HostEnvironment> {
        &self.inner.environment
    }

    /// Returns the number of live tabs.
    #[inline]
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.inner.registry.lock().len()
    }

    /// Returns the number of registered extension hosts.
    #[inline]
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.inner.broadcaster.len()
    }

    /// Returns the currently selected tab.
    #[inline]
    #[must_use]
    pub fn active_tab(&self) -> Option<TabId> {
        *self.inner.active_tab.lock()
    }

    /// Returns `true` if a snapshot is cached for the tab.
    #[inline]
    #[must_use]
    pub fn is_cached(&self, tab_id: TabId) -> bool {
        self.inner.cache.lock().contains(tab_id)
    }

    /// Returns the cached snapshot without building one.
    #[must_use]
    pub fn cached_snapshot(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.inner.cache.lock().get(tab_id).cloned()
    }
}

// ============================================================================
// ExtensionContext - Hosts
// ============================================================================

impl ExtensionContext {
    /// Registers an extension host; it receives every event from now on.
    pub fn observe_extension_host(&self, sink: Arc<dyn EventSink>) -> HostId {
        let host_id = sink.host_id();
        if self.inner.broadcaster.register(sink) {
            info!(host_id = %host_id, "Extension host observed");
        }
        host_id
    }

    /// Registers a new host backed by a bounded mailbox.
    ///
    /// Returns the host ID and the receiving half of the mailbox.
    pub fn open_host_channel(&self) -> (HostId, mpsc::Receiver<Event>) {
        let (sink, rx) = ChannelSink::channel(HostId::next(), self.inner.options.mailbox_capacity);
        let host_id = self.observe_extension_host(Arc::new(sink));
        (host_id, rx)
    }

    /// Removes a host. Returns `false` if it was not registered.
    pub fn forget_extension_host(&self, host_id: HostId) -> bool {
        let removed = self.inner.broadcaster.unregister(host_id).is_some();
        if removed {
            info!(host_id = %host_id, "Extension host forgotten");
        }
        removed
    }
}

// ============================================================================
// ExtensionContext - Snapshots
// ============================================================================

impl ExtensionContext {
    /// Looks up a live tab.
    #[inline]
    pub(crate) fn lookup_tab(&self, tab_id: TabId) -> Option<Tab> {
        self.inner.registry.lock().lookup(tab_id).cloned()
    }

    /// Builds a snapshot from live state.
    ///
    /// `active` reflects the currently selected tab.
    pub(crate) fn build_snapshot(&self, tab: &Tab) -> TabSnapshot {
        let window = self.inner.environment.parent_window_of(tab.id());
        let active = self.active_tab() == Some(tab.id());
        TabSnapshot::capture(tab, window.as_ref(), active)
    }

    /// Returns the cached snapshot, building and caching it if absent.
    ///
    /// Returns `None` for tabs that are not registered.
    pub fn snapshot_of(&self, tab_id: TabId) -> Option<TabSnapshot> {
        if let Some(cached) = self.cached_snapshot(tab_id) {
            return Some(cached);
        }

        let tab = self.lookup_tab(tab_id)?;
        let fresh = self.build_snapshot(&tab);
        self.cache_if_live(tab_id, fresh)
    }

    /// Caches a first snapshot unless the tab was forgotten while it was
    /// being built. A concurrent build may have won; the stored entry is
    /// returned either way.
    pub(crate) fn cache_if_live(&self, tab_id: TabId, fresh: TabSnapshot) -> Option<TabSnapshot> {
        let mut cache = self.inner.cache.lock();
        if !self.inner.registry.lock().contains(tab_id) {
            return None;
        }
        let fresh = self.settle_active(fresh);
        Some(cache.insert_if_absent(tab_id, fresh).clone())
    }

    /// Re-reads the selected tab into `snapshot.active`.
    ///
    /// Lock order is cache, then active tab: call with the cache lock held.
    pub(crate) fn settle_active(&self, snapshot: TabSnapshot) -> TabSnapshot {
        let active = *self.inner.active_tab.lock() == Some(snapshot.id);
        if snapshot.active == active {
            snapshot
        } else {
            snapshot.with_active(active)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MemoryEnvironment, MemoryTab};
    use crate::identifiers::WindowId;

    fn context() -> (ExtensionContext, Arc<MemoryEnvironment>) {
        let env = MemoryEnvironment::new();
        let context = ExtensionContext::builder()
            .environment(env.clone())
            .build()
            .expect("build");
        (context, env)
    }

    #[test]
    fn test_context_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<ExtensionContext>();
    }

    #[test]
    fn test_host_registration() {
        let (context, _env) = context();
        let (host_id, _rx) = context.open_host_channel();

        assert_eq!(context.host_count(), 1);
        assert!(context.forget_extension_host(host_id));
        assert!(!context.forget_extension_host(host_id));
        assert_eq!(context.host_count(), 0);
    }

    #[test]
    fn test_snapshot_of_is_lazy_and_cached() {
        let (context, env) = context();
        env.add_window(WindowId::new(3), 1024, 768);
        env.attach_tab(TabId::new(1), WindowId::new(3));

        let handle = MemoryTab::new(1, "https://a.example", "A");
        context.inner.registry.lock().observe(Tab::new(handle.clone()));
        assert!(!context.is_cached(TabId::new(1)));

        let first = context.snapshot_of(TabId::new(1)).expect("snapshot");
        assert_eq!(first.window_id, WindowId::new(3));
        assert!(context.is_cached(TabId::new(1)));

        // Cached entry is served until replaced.
        handle.set_title("B");
        let second = context.snapshot_of(TabId::new(1)).expect("snapshot");
        assert_eq!(second.title, "A");
    }

    #[test]
    fn test_snapshot_of_unknown_tab() {
        let (context, _env) = context();
        assert!(context.snapshot_of(TabId::new(9)).is_none());
        assert!(!context.is_cached(TabId::new(9)));
    }
}
