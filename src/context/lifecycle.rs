//! Tab lifecycle handling.
//!
//! Translates host signals into registry, cache and broadcast steps. Within
//! one signal the order is always registry mutation, then cache update,
//! then broadcast.
//!
//! | Signal | Events |
//! |--------|--------|
//! | observation | `tabs.onCreated` |
//! | title / load / media / navigation / favicon | `tabs.onUpdated` when a watched field changed |
//! | will navigate (first only) | `webNavigation.onCreatedNavigationTarget` |
//! | navigation started | `webNavigation.onCommitted`, then `tabs.onUpdated` |
//! | selection | `tabs.onActivated` |
//! | destroyed | `tabs.onRemoved` |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::browser::{ChangeDetector, NavigationStart, Tab, TabHandle, TabSignal};
use crate::identifiers::{TabId, WindowId};
use crate::protocol::{ActiveInfo, ExtensionEvent, RemoveInfo};

use super::core::ExtensionContext;

// ============================================================================
// Observation
// ============================================================================

impl ExtensionContext {
    /// Starts observing a tab and announces it with `tabs.onCreated`.
    ///
    /// Observing an already registered ID is a no-op.
    pub fn observe_tab(&self, handle: Arc<dyn TabHandle>) -> TabId {
        let tab = Tab::new(handle);
        let tab_id = tab.id();

        if !self.inner.registry.lock().observe(tab.clone()) {
            debug!(tab_id = %tab_id, "Tab already observed");
            return tab_id;
        }
        self.inner.subscriptions.lock().subscribe(tab_id);

        info!(tab_id = %tab_id, kind = %tab.kind(), "Tab observed");
        self.on_created(&tab);
        tab_id
    }

    /// Routes one lifecycle signal.
    ///
    /// Signals for tabs without live subscriptions are ignored.
    pub fn handle_signal(&self, tab_id: TabId, signal: TabSignal) {
        if !self.inner.subscriptions.lock().is_subscribed(tab_id) {
            trace!(tab_id = %tab_id, signal = signal.name(), "Signal for unobserved tab ignored");
            return;
        }
        trace!(tab_id = %tab_id, signal = signal.name(), "Tab signal");

        let triggers_update = signal.triggers_update();
        match signal {
            TabSignal::Destroyed => self.on_removed(tab_id),
            TabSignal::WillNavigate { url } => self.on_will_navigate(tab_id, &url),
            TabSignal::NavigationStarted(navigation) => {
                self.on_navigation_started(tab_id, &navigation);
            }
            TabSignal::FaviconUpdated { favicons } => {
                self.inner
                    .registry
                    .lock()
                    .set_favicon(tab_id, favicons.into_iter().next());
            }
            _ => {}
        }

        // Change detection runs after the signal's own event.
        if triggers_update {
            self.on_updated(tab_id);
        }
    }
}

// ============================================================================
// tabs.* events
// ============================================================================

impl ExtensionContext {
    /// Caches the first snapshot and broadcasts `tabs.onCreated`.
    fn on_created(&self, tab: &Tab) {
        let fresh = self.build_snapshot(tab);
        let Some(snapshot) = self.cache_if_live(tab.id(), fresh) else {
            debug!(tab_id = %tab.id(), "Tab removed before its first snapshot");
            return;
        };

        self.inner
            .broadcaster
            .broadcast(&ExtensionEvent::TabCreated(snapshot));
    }

    /// Runs change detection for a tab.
    ///
    /// Unknown tabs and tabs without a cached snapshot are skipped.
    pub fn on_updated(&self, tab_id: TabId) {
        let Some(tab) = self.lookup_tab(tab_id) else {
            return;
        };
        let Some(previous) = self.cached_snapshot(tab_id) else {
            trace!(tab_id = %tab_id, "No baseline snapshot, skipping change detection");
            return;
        };

        let current = self.build_snapshot(&tab);
        let change_info = ChangeDetector::diff(&previous, &current);
        if change_info.is_empty() {
            return;
        }

        debug!(tab_id = %tab_id, changed = ?change_info.changed_fields(), "Tab updated");

        let current = {
            let mut cache = self.inner.cache.lock();
            // Destroyed while the snapshot was being built.
            if !cache.contains(tab_id) {
                return;
            }
            let current = self.settle_active(current);
            cache.replace(tab_id, current.clone());
            current
        };

        self.inner.broadcaster.broadcast(&ExtensionEvent::TabUpdated {
            tab_id,
            change_info,
            tab: current,
        });
    }

    /// Tears a tab down and broadcasts `tabs.onRemoved`.
    ///
    /// A repeated call for the same tab does nothing.
    pub fn on_removed(&self, tab_id: TabId) {
        if self.inner.subscriptions.lock().release(tab_id).is_none() {
            debug!(tab_id = %tab_id, "Tab already removed");
            return;
        }

        self.inner.registry.lock().forget(tab_id);
        let cached = self.inner.cache.lock().invalidate(tab_id);
        {
            let mut active = self.inner.active_tab.lock();
            if *active == Some(tab_id) {
                *active = None;
            }
        }

        let window_id = cached.map_or(WindowId::NONE, |snapshot| snapshot.window_id);
        let is_window_closing = window_id.as_i32() > -1
            && self
                .inner
                .environment
                .window(window_id)
                .is_some_and(|window| window.destroyed);

        info!(tab_id = %tab_id, window_id = %window_id, is_window_closing, "Tab removed");

        self.inner.broadcaster.broadcast(&ExtensionEvent::TabRemoved {
            tab_id,
            remove_info: RemoveInfo {
                window_id,
                is_window_closing,
            },
        });
    }

    /// Marks a tab as selected and broadcasts `tabs.onActivated`.
    ///
    /// Every cached snapshot has its `active` flag recomputed.
    pub fn on_activated(&self, tab_id: TabId) {
        if self.lookup_tab(tab_id).is_none() {
            debug!(tab_id = %tab_id, "Activation of unknown tab ignored");
            return;
        }

        let window_id = self
            .inner
            .environment
            .parent_window_of(tab_id)
            .map_or(WindowId::NONE, |window| window.id);

        {
            let mut cache = self.inner.cache.lock();
            *self.inner.active_tab.lock() = Some(tab_id);
            cache.update_all(|snapshot| {
                let active = snapshot.id == tab_id;
                (snapshot.active != active).then(|| snapshot.with_active(active))
            });
        }

        debug!(tab_id = %tab_id, window_id = %window_id, "Tab activated");

        self.inner
            .broadcaster
            .broadcast(&ExtensionEvent::TabActivated(ActiveInfo { tab_id, window_id }));
    }
}

// ============================================================================
// webNavigation.* events
// ============================================================================

impl ExtensionContext {
    fn on_will_navigate(&self, tab_id: TabId, url: &str) {
        let Some(tab) = self.lookup_tab(tab_id) else {
            return;
        };
        let process_id = tab.handle().process_id();

        let details = self
            .inner
            .subscriptions
            .lock()
            .navigation_mut(tab_id)
            .and_then(|observer| observer.will_navigate(url, process_id));

        if let Some(details) = details {
            self.inner
                .broadcaster
                .broadcast(&ExtensionEvent::CreatedNavigationTarget(details));
        }
    }

    fn on_navigation_started(&self, tab_id: TabId, navigation: &NavigationStart) {
        let Some(tab) = self.lookup_tab(tab_id) else {
            return;
        };
        let process_id = tab.handle().process_id();

        let details = self
            .inner
            .subscriptions
            .lock()
            .navigation(tab_id)
            .map(|observer| observer.committed(navigation, process_id));

        if let Some(details) = details {
            self.inner
                .broadcaster
                .broadcast(&ExtensionEvent::Committed(details));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
