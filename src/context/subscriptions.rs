//! Per-tab subscription bookkeeping.
//!
//! Every observed tab owns one entry: live update signals, the one-shot
//! destruction signal, and its [`NavigationObserver`]. Releasing the entry
//! tears all of them down at once; signals for a tab without an entry are
//! ignored.

use rustc_hash::FxHashMap;

use crate::browser::NavigationObserver;
use crate::identifiers::TabId;

// ============================================================================
// TabSubscriptions
// ============================================================================

/// Live subscriptions of one tab.
#[derive(Debug, Clone)]
pub struct TabSubscriptions {
    navigation: NavigationObserver,
}

impl TabSubscriptions {
    /// Returns the navigation observer.
    #[inline]
    #[must_use]
    pub fn navigation(&self) -> &NavigationObserver {
        &self.navigation
    }
}

// ============================================================================
// SubscriptionTable
// ============================================================================

/// Subscriptions keyed by tab.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    entries: FxHashMap<TabId, TabSubscriptions>,
}

impl SubscriptionTable {
    /// Creates an empty table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms every subscription for a tab. Returns `false` if already armed.
    pub fn subscribe(&mut self, tab_id: TabId) -> bool {
        if self.entries.contains_key(&tab_id) {
            return false;
        }
        self.entries.insert(
            tab_id,
            TabSubscriptions {
                navigation: NavigationObserver::new(tab_id),
            },
        );
        true
    }

    /// Returns `true` if the tab has live subscriptions.
    #[inline]
    #[must_use]
    pub fn is_subscribed(&self, tab_id: TabId) -> bool {
        self.entries.contains_key(&tab_id)
    }

    /// Returns the tab's navigation observer.
    #[inline]
    pub fn navigation_mut(&mut self, tab_id: TabId) -> Option<&mut NavigationObserver> {
        self.entries.get_mut(&tab_id).map(|entry| &mut entry.navigation)
    }

    /// Returns the tab's navigation observer.
    #[inline]
    #[must_use]
    pub fn navigation(&self, tab_id: TabId) -> Option<&NavigationObserver> {
        self.entries.get(&tab_id).map(TabSubscriptions::navigation)
    }

    /// Tears down every subscription of a tab.
    ///
    /// Returns the released entry; `None` means it was already released.
    pub fn release(&mut self, tab_id: TabId) -> Option<TabSubscriptions> {
        self.entries.remove(&tab_id)
    }

    /// Returns the number of subscribed tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no tab is subscribed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
