//! Authoritative set of live tabs.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::identifiers::TabId;

use super::tab::Tab;

// ============================================================================
// TabRegistry
// ============================================================================

/// Live tabs keyed by ID.
///
/// Membership only; the registry never emits events. Iteration follows
/// registration order so list results are stable between calls.
#[derive(Debug, Default)]
pub struct TabRegistry {
    /// Tabs by ID.
    tabs: FxHashMap<TabId, Tab>,
    /// Registration order.
    order: Vec<TabId>,
}

impl TabRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tab.
    ///
    /// Returns `false` if the ID is already registered, in which case the
    /// existing entry is kept.
    pub fn observe(&mut self, tab: Tab) -> bool {
        let tab_id = tab.id();
        if let Some(existing) = self.tabs.get(&tab_id) {
            if !existing.same_handle(&tab) {
                warn!(tab_id = %tab_id, "Tab ID already bound to another surface");
            }
            return false;
        }

        self.tabs.insert(tab_id, tab);
        self.order.push(tab_id);
        true
    }

    /// Removes a tab, returning it if it was registered.
    pub fn forget(&mut self, tab_id: TabId) -> Option<Tab> {
        let removed = self.tabs.remove(&tab_id)?;
        self.order.retain(|id| *id != tab_id);
        Some(removed)
    }

    /// Looks up a tab.
    #[inline]
    #[must_use]
    pub fn lookup(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.get(&tab_id)
    }

    /// Records a tab's favicon. Returns `false` for unknown tabs.
    pub fn set_favicon(&self, tab_id: TabId, favicon: Option<String>) -> bool {
        match self.tabs.get(&tab_id) {
            Some(tab) => {
                tab.set_favicon(favicon);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the tab is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.tabs.contains_key(&tab_id)
    }

    /// Returns all tabs in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<Tab> {
        self.order
            .iter()
            .filter_map(|id| self.tabs.get(id).cloned())
            .collect()
    }

    /// Returns the number of live tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Returns `true` if no tab is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryTab;

    fn tab(id: i32) -> Tab {
        Tab::new(MemoryTab::new(id, "about:blank", ""))
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut registry = TabRegistry::new();
        let first = tab(1);

        assert!(registry.observe(first.clone()));
        assert!(!registry.observe(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_observe_keeps_existing_binding() {
        let mut registry = TabRegistry::new();
        let original = tab(1);
        registry.observe(original.clone());

        assert!(!registry.observe(tab(1)));
        let kept = registry.lookup(TabId::new(1)).expect("registered");
        assert!(kept.same_handle(&original));
    }

    #[test]
    fn test_forget_and_lookup() {
        let mut registry = TabRegistry::new();
        registry.observe(tab(1));
        registry.observe(tab(2));

        assert!(registry.forget(TabId::new(1)).is_some());
        assert!(registry.forget(TabId::new(1)).is_none());
        assert!(registry.lookup(TabId::new(1)).is_none());
        assert!(registry.contains(TabId::new(2)));
    }

    #[test]
    fn test_set_favicon() {
        let mut registry = TabRegistry::new();
        registry.observe(tab(1));

        assert!(registry.set_favicon(TabId::new(1), Some("https://a.example/f.ico".into())));
        assert!(!registry.set_favicon(TabId::new(2), None));
        let favicon = registry.lookup(TabId::new(1)).and_then(Tab::favicon);
        assert_eq!(favicon.as_deref(), Some("https://a.example/f.ico"));
    }

    #[test]
    fn test_all_follows_registration_order() {
        let mut registry = TabRegistry::new();
        for id in [5, 2, 9] {
            registry.observe(tab(id));
        }
        registry.forget(TabId::new(2));

        let ids: Vec<_> = registry.all().iter().map(Tab::id).collect();
        assert_eq!(ids, vec![TabId::new(5), TabId::new(9)]);
    }
}
