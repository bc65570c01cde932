//! Last-broadcast snapshot per live tab.

use rustc_hash::FxHashMap;

use crate::identifiers::TabId;

use super::snapshot::TabSnapshot;

// ============================================================================
// TabSnapshotCache
// ============================================================================

/// Holds at most one snapshot per tab.
///
/// Entries are swapped wholesale; nothing hands out mutable access to a
/// stored snapshot.
#[derive(Debug, Default)]
pub struct TabSnapshotCache {
    entries: FxHashMap<TabId, TabSnapshot>,
}

impl TabSnapshotCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot.
    #[inline]
    #[must_use]
    pub fn get(&self, tab_id: TabId) -> Option<&TabSnapshot> {
        self.entries.get(&tab_id)
    }

    /// Returns `true` if a snapshot is cached for the tab.
    #[inline]
    #[must_use]
    pub fn contains(&self, tab_id: TabId) -> bool {
        self.entries.contains_key(&tab_id)
    }

    /// Caches `snapshot` unless an entry already exists; returns the stored one.
    pub fn insert_if_absent(&mut self, tab_id: TabId, snapshot: TabSnapshot) -> &TabSnapshot {
        self.entries.entry(tab_id).or_insert(snapshot)
    }

    /// Swaps in a fresh snapshot, returning the previous one.
    pub fn replace(&mut self, tab_id: TabId, snapshot: TabSnapshot) -> Option<TabSnapshot> {
        self.entries.insert(tab_id, snapshot)
    }

    /// Removes the entry for a tab.
    ///
    /// Returns the removed snapshot; a second call for the same tab returns
    /// `None`.
    pub fn invalidate(&mut self, tab_id: TabId) -> Option<TabSnapshot> {
        self.entries.remove(&tab_id)
    }

    /// Recomputes every entry, replacing those for which `rebuild` returns
    /// a new snapshot.
    pub fn update_all(&mut self, mut rebuild: impl FnMut(&TabSnapshot) -> Option<TabSnapshot>) {
        for snapshot in self.entries.values_mut() {
            if let Some(next) = rebuild(snapshot) {
                *snapshot = next;
            }
        }
    }

    /// Returns the number of cached snapshots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
