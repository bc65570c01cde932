//! Per-tab navigation event normalization.
//!
//! Host navigation metadata is translated into the `webNavigation` event
//! shapes. Frame IDs are normalized so the main frame is always `0`.
//! Sub-frame parent linkage is not tracked: `parentFrameId` is always `-1`.

// ============================================================================
// Imports
// ============================================================================

use std::time::{SystemTime, UNIX_EPOCH};

use crate::identifiers::{FrameId, TabId};
use crate::protocol::{CommittedDetails, CreatedNavigationTargetDetails};

use super::tab::NavigationStart;

// ============================================================================
// NavigationObserver
// ============================================================================

/// Navigation subscriptions of one tab.
///
/// The navigation-target subscription is one-shot; the commit subscription
/// stays live until the tab is released.
#[derive(Debug, Clone)]
pub struct NavigationObserver {
    /// Observed tab.
    tab_id: TabId,
    /// One-shot target subscription still armed.
    target_armed: bool,
}

impl NavigationObserver {
    /// Creates an observer with both subscriptions armed.
    #[inline]
    #[must_use]
    pub const fn new(tab_id: TabId) -> Self {
        Self {
            tab_id,
            target_armed: true,
        }
    }

    /// Returns the observed tab.
    #[inline]
    #[must_use]
    pub const fn tab_id(&self) -> TabId {
        self.tab_id
    }

    /// Returns `true` until the first navigation target was reported.
    #[inline]
    #[must_use]
    pub const fn is_target_armed(&self) -> bool {
        self.target_armed
    }

    /// Handles "navigation about to occur".
    ///
    /// Returns details only for the first call.
    pub fn will_navigate(
        &mut self,
        url: &str,
        process_id: i32,
    ) -> Option<CreatedNavigationTargetDetails> {
        if !self.target_armed {
            return None;
        }
        self.target_armed = false;

        Some(CreatedNavigationTargetDetails {
            source_tab_id: self.tab_id,
            source_process_id: process_id,
            source_frame_id: FrameId::main(),
            url: url.to_string(),
            tab_id: self.tab_id,
            time_stamp: now_millis(),
        })
    }

    /// Handles a started navigation, reported as committed.
    #[must_use]
    pub fn committed(&self, navigation: &NavigationStart, process_id: i32) -> CommittedDetails {
        let frame_id = if navigation.is_main_frame {
            FrameId::main()
        } else {
            FrameId::new(navigation.frame_routing_id)
        };

        CommittedDetails {
            frame_id,
            parent_frame_id: FrameId::NO_PARENT,
            process_id,
            tab_id: self.tab_id,
            time_stamp: now_millis(),
            url: navigation.url.clone(),
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn navigation(is_main_frame: bool) -> NavigationStart {
        NavigationStart {
            url: "https://b.example".to_string(),
            is_in_place: false,
            is_main_frame,
            frame_process_id: 7,
            frame_routing_id: 42,
        }
    }

    #[test]
    fn test_will_navigate_fires_once() {
        let mut observer = NavigationObserver::new(TabId::new(1));

        let first = observer
            .will_navigate("https://b.example", 7)
            .expect("first call reports");
        assert_eq!(first.source_tab_id, TabId::new(1));
        assert_eq!(first.source_frame_id, FrameId::main());
        assert_eq!(first.source_process_id, 7);
        assert!(first.time_stamp > 0.0);

        assert!(observer.will_navigate("https://c.example", 7).is_none());
        assert!(!observer.is_target_armed());
    }

    #[test]
    fn test_committed_main_frame_is_zero() {
        let observer = NavigationObserver::new(TabId::new(1));
        let details = observer.committed(&navigation(true), 7);
        assert_eq!(details.frame_id, FrameId::main());
        assert_eq!(details.parent_frame_id, FrameId::NO_PARENT);
        assert_eq!(details.url, "https://b.example");
    }

    #[test]
    fn test_committed_subframe_uses_routing_id() {
        let observer = NavigationObserver::new(TabId::new(1));
        let details = observer.committed(&navigation(false), 7);
        assert_eq!(details.frame_id, FrameId::new(42));
        assert_eq!(details.parent_frame_id, FrameId::NO_PARENT);
    }

    #[test]
    fn test_committed_fires_every_time() {
        let observer = NavigationObserver::new(TabId::new(1));
        let a = observer.committed(&navigation(true), 7);
        let b = observer.committed(&navigation(true), 7);
        assert_eq!(a.url, b.url);
    }
}
