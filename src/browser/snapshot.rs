//! Tab snapshots and change maps.
//!
//! A [`TabSnapshot`] is the whole-record view of a tab that extension hosts
//! see. It is built from live state, cached, and replaced wholesale when a
//! watched field changes.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::{TabId, WindowId};

use super::tab::Tab;
use super::window::WindowInfo;

// ============================================================================
// TabStatus
// ============================================================================

/// Loading state of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    /// A load is in progress.
    Loading,
    /// Loading finished.
    Complete,
}

impl TabStatus {
    /// Maps the live loading flag to a status.
    #[inline]
    #[must_use]
    pub const fn from_loading(is_loading: bool) -> Self {
        if is_loading {
            Self::Loading
        } else {
            Self::Complete
        }
    }
}

// ============================================================================
// MutedInfo
// ============================================================================

/// Mute state of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutedInfo {
    /// Audio is muted.
    pub muted: bool,
}

// ============================================================================
// TabSnapshot
// ============================================================================

/// Observable state of a tab at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    /// Tab is the selected tab.
    pub active: bool,
    /// Media is playing.
    pub audible: bool,
    /// Always `true`.
    pub auto_discardable: bool,
    /// Always `false`; tabs are never discarded.
    pub discarded: bool,
    /// First favicon reported by the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    /// Height of the parent window.
    pub height: u32,
    /// Always `false`.
    pub highlighted: bool,
    /// Tab ID.
    pub id: TabId,
    /// Always `false`.
    pub incognito: bool,
    /// Position in a list result; never present on cached snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Mute state.
    pub muted_info: MutedInfo,
    /// Always `false`.
    pub pinned: bool,
    /// Always `true`.
    pub selected: bool,
    /// Loading state.
    pub status: TabStatus,
    /// Document title.
    pub title: String,
    /// Current URL.
    pub url: String,
    /// Width of the parent window.
    pub width: u32,
    /// Parent window, or [`WindowId::NONE`].
    pub window_id: WindowId,
}

impl TabSnapshot {
    /// Builds a snapshot from the tab's live state.
    ///
    /// `window` is the tab's parent window, if it resolves; geometry and
    /// `windowId` fall back to `0` / NONE.
    #[must_use]
    pub fn capture(tab: &Tab, window: Option<&WindowInfo>, active: bool) -> Self {
        let handle = tab.handle();
        let (width, height) = window.map_or((0, 0), |w| (w.width, w.height));

        Self {
            active,
            audible: handle.is_audible(),
            auto_discardable: true,
            discarded: false,
            fav_icon_url: tab.favicon(),
            height,
            highlighted: false,
            id: tab.id(),
            incognito: false,
            index: None,
            muted_info: MutedInfo {
                muted: handle.is_muted(),
            },
            pinned: false,
            selected: true,
            status: TabStatus::from_loading(handle.is_loading()),
            title: handle.title(),
            url: handle.url(),
            width,
            window_id: window.map_or(WindowId::NONE, |w| w.id),
        }
    }

    /// Returns a copy with `active` set.
    #[inline]
    #[must_use]
    pub fn with_active(&self, active: bool) -> Self {
        Self {
            active,
            ..self.clone()
        }
    }

    /// Returns a copy carrying a list position.
    #[inline]
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self.clone()
        }
    }
}

// ============================================================================
// ChangeInfo
// ============================================================================

/// Fields that changed between two snapshots, with their new values.
///
/// Only the fields watched by the change detector appear here. A favicon
/// that disappeared serializes as `"favIconUrl": null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInfo {
    /// New loading state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TabStatus>,
    /// New URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// New pinned flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    /// New audible flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audible: Option<bool>,
    /// New discarded flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discarded: Option<bool>,
    /// New auto-discardable flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_discardable: Option<bool>,
    /// New mute state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_info: Option<MutedInfo>,
    /// New favicon; `Some(None)` when it was cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<Option<String>>,
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ChangeInfo {
    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Returns the wire names of the changed fields.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let flags = [
            (self.status.is_some(), "status"),
            (self.url.is_some(), "url"),
            (self.pinned.is_some(), "pinned"),
            (self.audible.is_some(), "audible"),
            (self.discarded.is_some(), "discarded"),
            (self.auto_discardable.is_some(), "autoDiscardable"),
            (self.muted_info.is_some(), "mutedInfo"),
            (self.fav_icon_url.is_some(), "favIconUrl"),
            (self.title.is_some(), "title"),
        ];
        flags
            .into_iter()
            .filter_map(|(changed, name)| changed.then_some(name))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
