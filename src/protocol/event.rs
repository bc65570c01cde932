//! Event message types.
//!
//! Events are notifications pushed from the core to every registered
//! extension host when tab state changes. No reply is expected.
//!
//! # Event Types
//!
//! | Module | Events |
//! |--------|--------|
//! | `tabs` | `onCreated`, `onUpdated`, `onRemoved`, `onActivated` |
//! | `webNavigation` | `onCreatedNavigationTarget`, `onCommitted` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, to_value};

use crate::browser::{ChangeInfo, TabSnapshot};
use crate::error::Result;
use crate::identifiers::{FrameId, TabId, WindowId};

// ============================================================================
// Event
// ============================================================================

/// An event notification as sent on the wire.
///
/// # Format
///
/// ```json
/// {
///   "type": "event",
///   "method": "module.eventName",
///   "args": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type marker (always "event").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event name in `module.eventName` format.
    pub method: String,

    /// Positional listener arguments.
    pub args: Vec<Value>,
}

impl Event {
    /// Creates an event envelope.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            event_type: "event".to_string(),
            method: method.into(),
            args,
        }
    }

    /// Returns the module name from the method.
    #[inline]
    #[must_use]
    pub fn module(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Argument of `tabs.onActivated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInfo {
    /// Newly selected tab.
    pub tab_id: TabId,
    /// Its parent window.
    pub window_id: WindowId,
}

/// Second argument of `tabs.onRemoved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInfo {
    /// Window the tab belonged to.
    pub window_id: WindowId,
    /// The window is being destroyed along with the tab.
    pub is_window_closing: bool,
}

/// Argument of `webNavigation.onCreatedNavigationTarget`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNavigationTargetDetails {
    /// Tab the navigation originates from.
    pub source_tab_id: TabId,
    /// Renderer process of the source tab.
    pub source_process_id: i32,
    /// Always the main frame.
    pub source_frame_id: FrameId,
    /// Target URL.
    pub url: String,
    /// Tab the navigation lands in.
    pub tab_id: TabId,
    /// Milliseconds since the Unix epoch.
    pub time_stamp: f64,
}

/// Argument of `webNavigation.onCommitted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedDetails {
    /// `0` for the main frame, else the frame routing ID.
    pub frame_id: FrameId,
    /// Always `-1`; parent linkage is not tracked.
    pub parent_frame_id: FrameId,
    /// Renderer process of the frame.
    pub process_id: i32,
    /// Navigated tab.
    pub tab_id: TabId,
    /// Milliseconds since the Unix epoch.
    pub time_stamp: f64,
    /// Committed URL.
    pub url: String,
}

// ============================================================================
// ExtensionEvent
// ============================================================================

/// Typed events produced by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionEvent {
    /// A tab started being observed.
    TabCreated(TabSnapshot),

    /// Watched fields of a tab changed.
    TabUpdated {
        /// Changed tab.
        tab_id: TabId,
        /// Changed fields only.
        change_info: ChangeInfo,
        /// Full new snapshot.
        tab: TabSnapshot,
    },

    /// A tab was destroyed.
    TabRemoved {
        /// Removed tab.
        tab_id: TabId,
        /// Window context of the removal.
        remove_info: RemoveInfo,
    },

    /// The selected tab changed.
    TabActivated(ActiveInfo),

    /// A tab is about to navigate for the first time.
    CreatedNavigationTarget(CreatedNavigationTargetDetails),

    /// A navigation committed.
    Committed(CommittedDetails),
}

impl ExtensionEvent {
    /// Returns the wire method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::TabCreated(_) => "tabs.onCreated",
            Self::TabUpdated { .. } => "tabs.onUpdated",
            Self::TabRemoved { .. } => "tabs.onRemoved",
            Self::TabActivated(_) => "tabs.onActivated",
            Self::CreatedNavigationTarget(_) => "webNavigation.onCreatedNavigationTarget",
            Self::Committed(_) => "webNavigation.onCommitted",
        }
    }

    /// Returns the tab the event is about.
    #[must_use]
    pub fn tab_id(&self) -> TabId {
        match self {
            Self::TabCreated(tab) => tab.id,
            Self::TabUpdated { tab_id, .. } | Self::TabRemoved { tab_id, .. } => *tab_id,
            Self::TabActivated(info) => info.tab_id,
            Self::CreatedNavigationTarget(details) => details.tab_id,
            Self::Committed(details) => details.tab_id,
        }
    }

    /// Serializes into the wire envelope.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a payload fails to serialize.
    pub fn to_event(&self) -> Result<Event> {
        let args = match self {
            Self::TabCreated(tab) => vec![to_value(tab)?],
            Self::TabUpdated {
                tab_id,
                change_info,
                tab,
            } => vec![to_value(tab_id)?, to_value(change_info)?, to_value(tab)?],
            Self::TabRemoved {
                tab_id,
                remove_info,
            } => vec![to_value(tab_id)?, to_value(remove_info)?],
            Self::TabActivated(info) => vec![to_value(info)?],
            Self::CreatedNavigationTarget(details) => vec![to_value(details)?],
            Self::Committed(details) => vec![to_value(details)?],
        };

        Ok(Event::new(self.method(), args))
    }
}

// ============================================================================
// Tests
// ============================================================================
