//! Command definitions organized by module.
//!
//! Commands follow the extension API's `module.methodName` format.
//!
//! # Command Modules
//!
//! | Module | Commands |
//! |--------|----------|
//! | `tabs` | get, getAllInWindow, create, insertCSS, query, reload, update |
//! | `windows` | create |
//! | `browserAction` | setBadgeBackgroundColor, setBadgeText, setTitle |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::browser::TabStatus;
use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by module.
///
/// This enum wraps module-specific command enums for unified serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Tabs module commands.
    Tabs(TabsCommand),
    /// Windows module commands.
    Windows(WindowsCommand),
    /// BrowserAction module commands.
    BrowserAction(BrowserActionCommand),
}

impl Command {
    /// Every method name the command surface answers.
    pub const METHODS: [&'static str; 11] = [
        "browserAction.setBadgeBackgroundColor",
        "browserAction.setBadgeText",
        "browserAction.setTitle",
        "tabs.get",
        "tabs.getAllInWindow",
        "tabs.create",
        "tabs.insertCSS",
        "tabs.query",
        "tabs.reload",
        "tabs.update",
        "windows.create",
    ];

    /// Parses a command from its method name and params.
    ///
    /// Missing params are treated as an empty object.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCommand`] if the method is not answered here
    /// - [`Error::InvalidArgument`] if params do not match the method
    pub fn from_parts(method: &str, params: Value) -> Result<Self> {
        if !Self::METHODS.contains(&method) {
            return Err(Error::unknown_command(method));
        }

        let params = match params {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let tagged = json!({ "method": method, "params": params });

        let parsed = match method.split('.').next().unwrap_or_default() {
            "tabs" => serde_json::from_value(tagged).map(Self::Tabs),
            "windows" => serde_json::from_value(tagged).map(Self::Windows),
            _ => serde_json::from_value(tagged).map(Self::BrowserAction),
        };

        parsed.map_err(|e| Error::invalid_argument(format!("{method}: {e}")))
    }

    /// Returns the method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Tabs(command) => command.method(),
            Self::Windows(WindowsCommand::Create(_)) => "windows.create",
            Self::BrowserAction(command) => command.method(),
        }
    }
}

// ============================================================================
// Tabs Commands
// ============================================================================

/// Tabs module commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TabsCommand {
    /// Get one tab's snapshot.
    #[serde(rename = "tabs.get")]
    Get {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// List the tabs in the caller's window.
    #[serde(rename = "tabs.getAllInWindow")]
    GetAllInWindow {
        /// Accepted for compatibility; the caller's window is used.
        #[serde(rename = "windowId", default, skip_serializing_if = "Option::is_none")]
        window_id: Option<WindowId>,
    },

    /// Open a new window with a tab.
    #[serde(rename = "tabs.create")]
    Create(CreateProperties),

    /// Inject CSS into a tab.
    #[serde(rename = "tabs.insertCSS")]
    InsertCss {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Stylesheet to inject.
        details: InjectDetails,
    },

    /// Filter tabs.
    #[serde(rename = "tabs.query")]
    Query(QueryInfo),

    /// Reload a tab.
    #[serde(rename = "tabs.reload")]
    Reload {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Reload options.
        #[serde(rename = "reloadProperties", default)]
        reload_properties: ReloadProperties,
    },

    /// Navigate and/or mute a tab.
    #[serde(rename = "tabs.update")]
    Update {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Properties to apply.
        #[serde(rename = "updateProperties", default)]
        update_properties: UpdateProperties,
    },
}

impl TabsCommand {
    /// Returns the method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::Get { .. } => "tabs.get",
            Self::GetAllInWindow { .. } => "tabs.getAllInWindow",
            Self::Create(_) => "tabs.create",
            Self::InsertCss { .. } => "tabs.insertCSS",
            Self::Query(_) => "tabs.query",
            Self::Reload { .. } => "tabs.reload",
            Self::Update { .. } => "tabs.update",
        }
    }
}

// ============================================================================
// Windows Commands
// ============================================================================

/// Windows module commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum WindowsCommand {
    /// Open a new top-level window.
    #[serde(rename = "windows.create")]
    Create(CreateData),
}

// ============================================================================
// BrowserAction Commands
// ============================================================================

/// BrowserAction module commands.
///
/// Accepted and acknowledged; nothing is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowserActionCommand {
    /// Set badge background color.
    #[serde(rename = "browserAction.setBadgeBackgroundColor")]
    SetBadgeBackgroundColor(Value),

    /// Set badge text.
    #[serde(rename = "browserAction.setBadgeText")]
    SetBadgeText(Value),

    /// Set action title.
    #[serde(rename = "browserAction.setTitle")]
    SetTitle(Value),
}

impl BrowserActionCommand {
    /// Returns the method name.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::SetBadgeBackgroundColor(_) => "browserAction.setBadgeBackgroundColor",
            Self::SetBadgeText(_) => "browserAction.setBadgeText",
            Self::SetTitle(_) => "browserAction.setTitle",
        }
    }
}

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters of `tabs.create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProperties {
    /// URL to load in the new tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Requested activation; the new window decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Parameters of `windows.create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateData {
    /// URL to load in the new window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Parameters of `tabs.insertCSS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectDetails {
    /// Stylesheet source.
    pub code: String,
}

/// Filter of `tabs.query`.
///
/// Unset fields match every tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInfo {
    /// Match the selected state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Match the parent window; [`WindowId::CURRENT`] is the caller's window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
    /// Match the loading state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TabStatus>,
    /// Match the audible flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audible: Option<bool>,
    /// Match the mute state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

/// Parameters of `tabs.reload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadProperties {
    /// Bypass the HTTP cache.
    #[serde(default)]
    pub bypass_cache: bool,
}

/// Parameters of `tabs.update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProperties {
    /// URL to navigate to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Mute state to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_get_serialization() {
        let cmd = TabsCommand::Get {
            tab_id: TabId::new(3),
        };
        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json, json!({"method": "tabs.get", "params": {"tabId": 3}}));
    }

    #[test]
    fn test_from_parts_update() {
        let cmd = Command::from_parts(
            "tabs.update",
            json!({"tabId": 1, "updateProperties": {"url": "https://b.example", "muted": true}}),
        )
        .expect("parse");

        assert_eq!(
            cmd,
            Command::Tabs(TabsCommand::Update {
                tab_id: TabId::new(1),
                update_properties: UpdateProperties {
                    url: Some("https://b.example".into()),
                    muted: Some(true),
                },
            })
        );
        assert_eq!(cmd.method(), "tabs.update");
    }

    #[test]
    fn test_from_parts_query_without_params() {
        let cmd = Command::from_parts("tabs.query", Value::Null).expect("parse");
        assert_eq!(cmd, Command::Tabs(TabsCommand::Query(QueryInfo::default())));
    }

    #[test]
    fn test_from_parts_query_ignores_unknown_filters() {
        let cmd = Command::from_parts("tabs.query", json!({"active": true, "currentWindow": true}))
            .expect("parse");
        match cmd {
            Command::Tabs(TabsCommand::Query(info)) => assert_eq!(info.active, Some(true)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_from_parts_reload_defaults() {
        let cmd = Command::from_parts("tabs.reload", json!({"tabId": 2})).expect("parse");
        assert_eq!(
            cmd,
            Command::Tabs(TabsCommand::Reload {
                tab_id: TabId::new(2),
                reload_properties: ReloadProperties::default(),
            })
        );
    }

    #[test]
    fn test_from_parts_browser_action_any_params() {
        let cmd = Command::from_parts("browserAction.setBadgeText", json!({"text": "3"}))
            .expect("parse");
        assert_eq!(cmd.method(), "browserAction.setBadgeText");
    }

    #[test]
    fn test_from_parts_unknown_method() {
        let err = Command::from_parts("tabs.move", json!({})).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
    }

    #[test]
    fn test_from_parts_missing_tab_id() {
        let err = Command::from_parts("tabs.get", Value::Null).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_all_methods_parse_with_minimal_params() {
        let minimal = json!({
            "tabId": 1,
            "details": {"code": "body{}"},
        });
        for method in Command::METHODS {
            let cmd = Command::from_parts(method, minimal.clone()).expect(method);
            assert_eq!(cmd.method(), method);
        }
    }
}
