//! Command surface answered to extension hosts.
//!
//! Every command replies to its caller only; none broadcasts directly. State
//! changes caused by a command surface later through lifecycle signals.
//!
//! | Method | Result |
//! |--------|--------|
//! | `tabs.get` | snapshot, or `{"id": -1}` |
//! | `tabs.getAllInWindow` | indexed snapshots of the caller's window |
//! | `tabs.create` | snapshot, or `{id, windowId}` |
//! | `tabs.insertCSS` | `null` |
//! | `tabs.query` | filtered, indexed snapshots |
//! | `tabs.reload` | `null` |
//! | `tabs.update` | snapshot after update |
//! | `windows.create` | `{id}` |
//! | `browserAction.*` | `true` |

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;

use serde::Serialize;
use serde_json::{Value, json, to_value};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::browser::{Tab, TabSnapshot};
use crate::error::{Error, Result};
use crate::identifiers::{HostId, TabId, WindowId};
use crate::protocol::{
    BrowserActionCommand, Command, CreateData, CreateProperties, InjectDetails, QueryInfo,
    ReloadProperties, Request, Response, TabsCommand, UpdateProperties, WindowsCommand,
};

use super::core::ExtensionContext;
use super::options::NotFoundPolicy;

// ============================================================================
// CreatedTab
// ============================================================================

/// Result of `tabs.create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CreatedTab {
    /// The new tab is already observed.
    Observed(TabSnapshot),

    /// The new tab is not observed yet.
    Pending {
        /// Tab ID, or `-1` if the environment did not report one.
        id: TabId,
        /// The new window.
        #[serde(rename = "windowId")]
        window_id: WindowId,
    },
}

// ============================================================================
// Dispatch
// ============================================================================

impl ExtensionContext {
    /// Answers one request on behalf of `caller`.
    ///
    /// Never fails: errors become error responses.
    pub async fn dispatch(&self, caller: HostId, request: Request) -> Response {
        debug!(host_id = %caller, method = %request.method, "Dispatching command");

        let outcome = match request.command() {
            Ok(command) => self.execute(caller, command).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => Response::success(request.id, result),
            Err(e) => {
                warn!(host_id = %caller, method = %request.method, error = %e, "Command rejected");
                Response::error(request.id, &e)
            }
        }
    }

    /// Runs a typed command and returns its wire result.
    ///
    /// # Errors
    ///
    /// Propagates the error of the individual operation.
    pub async fn execute(&self, caller: HostId, command: Command) -> Result<Value> {
        let value = match command {
            Command::Tabs(TabsCommand::Get { tab_id }) => match self.get(tab_id) {
                Some(snapshot) => to_value(snapshot)?,
                None => json!({ "id": TabId::NONE }),
            },
            Command::Tabs(TabsCommand::GetAllInWindow { .. }) => {
                to_value(self.get_all_in_window(caller))?
            }
            Command::Tabs(TabsCommand::Create(properties)) => to_value(self.create(properties).await?)?,
            Command::Tabs(TabsCommand::InsertCss { tab_id, details }) => {
                self.insert_css(tab_id, &details)?;
                Value::Null
            }
            Command::Tabs(TabsCommand::Query(info)) => match self.resolve_current_window(caller, info) {
                Some(info) => to_value(self.query(&info))?,
                None => json!([]),
            },
            Command::Tabs(TabsCommand::Reload {
                tab_id,
                reload_properties,
            }) => {
                self.reload(tab_id, &reload_properties)?;
                Value::Null
            }
            Command::Tabs(TabsCommand::Update {
                tab_id,
                update_properties,
            }) => to_value(self.update(tab_id, &update_properties)?)?,
            Command::Windows(WindowsCommand::Create(data)) => {
                let window_id = self.create_window(data).await?;
                json!({ "id": window_id })
            }
            Command::BrowserAction(command) => Value::Bool(self.browser_action(&command)),
        };

        Ok(value)
    }
}

// ============================================================================
// tabs.*
// ============================================================================

impl ExtensionContext {
    /// Returns a tab's snapshot, or `None` for unknown tabs.
    #[must_use]
    pub fn get(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.snapshot_of(tab_id)
    }

    /// Returns the tabs sharing the caller's window, indexed in order.
    ///
    /// Callers without a resolvable window get an empty list.
    #[must_use]
    pub fn get_all_in_window(&self, caller: HostId) -> Vec<TabSnapshot> {
        let Some(window) = self.inner.environment.window_of_host(caller) else {
            debug!(host_id = %caller, "Caller has no window");
            return Vec::new();
        };

        let tabs = self.inner.registry.lock().all();
        tabs.iter()
            .filter(|tab| {
                self.inner
                    .environment
                    .parent_window_of(tab.id())
                    .is_some_and(|parent| parent.id == window.id)
            })
            .filter_map(|tab| self.snapshot_of(tab.id()))
            .enumerate()
            .map(|(index, snapshot)| snapshot.with_index(index))
            .collect()
    }

    /// Opens a new window with a tab loading `properties.url`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] / [`Error::DisallowedUrl`] for a bad URL
    /// - [`Error::Timeout`] if the environment does not answer in time
    /// - whatever the environment reports
    pub async fn create(&self, properties: CreateProperties) -> Result<CreatedTab> {
        if let Some(url) = &properties.url {
            self.inner.options.check_url(url)?;
        }

        let environment = &self.inner.environment;
        let created = self
            .with_timeout("tabs.create", environment.create_window(properties.url))
            .await?;

        if let Some(snapshot) = created.tab_id.and_then(|tab_id| self.snapshot_of(tab_id)) {
            return Ok(CreatedTab::Observed(snapshot));
        }

        Ok(CreatedTab::Pending {
            id: created.tab_id.unwrap_or(TabId::NONE),
            window_id: created.window_id,
        })
    }

    /// Injects a stylesheet into a tab.
    ///
    /// # Errors
    ///
    /// [`Error::TabNotFound`] under [`NotFoundPolicy::Report`]; otherwise
    /// what the tab handle reports.
    pub fn insert_css(&self, tab_id: TabId, details: &InjectDetails) -> Result<()> {
        let Some(tab) = self.resolve_target(tab_id, "tabs.insertCSS")? else {
            return Ok(());
        };
        tab.handle().insert_css(&details.code)
    }

    /// Returns snapshots matching every set filter, indexed in order.
    ///
    /// A `windowId` of [`WindowId::CURRENT`] matches nothing here; requests
    /// dispatched for a host have it resolved to the host's window first.
    #[must_use]
    pub fn query(&self, info: &QueryInfo) -> Vec<TabSnapshot> {
        let tabs = self.inner.registry.lock().all();
        tabs.iter()
            .filter_map(|tab| self.snapshot_of(tab.id()))
            .filter(|snapshot| matches_query(info, snapshot))
            .enumerate()
            .map(|(index, snapshot)| snapshot.with_index(index))
            .collect()
    }

    /// Reloads a tab.
    ///
    /// # Errors
    ///
    /// Same as [`insert_css`](Self::insert_css).
    pub fn reload(&self, tab_id: TabId, properties: &ReloadProperties) -> Result<()> {
        let Some(tab) = self.resolve_target(tab_id, "tabs.reload")? else {
            return Ok(());
        };

        if properties.bypass_cache {
            tab.handle().reload_ignoring_cache()
        } else {
            tab.handle().reload()
        }
    }

    /// Navigates and/or mutes a tab, returning its live snapshot.
    ///
    /// The cache is left alone; the resulting signals update it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] / [`Error::DisallowedUrl`] for a bad URL
    /// - [`Error::TabNotFound`] under [`NotFoundPolicy::Report`]
    pub fn update(&self, tab_id: TabId, properties: &UpdateProperties) -> Result<Option<TabSnapshot>> {
        if let Some(url) = &properties.url {
            self.inner.options.check_url(url)?;
        }

        let Some(tab) = self.resolve_target(tab_id, "tabs.update")? else {
            return Ok(None);
        };

        if let Some(url) = &properties.url {
            tab.handle().load_url(url)?;
        }
        if let Some(muted) = properties.muted {
            tab.handle().set_audio_muted(muted)?;
        }

        Ok(Some(self.build_snapshot(&tab)))
    }
}

// ============================================================================
// windows.* / browserAction.*
// ============================================================================

impl ExtensionContext {
    /// Opens a new top-level window.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub async fn create_window(&self, data: CreateData) -> Result<WindowId> {
        if let Some(url) = &data.url {
            self.inner.options.check_url(url)?;
        }

        let environment = &self.inner.environment;
        let created = self
            .with_timeout("windows.create", environment.create_window(data.url))
            .await?;
        Ok(created.window_id)
    }

    /// Acknowledges a browser action call. Nothing is rendered.
    #[must_use]
    pub fn browser_action(&self, command: &BrowserActionCommand) -> bool {
        debug!(method = command.method(), "Browser action acknowledged");
        true
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl ExtensionContext {
    /// Resolves the target of a mutating command under the not-found policy.
    fn resolve_target(&self, tab_id: TabId, method: &str) -> Result<Option<Tab>> {
        if let Some(tab) = self.lookup_tab(tab_id) {
            return Ok(Some(tab));
        }

        match self.inner.options.not_found_policy {
            NotFoundPolicy::Absorb => {
                debug!(tab_id = %tab_id, method, "Command on unknown tab absorbed");
                Ok(None)
            }
            NotFoundPolicy::Report => Err(Error::tab_not_found(tab_id)),
        }
    }

    /// Replaces a [`WindowId::CURRENT`] filter with the caller's window.
    ///
    /// Returns `None` if the caller has no window, so nothing can match.
    fn resolve_current_window(&self, caller: HostId, mut info: QueryInfo) -> Option<QueryInfo> {
        if info.window_id == Some(WindowId::CURRENT) {
            let window = self.inner.environment.window_of_host(caller)?;
            info.window_id = Some(window.id);
        }
        Some(info)
    }

    /// Bounds an environment call by the command timeout.
    async fn with_timeout<T>(
        &self,
        operation: &str,
        future: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = self.inner.options.command_timeout;
        timeout(limit, future)
            .await
            .map_err(|_| Error::timeout(operation, limit.as_millis() as u64))?
    }
}

/// Returns `true` if the snapshot passes every set filter.
fn matches_query(info: &QueryInfo, snapshot: &TabSnapshot) -> bool {
    info.active.is_none_or(|active| snapshot.active == active)
        && info.window_id.is_none_or(|id| snapshot.window_id == id)
        && info.status.is_none_or(|status| snapshot.status == status)
        && info.audible.is_none_or(|audible| snapshot.audible == audible)
        && info.muted.is_none_or(|muted| snapshot.muted_info.muted == muted)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{HostEnvironment, MemoryEnvironment, MemoryTab, TabStatus};
    use crate::identifiers::RequestId;

    use std::sync::Arc;
    use std::time::Duration;

    fn setup(policy: NotFoundPolicy) -> (ExtensionContext, Arc<MemoryEnvironment>) {
        let env = MemoryEnvironment::new();
        env.add_window(WindowId::new(1), 1280, 720);
        env.add_window(WindowId::new(2), 640, 480);
        let context = ExtensionContext::builder()
            .environment(env.clone())
            .not_found_policy(policy)
            .command_timeout(Duration::from_millis(200))
            .build()
            .expect("build");
        (context, env)
    }

    fn add_tab(
        context: &ExtensionContext,
        env: &MemoryEnvironment,
        id: i32,
        window: i32,
    ) -> Arc<MemoryTab> {
        env.attach_tab(TabId::new(id), WindowId::new(window));
        let handle = MemoryTab::new(id, &format!("https://{id}.example/"), "T");
        context.observe_tab(handle.clone());
        handle
    }

    #[test]
    fn test_get_unknown_tab_is_none_sentinel() {
        let (context, _env) = setup(NotFoundPolicy::Report);
        assert!(context.get(TabId::new(5)).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_get_unknown_tab() {
        let (context, _env) = setup(NotFoundPolicy::Report);
        let request = Request::new("tabs.get", json!({"tabId": 5}));

        let response = context.dispatch(HostId::next(), request).await;
        assert!(response.is_success());
        assert_eq!(response.result, Some(json!({"id": -1})));
    }

    #[test]
    fn test_get_all_in_window_scoped_to_caller() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        add_tab(&context, &env, 1, 1);
        add_tab(&context, &env, 2, 2);
        add_tab(&context, &env, 3, 1);

        let caller = HostId::next();
        env.attach_host(caller, WindowId::new(1));

        let tabs = context.get_all_in_window(caller);
        let ids: Vec<_> = tabs.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TabId::new(1), TabId::new(3)]);
        assert_eq!(tabs[1].index, Some(1));
    }

    #[test]
    fn test_get_all_in_window_without_caller_window() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        add_tab(&context, &env, 1, 1);
        assert!(context.get_all_in_window(HostId::next()).is_empty());
    }

    #[tokio::test]
    async fn test_query_current_window_uses_caller() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        add_tab(&context, &env, 1, 1);
        add_tab(&context, &env, 2, 2);

        let caller = HostId::next();
        env.attach_host(caller, WindowId::new(2));

        let request = Request::new("tabs.query", json!({"windowId": -2}));
        let result = context.dispatch(caller, request).await.into_result().expect("query");
        let tabs = result.as_array().expect("array");
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0]["id"], 2);

        let request = Request::new("tabs.query", json!({"windowId": -2}));
        let result = context
            .dispatch(HostId::next(), request)
            .await
            .into_result()
            .expect("query");
        assert_eq!(result, json!([]));
    }

    #[test]
    fn test_query_filters() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        add_tab(&context, &env, 1, 1);
        let loading = add_tab(&context, &env, 2, 2);
        add_tab(&context, &env, 3, 1);
        context.on_activated(TabId::new(3));

        let all = context.query(&QueryInfo::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].index, Some(2));

        let active = context.query(&QueryInfo {
            active: Some(true),
            ..Default::default()
        });
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, TabId::new(3));
        assert_eq!(active[0].index, Some(0));

        let in_window = context.query(&QueryInfo {
            window_id: Some(WindowId::new(2)),
            ..Default::default()
        });
        assert_eq!(in_window.len(), 1);

        loading.set_loading(true);
        context.on_updated(TabId::new(2));
        let by_status = context.query(&QueryInfo {
            status: Some(TabStatus::Loading),
            ..Default::default()
        });
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].id, TabId::new(2));
    }

    #[test]
    fn test_insert_css_and_reload() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        let handle = add_tab(&context, &env, 1, 1);

        context
            .insert_css(TabId::new(1), &InjectDetails { code: "body{}".into() })
            .expect("css");
        context
            .reload(TabId::new(1), &ReloadProperties { bypass_cache: true })
            .expect("reload");
        context
            .reload(TabId::new(1), &ReloadProperties::default())
            .expect("reload");

        assert_eq!(handle.inserted_css(), vec!["body{}".to_string()]);
        assert_eq!(handle.reloads(), vec![true, false]);
    }

    #[test]
    fn test_not_found_policy() {
        let (absorbing, _env) = setup(NotFoundPolicy::Absorb);
        assert!(absorbing.reload(TabId::new(9), &ReloadProperties::default()).is_ok());
        assert_eq!(
            absorbing
                .update(TabId::new(9), &UpdateProperties::default())
                .expect("absorbed"),
            None
        );

        let (reporting, _env) = setup(NotFoundPolicy::Report);
        let err = reporting
            .insert_css(TabId::new(9), &InjectDetails { code: String::new() })
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_navigates_and_unmutes() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        let handle = add_tab(&context, &env, 1, 1);

        let muted = context
            .update(
                TabId::new(1),
                &UpdateProperties {
                    url: Some("https://b.example/".into()),
                    muted: Some(true),
                },
            )
            .expect("update")
            .expect("snapshot");
        assert_eq!(muted.url, "https://b.example/");
        assert!(muted.muted_info.muted);
        assert_eq!(handle.loaded_urls(), vec!["https://b.example/".to_string()]);

        let unmuted = context
            .update(
                TabId::new(1),
                &UpdateProperties {
                    url: None,
                    muted: Some(false),
                },
            )
            .expect("update")
            .expect("snapshot");
        assert!(!unmuted.muted_info.muted);
    }

    #[test]
    fn test_update_rejects_javascript_url() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        let handle = add_tab(&context, &env, 1, 1);

        let err = context
            .update(
                TabId::new(1),
                &UpdateProperties {
                    url: Some("javascript:alert(1)".into()),
                    muted: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::DisallowedUrl { .. }));
        assert!(handle.loaded_urls().is_empty());
    }

    #[tokio::test]
    async fn test_create_opens_window() {
        let (context, env) = setup(NotFoundPolicy::Absorb);

        let created = context
            .create(CreateProperties {
                url: Some("https://a.example/".into()),
                active: None,
            })
            .await
            .expect("create");

        match created {
            CreatedTab::Pending { id, window_id } => {
                assert_eq!(id, TabId::NONE);
                assert!(env.window(window_id).is_some());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(env.created_urls(), vec![Some("https://a.example/".to_string())]);
    }

    #[tokio::test]
    async fn test_create_times_out() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        env.set_create_delay(Duration::from_secs(5));

        let err = context.create_window(CreateData::default()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_dispatch_windows_create() {
        let (context, _env) = setup(NotFoundPolicy::Absorb);
        let request = Request::new("windows.create", json!({"url": "https://a.example/"}));

        let response = context.dispatch(HostId::next(), request).await;
        let result = response.into_result().expect("success");
        assert!(result["id"].as_i64().is_some_and(|id| id >= 100));
    }

    #[tokio::test]
    async fn test_dispatch_browser_action() {
        let (context, _env) = setup(NotFoundPolicy::Absorb);
        for method in [
            "browserAction.setBadgeBackgroundColor",
            "browserAction.setBadgeText",
            "browserAction.setTitle",
        ] {
            let response = context
                .dispatch(HostId::next(), Request::new(method, json!({"text": "1"})))
                .await;
            assert_eq!(response.result, Some(json!(true)));
        }
    }

    #[tokio::test]
    async fn test_dispatch_errors_become_responses() {
        let (context, _env) = setup(NotFoundPolicy::Report);
        let caller = HostId::next();

        let unknown = context
            .dispatch(caller, Request::new("tabs.discard", json!({})))
            .await;
        assert_eq!(unknown.error.as_deref(), Some("unknown command"));

        let missing = context
            .dispatch(caller, Request::new("tabs.reload", json!({"tabId": 4})))
            .await;
        assert_eq!(missing.error.as_deref(), Some("no such tab"));

        let malformed = context
            .dispatch(caller, Request::new("tabs.get", json!({"tabId": "x"})))
            .await;
        assert_eq!(malformed.error.as_deref(), Some("invalid argument"));
    }

    #[tokio::test]
    async fn test_dispatch_preserves_request_id() {
        let (context, _env) = setup(NotFoundPolicy::Absorb);
        let request = Request {
            id: RequestId::generate(),
            method: "tabs.query".into(),
            params: Value::Null,
        };
        let id = request.id;

        let response = context.dispatch(HostId::next(), request).await;
        assert_eq!(response.id, id);
        assert_eq!(response.result, Some(json!([])));
    }

    #[test]
    fn test_commands_do_not_broadcast() {
        let (context, env) = setup(NotFoundPolicy::Absorb);
        add_tab(&context, &env, 1, 1);
        let (_host, mut events) = context.open_host_channel();

        context
            .reload(TabId::new(1), &ReloadProperties::default())
            .expect("reload");
        let _ = context.query(&QueryInfo::default());

        assert!(events.try_recv().is_err());
    }
}
