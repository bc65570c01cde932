//! End-to-end tab lifecycle against an in-memory environment.
//!
//! Run with logs: `RUST_LOG=webext_tabs=debug cargo test --test lifecycle`

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Once};

use anyhow::{Context as _, Result, ensure};
use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use webext_tabs::browser::{MemoryEnvironment, MemoryTab};
use webext_tabs::protocol::QueryInfo;
use webext_tabs::{Event, ExtensionContext, HostId, Request, TabId, TabSignal, WindowId};

// ============================================================================
// Helpers
// ============================================================================

static LOGGING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`.
fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

const WINDOW: WindowId = WindowId::new(7);

struct Harness {
    context: ExtensionContext,
    env: Arc<MemoryEnvironment>,
    host_id: HostId,
    events: mpsc::Receiver<Event>,
}

impl Harness {
    fn new() -> Result<Self> {
        init_logging();

        let env = MemoryEnvironment::new();
        env.add_window(WINDOW, 1280, 720);

        let context = ExtensionContext::builder()
            .environment(env.clone())
            .build()
            .context("building context")?;
        let (host_id, events) = context.open_host_channel();
        env.attach_host(host_id, WINDOW);

        Ok(Self {
            context,
            env,
            host_id,
            events,
        })
    }

    fn open_tab(&self, id: i32, url: &str, title: &str) -> Arc<MemoryTab> {
        self.env.attach_tab(TabId::new(id), WINDOW);
        let handle = MemoryTab::new(id, url, title);
        self.context.observe_tab(handle.clone());
        handle
    }

    fn next_event(&mut self) -> Result<Event> {
        self.events.try_recv().context("expected an event")
    }

    fn assert_quiet(&mut self) -> Result<()> {
        ensure!(self.events.try_recv().is_err(), "unexpected event");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn tab_lifecycle_scenario() -> Result<()> {
    let mut h = Harness::new()?;

    let tab = MemoryTab::new(1, "https://a.example", "A");
    tab.set_loading(true);
    h.env.attach_tab(TabId::new(1), WINDOW);
    h.context.observe_tab(tab.clone());

    let created = h.next_event()?;
    assert_eq!(created.method, "tabs.onCreated");
    let snapshot = &created.args[0];
    assert_eq!(snapshot["id"], 1);
    assert_eq!(snapshot["status"], "loading");
    assert_eq!(snapshot["url"], "https://a.example");
    assert_eq!(snapshot["title"], "A");
    assert_eq!(snapshot["windowId"], WINDOW.as_i32());

    tab.set_loading(false);
    h.context.handle_signal(TabId::new(1), TabSignal::LoadStopped);
    let updated = h.next_event()?;
    assert_eq!(updated.method, "tabs.onUpdated");
    assert_eq!(updated.args[0], 1);
    assert_eq!(updated.args[1], json!({"status": "complete"}));
    assert_eq!(updated.args[2]["status"], "complete");

    h.context.on_activated(TabId::new(1));
    let activated = h.next_event()?;
    assert_eq!(activated.method, "tabs.onActivated");
    assert_eq!(activated.args[0], json!({"tabId": 1, "windowId": WINDOW.as_i32()}));

    h.context.handle_signal(TabId::new(1), TabSignal::Destroyed);
    let removed = h.next_event()?;
    assert_eq!(removed.method, "tabs.onRemoved");
    assert_eq!(removed.args[0], 1);
    assert_eq!(
        removed.args[1],
        json!({"windowId": WINDOW.as_i32(), "isWindowClosing": false})
    );
    assert!(!h.context.is_cached(TabId::new(1)));

    h.context.handle_signal(TabId::new(1), TabSignal::Destroyed);
    h.assert_quiet()
}

#[test]
fn media_toggles_audible_independently_of_status() -> Result<()> {
    let mut h = Harness::new()?;
    let tab = h.open_tab(1, "https://a.example", "A");
    h.next_event()?;

    tab.set_audible(true);
    h.context.handle_signal(TabId::new(1), TabSignal::MediaStarted);
    assert_eq!(h.next_event()?.args[1], json!({"audible": true}));

    tab.set_audible(false);
    h.context.handle_signal(TabId::new(1), TabSignal::MediaPaused);
    assert_eq!(h.next_event()?.args[1], json!({"audible": false}));

    h.context.handle_signal(TabId::new(1), TabSignal::NavigationRedirected);
    h.assert_quiet()
}

#[tokio::test]
async fn query_active_after_activation() -> Result<()> {
    let h = Harness::new()?;
    h.open_tab(1, "https://a.example", "A");
    h.open_tab(2, "https://b.example", "B");
    h.context.on_activated(TabId::new(2));

    let response = h
        .context
        .dispatch(h.host_id, Request::new("tabs.query", json!({"active": true})))
        .await;
    let tabs = response.into_result()?;

    let tabs = tabs.as_array().context("array result")?;
    ensure!(tabs.len() == 1, "expected one active tab, got {}", tabs.len());
    assert_eq!(tabs[0]["id"], 2);
    assert_eq!(tabs[0]["index"], 0);
    assert_eq!(tabs[0]["active"], true);

    let none = h
        .context
        .query(&QueryInfo {
            active: Some(true),
            muted: Some(true),
            ..Default::default()
        });
    ensure!(none.is_empty(), "no tab is muted");
    Ok(())
}

#[tokio::test]
async fn get_all_in_window_uses_caller_window() -> Result<()> {
    let h = Harness::new()?;
    h.open_tab(1, "https://a.example", "A");
    h.env.add_window(WindowId::new(8), 800, 600);
    h.env.attach_tab(TabId::new(2), WindowId::new(8));
    h.context
        .observe_tab(MemoryTab::new(2, "https://b.example", "B"));

    let response = h
        .context
        .dispatch(
            h.host_id,
            Request::new("tabs.getAllInWindow", json!({"windowId": 8})),
        )
        .await;
    let tabs = response.into_result()?;

    assert_eq!(tabs, json!([h.context.get(TabId::new(1)).map(|s| s.with_index(0))]));
    Ok(())
}

#[tokio::test]
async fn update_then_signals_drive_on_updated() -> Result<()> {
    let mut h = Harness::new()?;
    let tab = h.open_tab(1, "https://a.example", "A");
    h.next_event()?;

    let response = h
        .context
        .dispatch(
            h.host_id,
            Request::new(
                "tabs.update",
                json!({"tabId": 1, "updateProperties": {"url": "https://b.example/"}}),
            ),
        )
        .await;
    let snapshot = response.into_result()?;
    assert_eq!(snapshot["url"], "https://b.example/");
    assert_eq!(snapshot["status"], "loading");

    // The command itself does not broadcast.
    h.assert_quiet()?;

    h.context.handle_signal(TabId::new(1), TabSignal::LoadStarted);
    let updated = h.next_event()?;
    assert_eq!(
        updated.args[1],
        json!({"status": "loading", "url": "https://b.example/"})
    );
    assert_eq!(tab.loaded_urls(), vec!["https://b.example/".to_string()]);
    Ok(())
}

#[tokio::test]
async fn rejected_navigation_is_an_error_response() -> Result<()> {
    let h = Harness::new()?;
    let tab = h.open_tab(1, "https://a.example", "A");

    let response = h
        .context
        .dispatch(
            h.host_id,
            Request::new(
                "tabs.update",
                json!({"tabId": 1, "updateProperties": {"url": "javascript:alert(1)"}}),
            ),
        )
        .await;

    ensure!(response.is_error(), "javascript: must be rejected");
    assert_eq!(response.error.as_deref(), Some("invalid argument"));
    ensure!(tab.loaded_urls().is_empty(), "nothing was loaded");
    Ok(())
}
