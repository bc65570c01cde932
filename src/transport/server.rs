//! WebSocket server that extension hosts attach to.
//!
//! # Connection Flow
//!
//! 1. [`HostServer::bind`] binds a listener (port `0` picks a free port)
//! 2. An accept loop upgrades each TCP connection to WebSocket
//! 3. Each connection becomes a [`HostConnection`] registered as a host
//! 4. Hosts send requests and receive responses plus every broadcast event
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HostServer                 │
//! │             (single port)               │
//! │  ┌─────────────────────────────────┐    │
//! │  │ host-1 → HostConnection         │    │
//! │  │ host-2 → HostConnection         │    │
//! │  └─────────────────────────────────┘    │
//! └─────────────────────────────────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, trace, warn};

use crate::context::ExtensionContext;
use crate::error::{Error, Result};
use crate::identifiers::HostId;

use super::connection::HostConnection;

// ============================================================================
// Constants
// ============================================================================

/// How often the accept loop checks the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// HostServer
// ============================================================================

/// Accepts extension host connections for one context.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use webext_tabs::transport::HostServer;
///
/// let server = HostServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, context).await?;
/// println!("hosts connect to {}", server.ws_url());
/// ```
pub struct HostServer {
    /// Bound address.
    local_addr: SocketAddr,

    /// Context requests are dispatched against.
    context: ExtensionContext,

    /// Live connections by host.
    connections: RwLock<FxHashMap<HostId, HostConnection>>,

    /// Shutdown flag.
    shutdown: AtomicBool,
}

impl std::fmt::Debug for HostServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServer")
            .field("local_addr", &self.local_addr)
            .field("connections", &self.connections.read().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HostServer - Constructor
// ============================================================================

impl HostServer {
    /// Binds the server and starts the accept loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if binding fails.
    pub async fn bind(ip: IpAddr, port: u16, context: ExtensionContext) -> Result<Arc<Self>> {
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;
        let local_addr = listener.local_addr()?;

        let server = Arc::new(Self {
            local_addr,
            context,
            connections: RwLock::new(FxHashMap::default()),
            shutdown: AtomicBool::new(false),
        });

        let server_clone = Arc::clone(&server);
        tokio::spawn(async move {
            server_clone.accept_loop(listener).await;
        });

        info!(port = local_addr.port(), "Host server started");

        Ok(server)
    }
}

// ============================================================================
// HostServer - Public API
// ============================================================================

impl HostServer {
    /// Returns the port the server is bound to.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Returns the bound socket address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the WebSocket URL hosts connect to.
    ///
    /// Format: `ws://{ip}:{port}`
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.prune_closed()
    }

    /// Returns the hosts with an open connection.
    #[must_use]
    pub fn host_ids(&self) -> Vec<HostId> {
        self.connections
            .read()
            .values()
            .filter(|connection| !connection.is_closed())
            .map(HostConnection::host_id)
            .collect()
    }

    /// Closes one host's connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HostNotFound`] if the host is not connected.
    pub fn disconnect(&self, host_id: HostId) -> Result<()> {
        let connection = self
            .connections
            .write()
            .remove(&host_id)
            .ok_or_else(|| Error::host_not_found(host_id))?;

        connection.shutdown();
        debug!(host_id = %host_id, "Host disconnected");
        Ok(())
    }

    /// Stops accepting and closes every connection.
    pub fn shutdown(&self) {
        info!("Host server shutting down");
        self.shutdown.store(true, Ordering::SeqCst);

        let connections: Vec<_> = self.connections.write().drain().collect();
        for (host_id, connection) in connections {
            connection.shutdown();
            debug!(host_id = %host_id, "Connection closed during shutdown");
        }
    }
}

// ============================================================================
// HostServer - Accept Loop
// ============================================================================

impl HostServer {
    /// Background task that accepts new connections.
    async fn accept_loop(self: Arc<Self>, listener: TcpListener) {
        debug!("Accept loop started");

        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                debug!("Accept loop shutting down");
                break;
            }

            // Accept with timeout to allow checking shutdown flag
            match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
                Ok(Ok((stream, addr))) => {
                    let server = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = server.handle_connection(stream, addr).await {
                            warn!(error = %e, ?addr, "Connection handling failed");
                        }
                    });
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Accept failed");
                }
                Err(_) => {
                    self.prune_closed();
                }
            }
        }

        debug!("Accept loop terminated");
    }

    /// Drops connections whose event loop has ended; returns how many remain.
    fn prune_closed(&self) -> usize {
        let mut connections = self.connections.write();
        connections.retain(|host_id, connection| {
            let open = !connection.is_closed();
            if !open {
                trace!(host_id = %host_id, "Pruned closed connection");
            }
            open
        });
        connections.len()
    }

    /// Upgrades one TCP connection and registers it as a host.
    async fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) -> Result<()> {
        debug!(?addr, "New TCP connection");

        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| Error::connection(format!("WebSocket upgrade failed: {e}")))?;

        if self.shutdown.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }

        self.prune_closed();
        let connection = HostConnection::spawn(ws_stream, self.context.clone());
        let host_id = connection.host_id();
        self.connections.write().insert(host_id, connection);

        info!(host_id = %host_id, ?addr, "Extension host connected");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MemoryEnvironment, MemoryTab};
    use crate::identifiers::TabId;
    use crate::protocol::{Event, Request, Response};

    use std::net::Ipv4Addr;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::Message;

    const WAIT: Duration = Duration::from_secs(5);

    fn context() -> ExtensionContext {
        ExtensionContext::builder()
            .environment(MemoryEnvironment::new())
            .build()
            .expect("build")
    }

    async fn bind(context: ExtensionContext) -> Arc<HostServer> {
        HostServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, context)
            .await
            .expect("bind should succeed")
    }

    async fn wait_for_hosts(context: &ExtensionContext, count: usize) {
        timeout(WAIT, async {
            while context.host_count() != count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("host count reached");
    }

    #[tokio::test]
    async fn test_server_bind_random_port() {
        let server = bind(context()).await;

        assert!(server.port() > 0);
        assert_eq!(server.ws_url(), format!("ws://127.0.0.1:{}", server.port()));
        assert_eq!(server.connection_count(), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_disconnect_unknown_host() {
        let server = bind(context()).await;
        let err = server.disconnect(HostId::next()).unwrap_err();
        assert!(err.is_not_found());
        server.shutdown();
    }

    #[tokio::test]
    async fn test_request_response_round_trip() {
        let context = context();
        let server = bind(context.clone()).await;
        let (mut socket, _) = connect_async(server.ws_url()).await.expect("connect");

        let request = Request::new("tabs.get", json!({"tabId": 3}));
        let text = serde_json::to_string(&request).expect("serialize");
        socket.send(Message::Text(text.into())).await.expect("send");

        let frame = timeout(WAIT, socket.next())
            .await
            .expect("response in time")
            .expect("frame")
            .expect("ok");
        let response: Response = serde_json::from_str(frame.to_text().expect("text")).expect("parse");

        assert_eq!(response.id, request.id);
        assert_eq!(response.result, Some(json!({"id": -1})));
        server.shutdown();
    }

    #[tokio::test]
    async fn test_malformed_request_with_id() {
        let server = bind(context()).await;
        let (mut socket, _) = connect_async(server.ws_url()).await.expect("connect");

        let frame = json!({"id": "550e8400-e29b-41d4-a716-446655440000", "params": {}});
        socket
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("send");

        let reply = timeout(WAIT, socket.next())
            .await
            .expect("reply in time")
            .expect("frame")
            .expect("ok");
        let response: Response = serde_json::from_str(reply.to_text().expect("text")).expect("parse");
        assert_eq!(response.error.as_deref(), Some("invalid argument"));
        server.shutdown();
    }

    #[tokio::test]
    async fn test_events_reach_connected_host() {
        let context = context();
        let server = bind(context.clone()).await;
        let (mut socket, _) = connect_async(server.ws_url()).await.expect("connect");
        wait_for_hosts(&context, 1).await;

        context.observe_tab(MemoryTab::new(1, "https://a.example", "A"));

        let frame = timeout(WAIT, socket.next())
            .await
            .expect("event in time")
            .expect("frame")
            .expect("ok");
        let event: Event = serde_json::from_str(frame.to_text().expect("text")).expect("parse");
        assert_eq!(event.method, "tabs.onCreated");
        assert_eq!(event.args[0]["id"], TabId::new(1).as_i32());
        server.shutdown();
    }

    #[tokio::test]
    async fn test_closed_socket_forgets_host() {
        let context = context();
        let server = bind(context.clone()).await;
        let (mut socket, _) = connect_async(server.ws_url()).await.expect("connect");
        wait_for_hosts(&context, 1).await;

        socket.close(None).await.expect("close");
        wait_for_hosts(&context, 0).await;
        server.shutdown();
    }

    #[tokio::test]
    async fn test_closed_connections_are_pruned_without_callers() {
        let context = context();
        let server = bind(context.clone()).await;

        for _ in 0..3 {
            let (mut socket, _) = connect_async(server.ws_url()).await.expect("connect");
            wait_for_hosts(&context, 1).await;
            socket.close(None).await.expect("close");
            wait_for_hosts(&context, 0).await;
        }

        timeout(WAIT, async {
            while !server.connections.read().is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("closed connections pruned by the accept loop");
        server.shutdown();
    }
}
