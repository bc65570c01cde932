//! WebSocket connection and event loop of one extension host.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming requests from the host, dispatched against the context
//! - Outgoing responses, written as each command completes
//! - Events drained from the host's bounded mailbox
//! - Shutdown requests from the server
//!
//! When the loop ends the host is forgotten by the context.

// ============================================================================
// Imports
// ============================================================================

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::context::ExtensionContext;
use crate::error::Error;
use crate::identifiers::{HostId, RequestId};
use crate::protocol::{Event, Request, Response};

// ============================================================================
// Types
// ============================================================================

type WsWriter = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Internal commands for the event loop.
#[derive(Debug)]
enum ConnectionCommand {
    /// Close the socket and stop.
    Shutdown,
}

// ============================================================================
// HostConnection
// ============================================================================

/// A live WebSocket connection to one extension host.
///
/// Cheap to clone; clones control the same event loop.
#[derive(Debug, Clone)]
pub struct HostConnection {
    /// Host this connection serves.
    host_id: HostId,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
}

impl HostConnection {
    /// Registers a host with the context and spawns its event loop.
    pub(crate) fn spawn(ws_stream: WebSocketStream<TcpStream>, context: ExtensionContext) -> Self {
        let (host_id, events) = context.open_host_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(Self::run_event_loop(
            ws_stream, context, host_id, events, command_rx,
        ));

        Self {
            host_id,
            command_tx,
        }
    }

    /// Returns the host ID assigned to this connection.
    #[inline]
    #[must_use]
    pub fn host_id(&self) -> HostId {
        self.host_id
    }

    /// Returns `true` once the event loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Closes the connection.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WebSocketStream<TcpStream>,
        context: ExtensionContext,
        host_id: HostId,
        mut events: mpsc::Receiver<Event>,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();
        let (response_tx, mut response_rx) = mpsc::unbounded_channel::<Response>();

        loop {
            tokio::select! {
                // Requests from the host
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &context, host_id, &response_tx);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!(host_id = %host_id, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(host_id = %host_id, error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!(host_id = %host_id, "WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Completed commands
                Some(response) = response_rx.recv() => {
                    if !Self::write_frame(&mut ws_write, host_id, &response).await {
                        break;
                    }
                }

                // Broadcast events
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if !Self::write_frame(&mut ws_write, host_id, &event).await {
                                break;
                            }
                        }
                        None => {
                            debug!(host_id = %host_id, "Mailbox closed");
                            break;
                        }
                    }
                }

                // Control from the server
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Shutdown) => {
                            debug!(host_id = %host_id, "Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }
                        None => {
                            debug!(host_id = %host_id, "Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        context.forget_extension_host(host_id);
        debug!(host_id = %host_id, "Event loop terminated");
    }

    /// Parses one text frame and dispatches it on its own task.
    fn handle_incoming_message(
        text: &str,
        context: &ExtensionContext,
        host_id: HostId,
        response_tx: &mpsc::UnboundedSender<Response>,
    ) {
        match from_str::<Request>(text) {
            Ok(request) => {
                trace!(host_id = %host_id, id = %request.id, method = %request.method, "Request received");
                let context = context.clone();
                let response_tx = response_tx.clone();
                tokio::spawn(async move {
                    let response = context.dispatch(host_id, request).await;
                    let _ = response_tx.send(response);
                });
            }
            Err(e) => {
                // Answer when the frame still carries a usable id.
                let id = from_str::<Value>(text)
                    .ok()
                    .and_then(|value| value.get("id").cloned())
                    .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

                match id {
                    Some(id) => {
                        let error = Error::invalid_argument(format!("malformed request: {e}"));
                        let _ = response_tx.send(Response::error(id, &error));
                    }
                    None => warn!(host_id = %host_id, text = %text, "Failed to parse incoming message"),
                }
            }
        }
    }

    /// Serializes and writes one frame. Returns `false` if the socket failed.
    async fn write_frame<T: Serialize>(ws_write: &mut WsWriter, host_id: HostId, frame: &T) -> bool {
        let json = match to_string(frame) {
            Ok(json) => json,
            Err(e) => {
                warn!(host_id = %host_id, error = %e, "Failed to serialize frame");
                return true;
            }
        };

        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            warn!(host_id = %host_id, error = %e, "Failed to write frame");
            return false;
        }
        true
    }
}
