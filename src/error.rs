//! Error types for the extension tabs core.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use webext_tabs::{Error, Result, TabId};
//!
//! async fn example(context: &ExtensionContext) -> Result<()> {
//!     context.reload(TabId::new(1), ReloadProperties::default())?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Not found | [`Error::TabNotFound`], [`Error::WindowNotFound`], [`Error::HostNotFound`] |
//! | Invalid input | [`Error::InvalidArgument`], [`Error::UnknownCommand`], [`Error::DisallowedUrl`] |
//! | Delivery | [`Error::DeliveryFailed`], [`Error::MailboxFull`], [`Error::HostClosed`] |
//! | Configuration | [`Error::Config`] |
//! | Environment | [`Error::Environment`], [`Error::Timeout`] |
//! | Transport | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::{HostId, TabId, WindowId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Tab not found.
    ///
    /// Returned when a tab ID does not resolve to a live tab.
    #[error("Tab not found: {tab_id}")]
    TabNotFound {
        /// The missing tab ID.
        tab_id: TabId,
    },

    /// Window not found.
    ///
    /// Returned when a window ID does not resolve.
    #[error("Window not found: {window_id}")]
    WindowNotFound {
        /// The missing window ID.
        window_id: WindowId,
    },

    /// Extension host not registered.
    #[error("Extension host not found: {host_id}")]
    HostNotFound {
        /// The missing host ID.
        host_id: HostId,
    },

    // ========================================================================
    // Invalid Input Errors
    // ========================================================================
    /// Invalid argument in command params.
    ///
    /// Returned when command parameters are malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Unknown command method.
    #[error("Unknown command: {command}")]
    UnknownCommand {
        /// The unrecognized command method.
        command: String,
    },

    /// Navigation URL uses a scheme on the deny-list.
    #[error("URL scheme '{scheme}' is not allowed: {url}")]
    DisallowedUrl {
        /// The rejected URL.
        url: String,
        /// Its scheme.
        scheme: String,
    },

    // ========================================================================
    // Delivery Errors
    // ========================================================================
    /// Event delivery to a host failed.
    #[error("Delivery to {host_id} failed: {message}")]
    DeliveryFailed {
        /// Target host.
        host_id: HostId,
        /// Description of the failure.
        message: String,
    },

    /// Host mailbox is full; the event was dropped for this host.
    #[error("Mailbox full for {host_id}")]
    MailboxFull {
        /// Target host.
        host_id: HostId,
    },

    /// Host is gone; its mailbox receiver was dropped.
    #[error("Extension host closed: {host_id}")]
    HostClosed {
        /// Target host.
        host_id: HostId,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when context configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Environment Errors
    // ========================================================================
    /// The host environment refused or failed an operation.
    #[error("Environment error: {message}")]
    Environment {
        /// Description of the failure.
        message: String,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// WebSocket connection closed.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a tab not found error.
    #[inline]
    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self::TabNotFound { tab_id }
    }

    /// Creates a window not found error.
    #[inline]
    pub fn window_not_found(window_id: WindowId) -> Self {
        Self::WindowNotFound { window_id }
    }

    /// Creates a host not found error.
    #[inline]
    pub fn host_not_found(host_id: HostId) -> Self {
        Self::HostNotFound { host_id }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unknown command error.
    #[inline]
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a disallowed URL error.
    #[inline]
    pub fn disallowed_url(url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self::DisallowedUrl {
            url: url.into(),
            scheme: scheme.into(),
        }
    }

    /// Creates a delivery failure error.
    #[inline]
    pub fn delivery_failed(host_id: HostId, message: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            host_id,
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an environment error.
    #[inline]
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if an ID did not resolve.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TabNotFound { .. } | Self::WindowNotFound { .. } | Self::HostNotFound { .. }
        )
    }

    /// Returns `true` if command input was rejected.
    #[inline]
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::UnknownCommand { .. }
                | Self::DisallowedUrl { .. }
                | Self::Json(_)
        )
    }

    /// Returns `true` if this is an event delivery error.
    #[inline]
    #[must_use]
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::DeliveryFailed { .. } | Self::MailboxFull { .. } | Self::HostClosed { .. }
        )
    }

    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the protocol error code sent in error responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TabNotFound { .. } => "no such tab",
            Self::WindowNotFound { .. } => "no such window",
            Self::HostNotFound { .. } => "no such host",
            Self::InvalidArgument { .. } | Self::DisallowedUrl { .. } | Self::Json(_) => {
                "invalid argument"
            }
            Self::UnknownCommand { .. } => "unknown command",
            Self::Timeout { .. } => "timeout",
            Self::DeliveryFailed { .. } | Self::MailboxFull { .. } | Self::HostClosed { .. } => {
                "delivery failed"
            }
            _ => "unknown error",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
