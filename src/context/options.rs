//! Context configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use webext_tabs::{ContextOptions, NotFoundPolicy};
//!
//! let options = ContextOptions::new()
//!     .with_command_timeout(Duration::from_secs(5))
//!     .with_not_found_policy(NotFoundPolicy::Report)
//!     .with_denied_scheme("file");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for commands that wait on the host environment.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-host mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Schemes rejected for navigation by default.
pub const DEFAULT_DENIED_SCHEMES: [&str; 1] = ["javascript"];

// ============================================================================
// NotFoundPolicy
// ============================================================================

/// What mutating commands do when the target tab is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Do nothing and answer `null`.
    #[default]
    Absorb,
    /// Answer with a `no such tab` error.
    Report,
}

// ============================================================================
// ContextOptions
// ============================================================================

/// Tunables of an [`ExtensionContext`](crate::ExtensionContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Upper bound for `tabs.create` / `windows.create`.
    pub command_timeout: Duration,

    /// Events buffered per host before deliveries are dropped.
    pub mailbox_capacity: usize,

    /// Unknown-tab behavior of mutating commands.
    pub not_found_policy: NotFoundPolicy,

    /// URL schemes refused for navigation, compared case-insensitively.
    pub denied_url_schemes: Vec<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            not_found_policy: NotFoundPolicy::default(),
            denied_url_schemes: DEFAULT_DENIED_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ContextOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the command timeout.
    #[inline]
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Sets the per-host mailbox capacity.
    #[inline]
    #[must_use]
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Sets the unknown-tab policy.
    #[inline]
    #[must_use]
    pub fn with_not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found_policy = policy;
        self
    }

    /// Adds a scheme to the deny-list.
    #[inline]
    #[must_use]
    pub fn with_denied_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.denied_url_schemes.push(scheme.into());
        self
    }

    /// Replaces the deny-list.
    #[inline]
    #[must_use]
    pub fn with_denied_schemes(mut self, schemes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.denied_url_schemes = schemes.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ContextOptions {
    /// Checks the options for values the context cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero mailbox capacity or timeout.
    pub fn validate(&self) -> Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(Error::config("mailbox_capacity must be greater than 0"));
        }
        if self.command_timeout.is_zero() {
            return Err(Error::config("command_timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Checks a navigation target.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `raw` does not parse as a URL
    /// - [`Error::DisallowedUrl`] if its scheme is denied
    pub fn check_url(&self, raw: &str) -> Result<()> {
        let url = Url::parse(raw)
            .map_err(|e| Error::invalid_argument(format!("invalid URL '{raw}': {e}")))?;

        let scheme = url.scheme();
        if self
            .denied_url_schemes
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(scheme))
        {
            return Err(Error::disallowed_url(raw, scheme));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ContextOptions::default();
        assert_eq!(options.command_timeout.as_secs(), 30);
        assert_eq!(options.mailbox_capacity, 256);
        assert_eq!(options.not_found_policy, NotFoundPolicy::Absorb);
        assert_eq!(options.denied_url_schemes, vec!["javascript".to_string()]);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let options = ContextOptions::new()
            .with_command_timeout(Duration::from_millis(250))
            .with_mailbox_capacity(8)
            .with_not_found_policy(NotFoundPolicy::Report)
            .with_denied_scheme("file");

        assert_eq!(options.command_timeout, Duration::from_millis(250));
        assert_eq!(options.mailbox_capacity, 8);
        assert_eq!(options.denied_url_schemes.len(), 2);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let err = ContextOptions::new()
            .with_mailbox_capacity(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_check_url() {
        let options = ContextOptions::default();
        assert!(options.check_url("https://a.example/path").is_ok());
        assert!(options.check_url("about:blank").is_ok());

        let denied = options.check_url("JavaScript:alert(1)").unwrap_err();
        assert!(matches!(denied, Error::DisallowedUrl { ref scheme, .. } if scheme == "javascript"));

        let invalid = options.check_url("not a url").unwrap_err();
        assert!(matches!(invalid, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_replaced_deny_list() {
        let options = ContextOptions::new().with_denied_schemes(["data"]);
        assert!(options.check_url("javascript:void(0)").is_ok());
        assert!(options.check_url("data:text/html,hi").is_err());
    }
}
