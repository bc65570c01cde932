//! Builder pattern for context configuration.
//!
//! Provides a fluent API for configuring and creating [`ExtensionContext`]
//! instances.
//!
//! # Example
//!
//! ```ignore
//! use webext_tabs::ExtensionContext;
//! use webext_tabs::browser::MemoryEnvironment;
//!
//! let context = ExtensionContext::builder()
//!     .environment(MemoryEnvironment::new())
//!     .mailbox_capacity(64)
//!     .build()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use crate::browser::HostEnvironment;
use crate::error::{Error, Result};

use super::core::ExtensionContext;
use super::options::{ContextOptions, NotFoundPolicy};

// ============================================================================
// ContextBuilder
// ============================================================================

/// Builder for configuring an [`ExtensionContext`].
///
/// Use [`ExtensionContext::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ContextBuilder {
    /// Window resolution and creation.
    environment: Option<Arc<dyn HostEnvironment>>,
    /// Tunables.
    options: ContextOptions,
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("has_environment", &self.environment.is_some())
            .field("options", &self.options)
            .finish()
    }
}

// ============================================================================
// ContextBuilder Implementation
// ============================================================================

impl ContextBuilder {
    /// Creates a builder with default options and no environment.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host environment. Required.
    #[inline]
    #[must_use]
    pub fn environment(mut self, environment: Arc<dyn HostEnvironment>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Replaces all options at once.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the command timeout.
    #[inline]
    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.options.command_timeout = timeout;
        self
    }

    /// Sets the per-host mailbox capacity.
    #[inline]
    #[must_use]
    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.options.mailbox_capacity = capacity;
        self
    }

    /// Sets the unknown-tab policy.
    #[inline]
    #[must_use]
    pub fn not_found_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.options.not_found_policy = policy;
        self
    }

    /// Adds a scheme to the navigation deny-list.
    #[inline]
    #[must_use]
    pub fn deny_url_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.options.denied_url_schemes.push(scheme.into());
        self
    }

    /// Builds the context with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no environment is set
    /// - [`Error::Config`] if the options are invalid
    pub fn build(self) -> Result<ExtensionContext> {
        let environment = self.environment.ok_or_else(|| {
            Error::config(
                "Host environment is required. Use .environment() to set it.\n\
                 Example: ExtensionContext::builder().environment(MemoryEnvironment::new())",
            )
        })?;
        self.options.validate()?;

        Ok(ExtensionContext::new(environment, self.options))
    }
}

// ============================================================================
// Tests
// ============================================================================
