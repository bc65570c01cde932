//! Type-safe identifiers for tabs, windows, hosts, frames and requests.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//! All numeric IDs serialize transparently as plain integers so the wire
//! format matches the extension API (`tabId: 1`, `windowId: -1`).
//!
//! | Type | Wire type | Sentinels |
//! |------|-----------|-----------|
//! | [`TabId`] | integer | [`TabId::NONE`] (`-1`) |
//! | [`WindowId`] | integer | [`WindowId::NONE`] (`-1`), [`WindowId::CURRENT`] (`-2`) |
//! | [`FrameId`] | integer | [`FrameId::main()`] (`0`), [`FrameId::NO_PARENT`] (`-1`) |
//! | [`HostId`] | integer | none, allocated by [`HostId::next()`] |
//! | [`RequestId`] | UUID string | none |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// TabId
// ============================================================================

/// Identifier of a browsing surface, assigned by the host environment.
///
/// Stable and unique for the lifetime of the tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i32);

impl TabId {
    /// Sentinel meaning "no such tab".
    pub const NONE: Self = Self(-1);

    /// Creates a tab ID from the host-assigned value.
    #[inline]
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Returns `true` if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TabId {
    #[inline]
    fn from(id: i32) -> Self {
        Self(id)
    }
}

// ============================================================================
// WindowId
// ============================================================================

/// Identifier of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(i32);

impl WindowId {
    /// Sentinel meaning "no window".
    pub const NONE: Self = Self(-1);

    /// Sentinel meaning "the caller's window".
    pub const CURRENT: Self = Self(-2);

    /// Creates a window ID from the host-assigned value.
    #[inline]
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Returns `true` if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for WindowId {
    #[inline]
    fn from(id: i32) -> Self {
        Self(id)
    }
}

// ============================================================================
// FrameId
// ============================================================================

/// Normalized frame identifier.
///
/// The main frame is always `0`; sub-frames carry the host's routing ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(i64);

impl FrameId {
    /// Reported as `parentFrameId` when parent linkage is unknown.
    pub const NO_PARENT: Self = Self(-1);

    /// Returns the main frame ID.
    #[inline]
    #[must_use]
    pub const fn main() -> Self {
        Self(0)
    }

    /// Creates a frame ID from a routing ID.
    #[inline]
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns `true` if this is the main frame.
    #[inline]
    #[must_use]
    pub const fn is_main(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// HostId
// ============================================================================

/// Global counter for extension host IDs.
static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a registered extension host.
///
/// Allocated by the context when a host is observed; never reused within
/// a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(u64);

impl HostId {
    /// Allocates the next host ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host-{}", self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Correlates a command request with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the nil request ID.
    ///
    /// Used when replying to a frame whose ID could not be recovered.
    #[inline]
    #[must_use]
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
