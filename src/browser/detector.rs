//! Field-level change detection between two snapshots.

use super::snapshot::{ChangeInfo, TabSnapshot};

// ============================================================================
// ChangeDetector
// ============================================================================

/// Compares the watched snapshot fields by value.
///
/// Fields outside [`ChangeDetector::WATCHED_FIELDS`] (geometry, `active`,
/// `windowId`, ...) never produce an update on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Wire names of the fields whose changes are reported.
    pub const WATCHED_FIELDS: [&'static str; 9] = [
        "status",
        "url",
        "pinned",
        "audible",
        "discarded",
        "autoDiscardable",
        "mutedInfo",
        "favIconUrl",
        "title",
    ];

    /// Returns the watched fields of `current` that differ from `previous`.
    #[must_use]
    pub fn diff(previous: &TabSnapshot, current: &TabSnapshot) -> ChangeInfo {
        fn changed<T: PartialEq + Clone>(before: &T, after: &T) -> Option<T> {
            (before != after).then(|| after.clone())
        }

        ChangeInfo {
            status: changed(&previous.status, &current.status),
            url: changed(&previous.url, &current.url),
            pinned: changed(&previous.pinned, &current.pinned),
            audible: changed(&previous.audible, &current.audible),
            discarded: changed(&previous.discarded, &current.discarded),
            auto_discardable: changed(&previous.auto_discardable, &current.auto_discardable),
            muted_info: changed(&previous.muted_info, &current.muted_info),
            fav_icon_url: changed(&previous.fav_icon_url, &current.fav_icon_url),
            title: changed(&previous.title, &current.title),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
