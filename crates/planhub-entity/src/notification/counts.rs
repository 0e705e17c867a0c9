//! Unread notification counters.

use serde::{Deserialize, Serialize};

/// Per-category unread totals for one user.
///
/// Always recomputed from storage; never maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCounts {
    /// Unread SYSTEM notifications.
    pub system_count: i64,
    /// Unread CHAT notifications.
    pub chat_count: i64,
}

impl UnreadCounts {
    /// Sum of both categories.
    pub fn total(&self) -> i64 {
        self.system_count + self.chat_count
    }
}
