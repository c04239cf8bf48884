//! Archived notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::notification::{CloseReason, LifecycleState, Notification};

/// A frozen snapshot of a closed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The notification as it was when it closed.
    pub notification: Notification,
    /// Why it closed.
    pub reason: CloseReason,
    /// When it closed.
    pub closed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Freeze a notification with its closing reason.
    pub fn archive(mut notification: Notification, reason: CloseReason) -> Self {
        notification.state = LifecycleState::Closed(reason);
        Self {
            notification,
            reason,
            closed_at: Utc::now(),
        }
    }

    /// Whether this entry must not be stored.
    pub fn is_exempt(&self) -> bool {
        self.notification.history_exempt
    }
}
