//! Control requests.

use serde::{Deserialize, Serialize};

use crate::types::{NotificationId, NotifyRequest};

/// Commands a control client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    /// List active notifications in display order.
    List,
    /// Count active, visible and suppressed notifications.
    Count,
    /// Dismiss one notification.
    Dismiss {
        /// Target.
        id: NotificationId,
    },
    /// Dismiss every active notification.
    DismissAll,
    /// Flip the manual Do-Not-Disturb flag.
    ToggleDnd,
    /// Set the manual Do-Not-Disturb flag.
    SetDnd {
        /// New manual state.
        enabled: bool,
    },
    /// Report Do-Not-Disturb state.
    DndStatus,
    /// List archived notifications, most recent first.
    History {
        /// Return at most this many entries.
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Drop every archived notification.
    ClearHistory,
    /// Invoke an action on an active notification.
    InvokeAction {
        /// Target.
        id: NotificationId,
        /// Action key.
        action: String,
    },
    /// Submit a notification locally, as if it came from the bus.
    Notify {
        /// The request.
        request: NotifyRequest,
    },
}

impl ControlCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Count => "count",
            Self::Dismiss { .. } => "dismiss",
            Self::DismissAll => "dismiss-all",
            Self::ToggleDnd => "toggle-dnd",
            Self::SetDnd { .. } => "set-dnd",
            Self::DndStatus => "dnd-status",
            Self::History { .. } => "history",
            Self::ClearHistory => "clear-history",
            Self::InvokeAction { .. } => "invoke-action",
            Self::Notify { .. } => "notify",
        }
    }
}
