//! Events consumed by the renderer.

use serde::{Deserialize, Serialize};

use crate::types::{CloseReason, Notification, NotificationId};

/// Changes the renderer must reflect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RendererEvent {
    /// A notification became visible.
    NotificationAdded {
        /// Full current snapshot.
        notification: Notification,
    },
    /// A visible notification's content was replaced in place.
    NotificationUpdated {
        /// Full current snapshot.
        notification: Notification,
    },
    /// A visible notification left the active set.
    NotificationRemoved {
        /// Identity.
        id: NotificationId,
        /// Why it closed.
        reason: CloseReason,
    },
    /// The effective Do-Not-Disturb state changed.
    DndChanged {
        /// New state.
        active: bool,
    },
}

impl RendererEvent {
    /// The notification the event refers to, if any.
    pub fn notification_id(&self) -> Option<NotificationId> {
        match self {
            Self::NotificationAdded { notification } | Self::NotificationUpdated { notification } => {
                Some(notification.id)
            }
            Self::NotificationRemoved { id, .. } => Some(*id),
            Self::DndChanged { .. } => None,
        }
    }
}
