//! Signals handed to the bus transport.

use serde::{Deserialize, Serialize};

use crate::types::{CloseReason, NotificationId};

/// Outward protocol signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolSignal {
    /// `NotificationClosed(id, reason)`.
    NotificationClosed {
        /// Identity.
        id: NotificationId,
        /// Why it closed; see [`CloseReason::code`] for the wire value.
        reason: CloseReason,
    },
    /// `ActionInvoked(id, action_key)`.
    ActionInvoked {
        /// Identity.
        id: NotificationId,
        /// The invoked action's key.
        action_key: String,
    },
}
