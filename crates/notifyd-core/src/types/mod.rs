//! Core type definitions used across the notifyd workspace.

pub mod hints;
pub mod history;
pub mod id;
pub mod notification;
pub mod urgency;

pub use hints::{HintValue, Hints};
pub use history::HistoryEntry;
pub use id::NotificationId;
pub use notification::{
    Action, CloseReason, LifecycleState, Notification, NotificationSummary, NotifyRequest,
};
pub use urgency::Urgency;
