//! The notification data model: inbound requests, admitted notifications,
//! lifecycle states, and close reasons.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hints::{HintValue, Hints};
use super::id::NotificationId;
use super::urgency::Urgency;

/// Timeout value meaning "let the daemon decide".
pub const TIMEOUT_UNSPECIFIED: i32 = -1;

/// A `Notify` call as received from the protocol layer, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyRequest {
    /// Sending application.
    #[serde(default)]
    pub app_name: String,
    /// Identity of a notification to replace, `0` for none.
    #[serde(default)]
    pub replaces_id: u32,
    /// Icon name or path.
    #[serde(default)]
    pub icon: String,
    /// Summary line.
    pub summary: String,
    /// Body text.
    #[serde(default)]
    pub body: String,
    /// Flat action list: key, label, key, label, ...
    #[serde(default)]
    pub actions: Vec<String>,
    /// Hint map.
    #[serde(default)]
    pub hints: Hints,
    /// Requested timeout: `-1` daemon default, `0` never, otherwise milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: i32,
}

fn default_timeout() -> i32 {
    TIMEOUT_UNSPECIFIED
}

impl NotifyRequest {
    /// Create a request with the daemon-default timeout.
    pub fn new(app_name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            replaces_id: 0,
            icon: String::new(),
            summary: summary.into(),
            body: String::new(),
            actions: Vec::new(),
            hints: Hints::default(),
            timeout: TIMEOUT_UNSPECIFIED,
        }
    }

    /// Set the body text.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the requested timeout.
    pub fn timeout(mut self, timeout: i32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request replacement of an existing notification.
    pub fn replaces(mut self, id: NotificationId) -> Self {
        self.replaces_id = id.get();
        self
    }

    /// Append an action pair.
    pub fn action(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.actions.push(key.into());
        self.actions.push(label.into());
        self
    }

    /// Add a hint.
    pub fn hint(mut self, key: impl Into<String>, value: impl Into<HintValue>) -> Self {
        self.hints.insert(key, value);
        self
    }

    /// Set the urgency hint.
    pub fn urgency(self, urgency: Urgency) -> Self {
        self.hint(super::hints::HINT_URGENCY, i64::from(urgency.level()))
    }
}

/// An action button offered by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Key reported back in `ActionInvoked`.
    pub key: String,
    /// Human-readable label.
    pub label: String,
}

/// Why a notification left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseReason {
    /// Its timer fired.
    Expired,
    /// A user or control client dismissed it.
    Dismissed,
    /// The sending application called `CloseNotification`.
    ClosedByApp,
    /// Its content was superseded by a replace request.
    Replaced,
    /// A rule blocked it before it became active.
    Blocked,
}

impl CloseReason {
    /// FreeDesktop `NotificationClosed` reason code.
    pub fn code(&self) -> u32 {
        match self {
            Self::Expired => 1,
            Self::Dismissed => 2,
            Self::ClosedByApp => 3,
            Self::Replaced | Self::Blocked => 4,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Dismissed => "dismissed",
            Self::ClosedByApp => "closed-by-app",
            Self::Replaced => "replaced",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single notification.
///
/// `Pending -> Active -> Closed`; nothing ever leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum LifecycleState {
    /// Validated, not yet admitted.
    Pending,
    /// In the active set (visible or DND-suppressed).
    Active,
    /// Terminal.
    Closed(CloseReason),
}

impl LifecycleState {
    /// Whether the state is terminal.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// A notification known to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Daemon-assigned identity.
    pub id: NotificationId,
    /// Sending application.
    pub app_name: String,
    /// The identity the sender asked to replace, if any.
    pub replaces_id: Option<NotificationId>,
    /// Icon name or path.
    pub icon: String,
    /// Summary line.
    pub summary: String,
    /// Body text.
    pub body: String,
    /// Whether the body should be rendered as markup.
    pub markup: bool,
    /// Effective urgency after rule overrides.
    pub urgency: Urgency,
    /// Action buttons.
    pub actions: Vec<Action>,
    /// Hint map as sent by the caller.
    pub hints: Hints,
    /// Effective timeout in milliseconds, `0` = never expires.
    pub timeout_ms: u32,
    /// CSS class assigned by a rule.
    pub css_class: Option<String>,
    /// Never archived into history on close.
    pub history_exempt: bool,
    /// Hidden from the renderer because Do-Not-Disturb was active on arrival.
    pub suppressed: bool,
    /// First admission time; kept across replacements.
    pub created_at: DateTime<Utc>,
    /// Last content change.
    pub updated_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub state: LifecycleState,
}

impl Notification {
    /// Whether the notification never expires on its own.
    pub fn is_persistent(&self) -> bool {
        self.timeout_ms == 0
    }

    /// Look up an action by key.
    pub fn action(&self, key: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.key == key)
    }
}

/// Compact view of a notification for control-client listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSummary {
    /// Identity.
    pub id: NotificationId,
    /// Sending application.
    pub app_name: String,
    /// Summary line.
    pub summary: String,
    /// Effective urgency.
    pub urgency: Urgency,
    /// Effective timeout in milliseconds.
    pub timeout_ms: u32,
    /// Rule-assigned CSS class.
    pub css_class: Option<String>,
    /// Hidden by Do-Not-Disturb.
    pub suppressed: bool,
    /// First admission time.
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationSummary {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            app_name: n.app_name.clone(),
            summary: n.summary.clone(),
            urgency: n.urgency,
            timeout_ms: n.timeout_ms,
            css_class: n.css_class.clone(),
            suppressed: n.suppressed,
            created_at: n.created_at,
        }
    }
}
