//! Fixtures shared by unit tests.

use chrono::Utc;

use notifyd_core::types::{Hints, LifecycleState, Notification, NotificationId, Urgency};

/// A plain active notification.
pub(crate) fn notification(id: u32, app_name: &str, summary: &str) -> Notification {
    let now = Utc::now();
    Notification {
        id: NotificationId(id),
        app_name: app_name.to_string(),
        replaces_id: None,
        icon: String::new(),
        summary: summary.to_string(),
        body: String::new(),
        markup: true,
        urgency: Urgency::Normal,
        actions: Vec::new(),
        hints: Hints::new(),
        timeout_ms: 5000,
        css_class: None,
        history_exempt: false,
        suppressed: false,
        created_at: now,
        updated_at: now,
        state: LifecycleState::Active,
    }
}
