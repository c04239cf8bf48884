//! Notification registry.
//!
//! The authoritative map of identity to active notification. It owns the
//! ID allocator and the timeout scheduler so that "every active notification
//! has exactly one timer entry" holds by construction: entries are armed on
//! insert and disarmed on removal, in the same call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use notifyd_core::config::{GeneralConfig, SortOrder};
use notifyd_core::error::AppError;
use notifyd_core::types::{
    Action, CloseReason, Hints, LifecycleState, Notification, NotificationId, Urgency,
};

use crate::scheduler::{Expiry, TimeoutScheduler};

/// A fully resolved notification that has not been given an identity yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Sending application.
    pub app_name: String,
    /// Identity the sender asked to replace.
    pub replaces_id: Option<NotificationId>,
    /// Icon name or path.
    pub icon: String,
    /// Summary line.
    pub summary: String,
    /// Body text.
    pub body: String,
    /// Render the body as markup.
    pub markup: bool,
    /// Effective urgency.
    pub urgency: Urgency,
    /// Action buttons.
    pub actions: Vec<Action>,
    /// Hint map.
    pub hints: Hints,
    /// Effective timeout, `0` = never.
    pub timeout_ms: u32,
    /// Rule-assigned CSS class.
    pub css_class: Option<String>,
    /// Never archived.
    pub history_exempt: bool,
    /// Hidden by Do-Not-Disturb.
    pub suppressed: bool,
}

impl NewNotification {
    /// Stamp an identity onto the draft.
    pub fn into_notification(
        self,
        id: NotificationId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Notification {
        Notification {
            id,
            app_name: self.app_name,
            replaces_id: self.replaces_id,
            icon: self.icon,
            summary: self.summary,
            body: self.body,
            markup: self.markup,
            urgency: self.urgency,
            actions: self.actions,
            hints: self.hints,
            timeout_ms: self.timeout_ms,
            css_class: self.css_class,
            history_exempt: self.history_exempt,
            suppressed: self.suppressed,
            created_at,
            updated_at,
            state: LifecycleState::Active,
        }
    }
}

/// Outcome of [`Registry::admit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// A new entry with a freshly allocated identity.
    Created(Notification),
    /// An active entry was overwritten in place.
    Replaced {
        /// The entry as it is now.
        current: Notification,
        /// The superseded content.
        previous: Notification,
        /// Whether the timer was re-armed.
        rearmed: bool,
    },
}

impl Admission {
    /// The notification now in the active set.
    pub fn notification(&self) -> &Notification {
        match self {
            Self::Created(notification) => notification,
            Self::Replaced { current, .. } => current,
        }
    }
}

/// Monotonic identity source. Never wraps.
#[derive(Debug)]
struct IdAllocator {
    next: Option<NotificationId>,
}

impl IdAllocator {
    fn allocate(&mut self) -> Result<NotificationId, AppError> {
        let id = self.next.ok_or_else(|| {
            AppError::id_space_exhausted("notification identifier space exhausted, restart required")
        })?;
        self.next = id.checked_next();
        Ok(id)
    }
}

/// The active set.
#[derive(Debug)]
pub struct Registry {
    active: BTreeMap<NotificationId, Notification>,
    ids: IdAllocator,
    scheduler: TimeoutScheduler,
    sort_order: SortOrder,
    soft_limit: usize,
    hard_limit: Option<usize>,
}

impl Registry {
    /// Create an empty registry. Expiries are posted to `expiry_tx`.
    pub fn new(config: &GeneralConfig, expiry_tx: mpsc::UnboundedSender<Expiry>) -> Self {
        Self {
            active: BTreeMap::new(),
            ids: IdAllocator {
                next: Some(NotificationId::FIRST),
            },
            scheduler: TimeoutScheduler::new(expiry_tx),
            sort_order: config.sort_order,
            soft_limit: config.active_soft_limit,
            hard_limit: config.active_hard_limit,
        }
    }

    /// Reserve the next identity without admitting anything.
    pub fn allocate_id(&mut self) -> Result<NotificationId, AppError> {
        self.ids.allocate()
    }

    /// Insert a notification, or overwrite the active one it replaces.
    ///
    /// A replacement keeps the identity and creation time of the existing
    /// entry, and its timer unless the effective timeout changed. A
    /// `replaces_id` that is not active is ignored and a new identity is
    /// allocated.
    pub fn admit(&mut self, draft: NewNotification) -> Result<Admission, AppError> {
        let now = Utc::now();

        if let Some(target) = draft.replaces_id {
            if let Some(existing) = self.active.get(&target) {
                let previous = existing.clone();
                let current = draft.into_notification(target, previous.created_at, now);

                let rearmed = current.timeout_ms != previous.timeout_ms;
                if rearmed {
                    self.scheduler.arm(target, current.timeout_ms);
                    debug!(
                        "Re-armed notification {} ({}ms -> {}ms)",
                        target, previous.timeout_ms, current.timeout_ms
                    );
                }

                self.active.insert(target, current.clone());
                return Ok(Admission::Replaced {
                    current,
                    previous,
                    rearmed,
                });
            }
            debug!(
                "replaces_id {} is not active, admitting as a new notification",
                target
            );
        }

        if let Some(limit) = self.hard_limit {
            if self.active.len() >= limit {
                warn!(
                    "Rejecting notification from '{}': active set is at its hard limit of {}",
                    draft.app_name, limit
                );
                return Err(AppError::capacity_exceeded(format!(
                    "active notification limit of {limit} reached"
                )));
            }
        }

        let id = self.ids.allocate()?;
        let notification = draft.into_notification(id, now, now);
        self.scheduler.arm(id, notification.timeout_ms);
        self.active.insert(id, notification.clone());

        if self.active.len() > self.soft_limit {
            warn!(
                "{} active notifications exceed the soft limit of {}",
                self.active.len(),
                self.soft_limit
            );
        }

        Ok(Admission::Created(notification))
    }

    /// Look up an active notification.
    pub fn get(&self, id: NotificationId) -> Result<&Notification, AppError> {
        self.active
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("notification {id} is not active")))
    }

    /// Whether `id` is in the active set.
    pub fn contains(&self, id: NotificationId) -> bool {
        self.active.contains_key(&id)
    }

    /// Remove an entry and disarm its timer. A second close of the same
    /// identity reports `NotFound`.
    pub fn close(
        &mut self,
        id: NotificationId,
        reason: CloseReason,
    ) -> Result<Notification, AppError> {
        let mut notification = self
            .active
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("notification {id} is not active")))?;
        self.scheduler.disarm(id);
        notification.state = LifecycleState::Closed(reason);
        info!("Closed notification {} ({})", id, reason);
        Ok(notification)
    }

    /// Apply a timer expiry. Returns the closed notification, or `None` when
    /// the expiry is stale.
    pub fn expire(&mut self, expiry: &Expiry) -> Option<Notification> {
        if !self.scheduler.claim(expiry) {
            return None;
        }
        let mut notification = self.active.remove(&expiry.id)?;
        notification.state = LifecycleState::Closed(CloseReason::Expired);
        info!("Notification {} expired", expiry.id);
        Some(notification)
    }

    /// Every active notification in the configured sort order.
    pub fn list(&self) -> Vec<&Notification> {
        match self.sort_order {
            SortOrder::NewestFirst => self.active.values().rev().collect(),
            SortOrder::OldestFirst => self.active.values().collect(),
            SortOrder::UrgencyDescending => {
                let mut list: Vec<&Notification> = self.active.values().rev().collect();
                list.sort_by(|a, b| b.urgency.cmp(&a.urgency));
                list
            }
        }
    }

    /// The notifications a renderer shows: not suppressed, in sort order,
    /// at most `max`.
    pub fn visible(&self, max: usize) -> Vec<&Notification> {
        self.list()
            .into_iter()
            .filter(|n| !n.suppressed)
            .take(max)
            .collect()
    }

    /// Identities in sort order.
    pub fn ids(&self) -> Vec<NotificationId> {
        self.list().into_iter().map(|n| n.id).collect()
    }

    /// Number of active notifications.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether nothing is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of DND-suppressed notifications.
    pub fn suppressed_count(&self) -> usize {
        self.active.values().filter(|n| n.suppressed).count()
    }

    /// Read access to the timers.
    pub fn scheduler(&self) -> &TimeoutScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn draft(app: &str, summary: &str, timeout_ms: u32) -> NewNotification {
        NewNotification {
            app_name: app.to_string(),
            replaces_id: None,
            icon: String::new(),
            summary: summary.to_string(),
            body: String::new(),
            markup: true,
            urgency: Urgency::Normal,
            actions: Vec::new(),
            hints: Hints::new(),
            timeout_ms,
            css_class: None,
            history_exempt: false,
            suppressed: false,
        }
    }

    fn registry(config: GeneralConfig) -> (Registry, mpsc::UnboundedReceiver<Expiry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Registry::new(&config, tx), rx)
    }

    fn admit_new(registry: &mut Registry, summary: &str) -> NotificationId {
        match registry.admit(draft("app", summary, 0)).unwrap() {
            Admission::Created(n) => n.id,
            other => panic!("expected a new entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let mut last = 0;
        for i in 0..20 {
            let id = admit_new(&mut registry, &format!("n{i}"));
            assert!(id.get() > last);
            last = id.get();
        }
        // Closing never frees an identity for reuse.
        registry.close(NotificationId(last), CloseReason::Dismissed).unwrap();
        assert!(admit_new(&mut registry, "again").get() > last);
    }

    #[tokio::test]
    async fn test_replace_keeps_identity_and_creation_time() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let id = admit_new(&mut registry, "old");
        let created = registry.get(id).unwrap().created_at;

        let mut update = draft("app", "new", 0);
        update.replaces_id = Some(id);
        let admission = registry.admit(update).unwrap();

        let Admission::Replaced {
            current,
            previous,
            rearmed,
        } = admission
        else {
            panic!("expected a replacement");
        };
        assert_eq!(current.id, id);
        assert_eq!(current.created_at, created);
        assert_eq!(current.summary, "new");
        assert_eq!(previous.summary, "old");
        assert!(!rearmed);
        assert_eq!(registry.len(), 1);
        assert!(registry.scheduler().has_entry(id));
    }

    #[tokio::test]
    async fn test_replace_with_different_timeout_rearms() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let id = admit_new(&mut registry, "old");
        let before = registry.scheduler().generation(id).unwrap();

        let mut update = draft("app", "new", 4000);
        update.replaces_id = Some(id);
        let admission = registry.admit(update).unwrap();
        assert!(matches!(admission, Admission::Replaced { rearmed: true, .. }));
        assert!(registry.scheduler().generation(id).unwrap() > before);
        assert!(registry.scheduler().is_armed(id));
    }

    #[tokio::test]
    async fn test_replace_of_inactive_id_allocates_fresh() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let id = admit_new(&mut registry, "old");
        registry.close(id, CloseReason::Expired).unwrap();

        let mut revival = draft("app", "again", 0);
        revival.replaces_id = Some(id);
        let admission = registry.admit(revival).unwrap();
        let Admission::Created(n) = admission else {
            panic!("closed notifications are never revived");
        };
        assert!(n.id > id);
    }

    #[tokio::test]
    async fn test_double_close_is_not_found() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let id = admit_new(&mut registry, "once");
        let closed = registry.close(id, CloseReason::Dismissed).unwrap();
        assert_eq!(closed.state, LifecycleState::Closed(CloseReason::Dismissed));
        assert!(!registry.scheduler().has_entry(id));
        assert!(registry.close(id, CloseReason::Dismissed).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sort_orders_and_visible_cap() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let a = admit_new(&mut registry, "a");
        let b = admit_new(&mut registry, "b");
        let c = admit_new(&mut registry, "c");
        assert_eq!(registry.ids(), vec![c, b, a]);
        let visible: Vec<_> = registry.visible(2).iter().map(|n| n.id).collect();
        assert_eq!(visible, vec![c, b]);
        assert_eq!(registry.len(), 3);

        let (mut oldest, _rx) = registry_with(SortOrder::OldestFirst);
        let a = admit_new(&mut oldest, "a");
        let b = admit_new(&mut oldest, "b");
        assert_eq!(oldest.ids(), vec![a, b]);

        let (mut urgent, _rx) = registry_with(SortOrder::UrgencyDescending);
        let low = {
            let mut d = draft("app", "low", 0);
            d.urgency = Urgency::Low;
            urgent.admit(d).unwrap().notification().id
        };
        let critical = {
            let mut d = draft("app", "critical", 0);
            d.urgency = Urgency::Critical;
            urgent.admit(d).unwrap().notification().id
        };
        let normal = admit_new(&mut urgent, "normal");
        assert_eq!(urgent.ids(), vec![critical, normal, low]);
    }

    fn registry_with(order: SortOrder) -> (Registry, mpsc::UnboundedReceiver<Expiry>) {
        registry(GeneralConfig {
            sort_order: order,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_visible_skips_suppressed() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        let shown = admit_new(&mut registry, "shown");
        let mut hidden = draft("app", "hidden", 0);
        hidden.suppressed = true;
        registry.admit(hidden).unwrap();

        let visible: Vec<_> = registry.visible(5).iter().map(|n| n.id).collect();
        assert_eq!(visible, vec![shown]);
        assert_eq!(registry.suppressed_count(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_hard_limit_rejects() {
        let (mut registry, _rx) = registry(GeneralConfig {
            active_hard_limit: Some(1),
            ..Default::default()
        });
        let first = admit_new(&mut registry, "first");
        let err = registry.admit(draft("app", "second", 0)).unwrap_err();
        assert_eq!(err.kind, notifyd_core::error::ErrorKind::CapacityExceeded);

        // Replacing does not grow the set and stays allowed.
        let mut update = draft("app", "first again", 0);
        update.replaces_id = Some(first);
        assert!(registry.admit(update).is_ok());
    }

    #[tokio::test]
    async fn test_id_exhaustion_is_fatal() {
        let (mut registry, _rx) = registry(GeneralConfig::default());
        registry.ids.next = Some(NotificationId(u32::MAX));
        assert_eq!(admit_new(&mut registry, "last"), NotificationId(u32::MAX));

        let err = registry.admit(draft("app", "one too many", 0)).unwrap_err();
        assert!(err.kind.is_fatal());
        assert!(registry.allocate_id().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_closes_and_stale_is_ignored() {
        let (mut registry, mut rx) = registry(GeneralConfig::default());
        let id = registry.admit(draft("app", "brief", 100)).unwrap().notification().id;
        let stale_generation = registry.scheduler().generation(id).unwrap();

        tokio::time::advance(Duration::from_millis(100)).await;
        let expiry = rx.recv().await.unwrap();
        let closed = registry.expire(&expiry).unwrap();
        assert_eq!(closed.state, LifecycleState::Closed(CloseReason::Expired));
        assert!(registry.is_empty());

        // Replaying the same event is a no-op.
        assert!(registry.expire(&expiry).is_none());
        assert!(
            registry
                .expire(&Expiry {
                    id,
                    generation: stale_generation
                })
                .is_none()
        );
    }
}
