//! Request handler.
//!
//! Every state transition of a notification goes through here:
//!
//! ```text
//! Notify ─► validate ─► rules ─► DND ─► registry ─► scheduler ─► events
//!                                          │
//! expiry / dismiss / close ─► registry ─► history ─► events
//! ```
//!
//! The handler is owned by the engine loop and never shared, so no method
//! holds a lock or awaits.

pub mod validate;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use notifyd_core::config::{AppConfig, TimeoutConfig};
use notifyd_core::control::{CountSummary, DndStatus};
use notifyd_core::error::AppError;
use notifyd_core::events::{ProtocolSignal, RendererEvent};
use notifyd_core::types::{
    CloseReason, HistoryEntry, Notification, NotificationId, NotificationSummary, NotifyRequest,
};

use crate::dnd::{Clock, DndController};
use crate::history::HistoryStore;
use crate::registry::{Admission, NewNotification, Registry};
use crate::rules::RuleMatcher;
use crate::scheduler::Expiry;
use crate::sink::EventSink;

pub use validate::{Candidate, validate};

/// Owner of all notification state.
#[derive(Debug)]
pub struct RequestHandler {
    registry: Registry,
    rules: RuleMatcher,
    history: HistoryStore,
    dnd: DndController,
    timeouts: TimeoutConfig,
    max_visible: usize,
    markup: bool,
    keep_replaced: bool,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl RequestHandler {
    /// Build every component from a validated configuration.
    pub fn new(
        config: &AppConfig,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        expiry_tx: tokio::sync::mpsc::UnboundedSender<Expiry>,
    ) -> Result<Self, AppError> {
        let rules = RuleMatcher::new(&config.rules)?;
        let dnd = DndController::new(&config.dnd, clock.now())?;
        info!(
            "Request handler ready: {} rules, history capacity {}, DND {}",
            rules.len(),
            config.history.max_entries,
            if dnd.is_active() { "on" } else { "off" }
        );

        Ok(Self {
            registry: Registry::new(&config.general, expiry_tx),
            rules,
            history: HistoryStore::from_config(&config.history),
            dnd,
            timeouts: config.timeouts.clone(),
            max_visible: config.general.max_visible,
            markup: config.general.markup,
            keep_replaced: config.history.keep_replaced,
            sink,
            clock,
        })
    }

    // ── Inbound protocol ─────────────────────────────────────────

    /// Handle a `Notify` call and return the notification's identity.
    pub fn notify(&mut self, request: NotifyRequest) -> Result<NotificationId, AppError> {
        let candidate = validate(request).inspect_err(|e| {
            debug!("Rejected notification: {}", e.message);
        })?;
        let actions = self.rules.evaluate(&candidate);

        let urgency = actions.urgency.unwrap_or(candidate.urgency);
        let history_exempt = actions.skips_history() || candidate.hints.is_transient();

        if actions.blocks() {
            return self.block(candidate, urgency, actions.css_class, history_exempt);
        }

        let timeout_ms = actions
            .timeout
            .or(candidate.requested_timeout)
            .unwrap_or_else(|| self.timeouts.for_urgency(urgency));

        let dnd_active = self.dnd_active();
        // A replacement stays hidden unless its new urgency bypasses DND.
        let suppressed = match candidate
            .replaces_id
            .and_then(|id| self.registry.get(id).ok())
        {
            Some(existing) => existing.suppressed && !urgency.bypasses_dnd(),
            None => dnd_active && !urgency.bypasses_dnd(),
        };

        let draft = NewNotification {
            app_name: candidate.app_name,
            replaces_id: candidate.replaces_id,
            icon: candidate.icon,
            summary: candidate.summary,
            body: candidate.body,
            markup: self.markup,
            urgency,
            actions: candidate.actions,
            hints: candidate.hints,
            timeout_ms,
            css_class: actions.css_class,
            history_exempt,
            suppressed,
        };

        match self.registry.admit(draft)? {
            Admission::Created(notification) => {
                let id = notification.id;
                info!(
                    "Notification {} from '{}' admitted ({}, timeout {}ms{})",
                    id,
                    notification.app_name,
                    notification.urgency,
                    notification.timeout_ms,
                    if notification.suppressed {
                        ", suppressed by DND"
                    } else {
                        ""
                    }
                );
                if !notification.suppressed {
                    self.sink
                        .renderer(RendererEvent::NotificationAdded { notification });
                }
                Ok(id)
            }
            Admission::Replaced {
                current, previous, ..
            } => {
                let id = current.id;
                debug!("Notification {} replaced by '{}'", id, current.app_name);
                let surfaced = previous.suppressed && !current.suppressed;
                if self.keep_replaced {
                    self.history
                        .append(HistoryEntry::archive(previous, CloseReason::Replaced));
                }
                if surfaced {
                    info!("Notification {} surfaced through DND as {}", id, current.urgency);
                    self.sink.renderer(RendererEvent::NotificationAdded {
                        notification: current,
                    });
                } else if !current.suppressed {
                    self.sink.renderer(RendererEvent::NotificationUpdated {
                        notification: current,
                    });
                }
                Ok(id)
            }
        }
    }

    /// A blocked candidate gets an identity and goes straight to history.
    fn block(
        &mut self,
        candidate: Candidate,
        urgency: notifyd_core::types::Urgency,
        css_class: Option<String>,
        history_exempt: bool,
    ) -> Result<NotificationId, AppError> {
        let id = self.registry.allocate_id()?;
        let now = Utc::now();
        let notification = NewNotification {
            app_name: candidate.app_name,
            replaces_id: candidate.replaces_id,
            icon: candidate.icon,
            summary: candidate.summary,
            body: candidate.body,
            markup: self.markup,
            urgency,
            actions: candidate.actions,
            hints: candidate.hints,
            timeout_ms: 0,
            css_class,
            history_exempt,
            suppressed: false,
        }
        .into_notification(id, now, now);

        info!(
            "Notification {} from '{}' blocked by rule",
            id, notification.app_name
        );
        self.history
            .append(HistoryEntry::archive(notification, CloseReason::Blocked));
        Ok(id)
    }

    /// Handle a `CloseNotification` call.
    pub fn close_by_app(&mut self, id: NotificationId) -> Result<(), AppError> {
        self.close(id, CloseReason::ClosedByApp)
    }

    /// Apply a timer expiry. Stale expiries are ignored.
    pub fn on_expiry(&mut self, expiry: Expiry) {
        if let Some(notification) = self.registry.expire(&expiry) {
            self.finish_close(notification, CloseReason::Expired);
        }
    }

    // ── Control operations ───────────────────────────────────────

    /// Close one notification as dismissed.
    pub fn dismiss(&mut self, id: NotificationId) -> Result<(), AppError> {
        self.close(id, CloseReason::Dismissed)
    }

    /// Close every active notification as dismissed, in list order.
    pub fn dismiss_all(&mut self) -> Vec<NotificationId> {
        let ids = self.registry.ids();
        for &id in &ids {
            if let Err(e) = self.close(id, CloseReason::Dismissed) {
                warn!("Dismiss-all skipped notification {}: {}", id, e);
            }
        }
        info!("Dismissed {} notifications", ids.len());
        ids
    }

    /// Report an action invocation. Unless the notification is resident it
    /// is then closed as dismissed.
    pub fn invoke_action(&mut self, id: NotificationId, key: &str) -> Result<(), AppError> {
        let notification = self.registry.get(id)?;
        if notification.action(key).is_none() {
            return Err(AppError::not_found(format!(
                "notification {id} has no action '{key}'"
            )));
        }
        let resident = notification.hints.is_resident();

        info!("Action '{}' invoked on notification {}", key, id);
        self.sink.signal(ProtocolSignal::ActionInvoked {
            id,
            action_key: key.to_string(),
        });

        if !resident {
            self.close(id, CloseReason::Dismissed)?;
        }
        Ok(())
    }

    /// Active notifications in display order.
    pub fn list(&self) -> Vec<NotificationSummary> {
        self.registry
            .list()
            .into_iter()
            .map(NotificationSummary::from)
            .collect()
    }

    /// Active, visible and suppressed counts.
    pub fn count(&self) -> CountSummary {
        CountSummary {
            active: self.registry.len(),
            visible: self.registry.visible(self.max_visible).len(),
            suppressed: self.registry.suppressed_count(),
        }
    }

    /// Full snapshot of one active notification.
    pub fn get(&self, id: NotificationId) -> Result<&Notification, AppError> {
        self.registry.get(id)
    }

    /// What the renderer should currently show.
    pub fn visible(&self) -> Vec<Notification> {
        self.registry
            .visible(self.max_visible)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Flip the manual DND flag.
    pub fn toggle_dnd(&mut self) -> DndStatus {
        let now = self.clock.now();
        let change = self.dnd.toggle(now);
        self.announce_dnd(change);
        self.dnd.status(now)
    }

    /// Set the manual DND flag.
    pub fn set_dnd(&mut self, enabled: bool) -> DndStatus {
        let now = self.clock.now();
        let change = self.dnd.set(enabled, now);
        self.announce_dnd(change);
        self.dnd.status(now)
    }

    /// Current DND status. Re-evaluates the schedule first, so a boundary
    /// crossed since the last tick is announced before it is reported.
    pub fn dnd_status(&mut self) -> DndStatus {
        let now = self.clock.now();
        let change = self.dnd.refresh(now);
        self.announce_dnd(change);
        self.dnd.status(now)
    }

    /// Re-evaluate the DND schedule. Returns the new state on a transition.
    pub fn tick_dnd(&mut self) -> Option<bool> {
        let change = self.dnd.refresh(self.clock.now());
        self.announce_dnd(change);
        change
    }

    /// Up to `limit` history entries, most recent first.
    pub fn history(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        self.history.recent(limit)
    }

    /// Empty the history.
    pub fn clear_history(&mut self) -> usize {
        let removed = self.history.clear();
        info!("Cleared {} history entries", removed);
        removed
    }

    /// The history archive.
    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    /// The history archive, for restoring a persisted copy.
    pub fn history_store_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// The active set.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ── Internals ────────────────────────────────────────────────

    fn close(&mut self, id: NotificationId, reason: CloseReason) -> Result<(), AppError> {
        let notification = self.registry.close(id, reason)?;
        self.finish_close(notification, reason);
        Ok(())
    }

    /// Events and archiving shared by every way of leaving the active set.
    fn finish_close(&mut self, notification: Notification, reason: CloseReason) {
        let id = notification.id;
        if !notification.suppressed {
            self.sink
                .renderer(RendererEvent::NotificationRemoved { id, reason });
        }
        self.sink
            .signal(ProtocolSignal::NotificationClosed { id, reason });
        self.history
            .append(HistoryEntry::archive(notification, reason));
    }

    fn dnd_active(&mut self) -> bool {
        let change = self.dnd.refresh(self.clock.now());
        self.announce_dnd(change);
        self.dnd.is_active()
    }

    fn announce_dnd(&self, change: Option<bool>) {
        if let Some(active) = change {
            self.sink.renderer(RendererEvent::DndChanged { active });
        }
    }
}
