//! DND controller.
//!
//! The effective state is `scheduled || manual`: inside a scheduled window
//! DND is forced on, outside of one the manual flag decides. Toggling always
//! flips the manual flag, so a toggle made inside a window only shows once
//! the window ends.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use tracing::info;

use notifyd_core::config::DndConfig;
use notifyd_core::control::DndStatus;
use notifyd_core::error::AppError;

use super::schedule::DndSchedule;

/// Do-Not-Disturb gate.
#[derive(Debug)]
pub struct DndController {
    manual: bool,
    schedule: DndSchedule,
    /// Effective state as of the last evaluation.
    active: bool,
}

impl DndController {
    /// Build from configuration and evaluate the schedule at `now`.
    pub fn new(config: &DndConfig, now: NaiveDateTime) -> Result<Self, AppError> {
        let schedule = DndSchedule::from_config(&config.schedule)?;
        let active = config.enabled || schedule.is_active_at(now);
        Ok(Self {
            manual: config.enabled,
            schedule,
            active,
        })
    }

    /// Effective state as of the last evaluation.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Effective state at `at`, without recording it.
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.manual || self.schedule.is_active_at(at)
    }

    /// The manual flag.
    pub fn manual(&self) -> bool {
        self.manual
    }

    /// Re-evaluate at `now`. Returns the new effective state if it changed.
    pub fn refresh(&mut self, now: NaiveDateTime) -> Option<bool> {
        let active = self.is_active_at(now);
        if active == self.active {
            return None;
        }
        self.active = active;
        info!(
            "Do-Not-Disturb {} ({})",
            if active { "enabled" } else { "disabled" },
            if self.schedule.is_active_at(now) {
                "schedule"
            } else {
                "manual"
            }
        );
        Some(active)
    }

    /// Flip the manual flag. Returns the new effective state if it changed.
    pub fn toggle(&mut self, now: NaiveDateTime) -> Option<bool> {
        self.manual = !self.manual;
        self.refresh(now)
    }

    /// Set the manual flag. Returns the new effective state if it changed.
    pub fn set(&mut self, enabled: bool, now: NaiveDateTime) -> Option<bool> {
        self.manual = enabled;
        self.refresh(now)
    }

    /// Status report at `now`. `until` is only set while the window alone
    /// keeps DND on; with the manual flag set there is no known end.
    pub fn status(&self, now: NaiveDateTime) -> DndStatus {
        let window_end = self.schedule.active_until(now);
        DndStatus {
            active: self.manual || window_end.is_some(),
            manual: self.manual,
            scheduled: window_end.is_some(),
            until: if self.manual {
                None
            } else {
                window_end.and_then(to_local)
            },
        }
    }
}

fn to_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    Local.from_local_datetime(&naive).earliest()
}
