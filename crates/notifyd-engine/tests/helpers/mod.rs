//! Shared fixtures for engine scenario tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use notifyd_core::config::AppConfig;
use notifyd_core::control::{ControlCommand, ControlData, ControlResponse, CountSummary};
use notifyd_core::error::AppError;
use notifyd_core::events::{ProtocolSignal, RendererEvent};
use notifyd_core::types::{HistoryEntry, NotificationId, NotificationSummary};
use notifyd_engine::dnd::ManualClock;
use notifyd_engine::{Engine, EngineHandle, RecordingSink};

/// A running engine plus everything needed to observe it.
pub struct TestEngine {
    pub handle: EngineHandle,
    pub sink: RecordingSink,
    pub clock: ManualClock,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), AppError>>,
}

/// Friday 2024-06-07, 12:00 local.
pub fn friday_noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 7)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Spawn an engine on the current runtime.
pub fn start(config: AppConfig) -> TestEngine {
    start_at(config, friday_noon())
}

/// Spawn an engine whose clock reads `now`.
pub fn start_at(config: AppConfig, now: NaiveDateTime) -> TestEngine {
    let sink = RecordingSink::new();
    let clock = ManualClock::new(now);
    let (engine, handle) =
        Engine::with_clock(&config, Arc::new(sink.clone()), Arc::new(clock.clone()))
            .expect("engine should build");
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(shutdown_rx));
    TestEngine {
        handle,
        sink,
        clock,
        shutdown,
        task,
    }
}

impl TestEngine {
    pub async fn reply(&self, command: ControlCommand) -> ControlResponse {
        self.handle
            .control(command)
            .await
            .expect("engine should be running")
    }

    pub async fn control(&self, command: ControlCommand) -> ControlData {
        match self.reply(command).await {
            ControlResponse::Ok { data } => data,
            other => panic!("command failed: {other:?}"),
        }
    }

    pub async fn count(&self) -> CountSummary {
        match self.control(ControlCommand::Count).await {
            ControlData::Count(count) => count,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    pub async fn list(&self) -> Vec<NotificationSummary> {
        match self.control(ControlCommand::List).await {
            ControlData::Notifications(list) => list,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        match self.control(ControlCommand::History { limit: None }).await {
            ControlData::History(entries) => entries,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    pub async fn dismiss(&self, id: NotificationId) -> ControlResponse {
        self.reply(ControlCommand::Dismiss { id }).await
    }

    pub fn added_ids(&self) -> Vec<NotificationId> {
        self.sink
            .renderer_events()
            .into_iter()
            .filter_map(|event| match event {
                RendererEvent::NotificationAdded { notification } => Some(notification.id),
                _ => None,
            })
            .collect()
    }

    pub fn closed_signals(&self, id: NotificationId) -> usize {
        self.sink
            .signals()
            .iter()
            .filter(|s| matches!(s, ProtocolSignal::NotificationClosed { id: closed, .. } if *closed == id))
            .count()
    }

    /// Yield until `condition` holds, panicking if it never does.
    pub async fn wait_for(&self, what: &str, condition: impl Fn(&Self) -> bool) {
        for _ in 0..1000 {
            if condition(self) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("timed out waiting for {what}");
    }

    pub async fn stop(self) -> Result<(), AppError> {
        let _ = self.shutdown.send(true);
        self.task.await.expect("engine task should not panic")
    }
}

/// Let spawned tasks and fired timers run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
