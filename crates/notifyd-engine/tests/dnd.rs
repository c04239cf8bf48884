//! Do-Not-Disturb behaviour through the engine loop.

mod helpers;

use chrono::Duration;

use notifyd_core::config::{AppConfig, DndConfig, DndWindowConfig};
use notifyd_core::control::{ControlCommand, ControlData, CountSummary};
use notifyd_core::events::RendererEvent;
use notifyd_core::types::{NotifyRequest, Urgency};

use helpers::{friday_noon, start, start_at};

#[tokio::test]
async fn test_critical_bypasses_dnd_and_count_tracks_suppressed() {
    let engine = start(AppConfig::default());
    engine.control(ControlCommand::ToggleDnd).await;

    let critical = engine
        .handle
        .notify(NotifyRequest::new("monitor", "Disk failing").urgency(Urgency::Critical))
        .await
        .unwrap();
    let normal = engine
        .handle
        .notify(NotifyRequest::new("chat", "lunch?"))
        .await
        .unwrap();

    assert_eq!(engine.added_ids(), vec![critical]);
    assert_eq!(
        engine.count().await,
        CountSummary {
            active: 2,
            visible: 1,
            suppressed: 1
        }
    );
    let list = engine.list().await;
    assert!(list.iter().any(|n| n.id == normal && n.suppressed));
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_suppressed_stays_hidden_after_dnd_ends() {
    let engine = start(AppConfig::default());
    engine
        .control(ControlCommand::SetDnd { enabled: true })
        .await;
    let id = engine
        .handle
        .notify(NotifyRequest::new("chat", "while away").timeout(0))
        .await
        .unwrap();
    engine
        .control(ControlCommand::SetDnd { enabled: false })
        .await;

    // Still counted as suppressed, and replacing it does not surface it.
    engine
        .handle
        .notify(NotifyRequest::new("chat", "edited").timeout(0).replaces(id))
        .await
        .unwrap();
    assert_eq!(engine.count().await.suppressed, 1);
    assert!(engine.sink.renderer_events().iter().all(|e| e.notification_id() != Some(id)));

    // A new notification after DND ends is shown.
    let shown = engine
        .handle
        .notify(NotifyRequest::new("chat", "back").timeout(0))
        .await
        .unwrap();
    assert_eq!(engine.added_ids(), vec![shown]);
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_dnd_changes_are_announced() {
    let engine = start(AppConfig::default());
    engine.control(ControlCommand::ToggleDnd).await;
    engine.control(ControlCommand::ToggleDnd).await;
    // No transition, no event.
    engine
        .control(ControlCommand::SetDnd { enabled: false })
        .await;

    let changes: Vec<_> = engine
        .sink
        .renderer_events()
        .into_iter()
        .filter_map(|e| match e {
            RendererEvent::DndChanged { active } => Some(active),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![true, false]);
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_scheduled_window_forces_dnd() {
    let config = AppConfig {
        dnd: DndConfig {
            enabled: false,
            schedule: vec![DndWindowConfig {
                start: "12:30".to_string(),
                end: "13:00".to_string(),
                days: Vec::new(),
            }],
        },
        ..Default::default()
    };
    let engine = start_at(config, friday_noon());

    let status = match engine.control(ControlCommand::DndStatus).await {
        ControlData::Dnd(status) => status,
        other => panic!("unexpected reply: {other:?}"),
    };
    assert!(!status.active);

    engine.clock.advance(Duration::minutes(30));
    engine.handle.tick_dnd().await.unwrap();
    let status = match engine.control(ControlCommand::DndStatus).await {
        ControlData::Dnd(status) => status,
        other => panic!("unexpected reply: {other:?}"),
    };
    assert!(status.active && status.scheduled && !status.manual);
    assert!(status.until.is_some());

    // Manual "off" cannot end a scheduled window.
    engine
        .control(ControlCommand::SetDnd { enabled: false })
        .await;
    engine
        .handle
        .notify(NotifyRequest::new("chat", "quiet please"))
        .await
        .unwrap();
    assert!(engine.added_ids().is_empty());

    engine.clock.advance(Duration::minutes(30));
    engine.handle.tick_dnd().await.unwrap();
    let id = engine
        .handle
        .notify(NotifyRequest::new("chat", "after the window"))
        .await
        .unwrap();
    assert_eq!(engine.added_ids(), vec![id]);

    let changes: Vec<_> = engine
        .sink
        .renderer_events()
        .into_iter()
        .filter_map(|e| match e {
            RendererEvent::DndChanged { active } => Some(active),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![true, false]);
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_critical_replace_surfaces_through_dnd() {
    let engine = start(AppConfig::default());
    engine
        .control(ControlCommand::SetDnd { enabled: true })
        .await;
    let id = engine
        .handle
        .notify(NotifyRequest::new("ups", "on battery").timeout(0))
        .await
        .unwrap();
    assert!(engine.added_ids().is_empty());
    assert_eq!(engine.count().await.suppressed, 1);

    let same = engine
        .handle
        .notify(
            NotifyRequest::new("ups", "battery critical")
                .urgency(Urgency::Critical)
                .replaces(id),
        )
        .await
        .unwrap();

    assert_eq!(same, id);
    assert_eq!(engine.added_ids(), vec![id]);
    assert_eq!(
        engine.count().await,
        CountSummary {
            active: 1,
            visible: 1,
            suppressed: 0
        }
    );
    engine.stop().await.unwrap();
}

#[tokio::test]
async fn test_status_announces_boundary_before_tick() {
    let config = AppConfig {
        dnd: DndConfig {
            enabled: false,
            schedule: vec![DndWindowConfig {
                start: "12:30".to_string(),
                end: "13:00".to_string(),
                days: Vec::new(),
            }],
        },
        ..Default::default()
    };
    let engine = start_at(config, friday_noon());

    // Cross into the window without a tick.
    engine.clock.advance(Duration::minutes(31));
    let status = match engine.control(ControlCommand::DndStatus).await {
        ControlData::Dnd(status) => status,
        other => panic!("unexpected reply: {other:?}"),
    };
    assert!(status.active && status.scheduled);
    assert!(
        engine
            .sink
            .renderer_events()
            .contains(&RendererEvent::DndChanged { active: true })
    );

    // Manual on outlasts the window, so no end is reported.
    let status = match engine
        .control(ControlCommand::SetDnd { enabled: true })
        .await
    {
        ControlData::Dnd(status) => status,
        other => panic!("unexpected reply: {other:?}"),
    };
    assert!(status.manual);
    assert_eq!(status.until, None);
    engine.stop().await.unwrap();
}
