//! Outbound event delivery.
//!
//! The engine never talks to the renderer or the bus directly; it hands
//! events to an [`EventSink`]. The daemon uses [`BroadcastSink`], tests use
//! [`RecordingSink`].

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::trace;

use notifyd_core::events::{ProtocolSignal, RendererEvent};

/// Receives everything the engine emits.
///
/// Called from the engine loop while it holds its state, so implementations
/// must not block.
pub trait EventSink: Send + Sync + Debug {
    /// A renderer-facing change.
    fn renderer(&self, event: RendererEvent);

    /// A signal for the bus transport.
    fn signal(&self, signal: ProtocolSignal);
}

/// Fans events out over tokio broadcast channels.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    renderer_tx: broadcast::Sender<RendererEvent>,
    signal_tx: broadcast::Sender<ProtocolSignal>,
}

impl BroadcastSink {
    /// Create a sink whose channels buffer `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (renderer_tx, _) = broadcast::channel(capacity);
        let (signal_tx, _) = broadcast::channel(capacity);
        Self {
            renderer_tx,
            signal_tx,
        }
    }

    /// Subscribe to renderer events.
    pub fn subscribe_renderer(&self) -> broadcast::Receiver<RendererEvent> {
        self.renderer_tx.subscribe()
    }

    /// Subscribe to protocol signals.
    pub fn subscribe_signals(&self) -> broadcast::Receiver<ProtocolSignal> {
        self.signal_tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn renderer(&self, event: RendererEvent) {
        if self.renderer_tx.send(event).is_err() {
            trace!("No renderer subscribers");
        }
    }

    fn signal(&self, signal: ProtocolSignal) {
        if self.signal_tx.send(signal).is_err() {
            trace!("No signal subscribers");
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    renderer: Vec<RendererEvent>,
    signals: Vec<ProtocolSignal>,
}

/// Keeps every event in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer events so far, oldest first.
    pub fn renderer_events(&self) -> Vec<RendererEvent> {
        self.lock().renderer.clone()
    }

    /// Signals so far, oldest first.
    pub fn signals(&self) -> Vec<ProtocolSignal> {
        self.lock().signals.clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        let mut recorded = self.lock();
        recorded.renderer.clear();
        recorded.signals.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for RecordingSink {
    fn renderer(&self, event: RendererEvent) {
        self.lock().renderer.push(event);
    }

    fn signal(&self, signal: ProtocolSignal) {
        self.lock().signals.push(signal);
    }
}
