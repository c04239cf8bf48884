//! Events emitted by the notification engine.
//!
//! Two audiences consume them: the renderer, which draws popups from
//! [`RendererEvent`]s, and the bus transport, which turns
//! [`ProtocolSignal`]s into `NotificationClosed` / `ActionInvoked` signals.

pub mod renderer;
pub mod signal;

pub use renderer::RendererEvent;
pub use signal::ProtocolSignal;
