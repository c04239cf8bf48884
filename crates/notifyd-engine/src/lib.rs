//! # notifyd-engine
//!
//! The notification state engine. Provides:
//!
//! - Rule matching and merging of rule actions
//! - Per-notification expiry timers with generation tokens
//! - The bounded history archive, with optional JSON persistence
//! - Do-Not-Disturb with a manual flag and weekly schedule
//! - The registry of active notifications and the request handler
//! - The single-owner engine loop and the control socket server

pub mod control;
pub mod dnd;
pub mod handler;
pub mod history;
pub mod registry;
pub mod rules;
pub mod scheduler;
pub mod server;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use control::ControlServer;
pub use dnd::{DndController, DndTicker};
pub use handler::RequestHandler;
pub use history::HistoryStore;
pub use registry::Registry;
pub use rules::RuleMatcher;
pub use scheduler::TimeoutScheduler;
pub use server::{Engine, EngineCommand, EngineHandle};
pub use sink::{BroadcastSink, EventSink, RecordingSink};
