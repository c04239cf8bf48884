//! Bounded archive of closed notifications.

pub mod persist;
pub mod store;

pub use store::HistoryStore;
