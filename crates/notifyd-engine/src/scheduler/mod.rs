//! Expiry timers for active notifications.

pub mod timeout;

pub use timeout::{Expiry, TimeoutScheduler};
