//! Do-Not-Disturb: a manual flag, an optional weekly schedule, and the
//! periodic tick that notices schedule boundaries.

pub mod clock;
pub mod controller;
pub mod schedule;
pub mod ticker;

pub use clock::{Clock, LocalClock, ManualClock};
pub use controller::DndController;
pub use schedule::{DndSchedule, DndWindow};
pub use ticker::DndTicker;
