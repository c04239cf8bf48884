//! Control protocol spoken between `notifyctl` and the daemon.
//!
//! Framing is one JSON document per line in each direction; every request
//! gets exactly one reply.

pub mod command;
pub mod response;

pub use command::ControlCommand;
pub use response::{ControlData, ControlResponse, CountSummary, DndStatus};
