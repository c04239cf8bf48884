//! Control-client side of the engine: the command responder and the
//! Unix socket server in front of it.

pub mod responder;
pub mod server;

pub use responder::execute;
pub use server::ControlServer;
