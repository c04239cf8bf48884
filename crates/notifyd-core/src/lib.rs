//! # notifyd-core
//!
//! Core crate for notifyd. Contains the configuration schema, the
//! notification data model (identifiers, urgency, hints, lifecycle),
//! renderer events and protocol signals, the control-protocol wire types,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other notifyd crates.

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
