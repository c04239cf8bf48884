//! Notification identifier.
//!
//! Identifiers are positive integers allocated by the daemon. They grow
//! monotonically for the daemon's lifetime and are never reused.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a notification for the lifetime of the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u32);

impl NotificationId {
    /// The first identifier handed out by a fresh daemon.
    pub const FIRST: Self = Self(1);

    /// Interpret a protocol `replaces_id`, where `0` means "no replacement".
    pub fn from_replaces(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// Return the raw protocol value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// The identifier after this one, or `None` when the space is used up.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u32> for NotificationId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>().map(Self)
    }
}
