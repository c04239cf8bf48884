//! Notification urgency levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// FreeDesktop urgency class. Ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Background information.
    Low,
    /// Regular notifications.
    #[default]
    Normal,
    /// Always delivered, even while Do-Not-Disturb is active.
    Critical,
}

impl Urgency {
    /// Parse the protocol byte value (0, 1, 2).
    pub fn from_level(level: i64) -> Result<Self, AppError> {
        match level {
            0 => Ok(Self::Low),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Critical),
            other => Err(AppError::validation(format!(
                "invalid urgency level {other}, expected 0, 1 or 2"
            ))),
        }
    }

    /// Protocol byte value.
    pub fn level(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::Critical => 2,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Critical => "critical",
        }
    }

    /// Whether this urgency bypasses Do-Not-Disturb.
    pub fn bypasses_dnd(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "critical" => Ok(Self::Critical),
            other => Err(AppError::validation(format!("invalid urgency '{other}'"))),
        }
    }
}
