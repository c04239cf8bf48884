//! Per-urgency default timeouts.

use serde::{Deserialize, Serialize};

use crate::types::Urgency;

/// Default expiry per urgency, in milliseconds. `0` means never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Low urgency timeout.
    #[serde(default = "default_low")]
    pub low: u32,
    /// Normal urgency timeout.
    #[serde(default = "default_normal")]
    pub normal: u32,
    /// Critical urgency timeout.
    #[serde(default)]
    pub critical: u32,
}

impl TimeoutConfig {
    /// Default timeout for the given urgency.
    pub fn for_urgency(&self, urgency: Urgency) -> u32 {
        match urgency {
            Urgency::Low => self.low,
            Urgency::Normal => self.normal,
            Urgency::Critical => self.critical,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            low: default_low(),
            normal: default_normal(),
            critical: 0,
        }
    }
}

fn default_low() -> u32 {
    3000
}

fn default_normal() -> u32 {
    5000
}
