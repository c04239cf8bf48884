//! History settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Closed-notification archive settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Whether closed notifications are archived at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of archived entries.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Also archive the superseded content of replaced notifications.
    #[serde(default)]
    pub keep_replaced: bool,
    /// JSON file the archive is loaded from at startup and saved to on shutdown.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
            keep_replaced: false,
            path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    100
}
