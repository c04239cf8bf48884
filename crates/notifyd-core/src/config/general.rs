//! General display and admission settings.

use serde::{Deserialize, Serialize};

/// Order in which active notifications are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    NewestFirst,
    /// Oldest first.
    OldestFirst,
    /// Critical first, newest first within the same urgency.
    UrgencyDescending,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Maximum number of notifications shown at once.
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    /// List order of active notifications.
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Whether bodies are rendered as markup.
    #[serde(default = "default_true")]
    pub markup: bool,
    /// Active-set size above which a warning is logged.
    #[serde(default = "default_soft_limit")]
    pub active_soft_limit: usize,
    /// Active-set size at which new admissions are rejected.
    #[serde(default)]
    pub active_hard_limit: Option<usize>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            sort_order: SortOrder::default(),
            markup: true,
            active_soft_limit: default_soft_limit(),
            active_hard_limit: None,
        }
    }
}

fn default_max_visible() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_soft_limit() -> usize {
    1000
}
