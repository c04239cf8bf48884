//! History ring buffer.

use std::collections::VecDeque;

use tracing::debug;

use notifyd_core::config::HistoryConfig;
use notifyd_core::types::HistoryEntry;

/// Fixed-capacity, insertion-ordered archive. The oldest entry is evicted
/// when an append would exceed capacity.
#[derive(Debug)]
pub struct HistoryStore {
    /// Oldest at the front, newest at the back.
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    enabled: bool,
}

impl HistoryStore {
    /// Create an empty store.
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            enabled,
        }
    }

    /// Create an empty store from configuration.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.max_entries, config.enabled)
    }

    /// Whether appends are accepted at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.capacity > 0
    }

    /// Archive an entry. Returns `false` when the entry was dropped because
    /// history is disabled or the entry is exempt.
    pub fn append(&mut self, entry: HistoryEntry) -> bool {
        if !self.is_enabled() || entry.is_exempt() {
            return false;
        }
        while self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("Evicted notification {} from history", evicted.notification.id);
            }
        }
        self.entries.push_back(entry);
        true
    }

    /// Entries, most recent first.
    pub fn list(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// Up to `limit` entries, most recent first.
    pub fn recent(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        self.list()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Replace the contents with `entries` (most recent first), keeping only
    /// what fits. Used when loading a persisted archive.
    pub fn restore(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries
            .into_iter()
            .filter(|e| !e.is_exempt())
            .take(self.capacity)
            .collect();
        self.entries.make_contiguous().reverse();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
