//! JSON persistence of the history archive.
//!
//! The file holds a JSON array of entries, most recent first, the same order
//! `history` reports them in.

use std::path::Path;

use tracing::{debug, info};

use notifyd_core::error::AppError;
use notifyd_core::types::HistoryEntry;

use super::store::HistoryStore;

/// Read a persisted archive. A missing file is an empty history.
pub async fn load(path: &Path) -> Result<Vec<HistoryEntry>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No history file at '{}'", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(AppError::with_source(
                notifyd_core::error::ErrorKind::Io,
                format!("Failed to read history file '{}': {e}", path.display()),
                e,
            ));
        }
    };

    let entries: Vec<HistoryEntry> = serde_json::from_slice(&bytes)?;
    info!(
        "Loaded {} history entries from '{}'",
        entries.len(),
        path.display()
    );
    Ok(entries)
}

/// Write the archive, creating parent directories as needed.
pub async fn save(path: &Path, store: &HistoryStore) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let entries: Vec<&HistoryEntry> = store.list().collect();
    let json = serde_json::to_vec_pretty(&entries)?;

    // Write a sibling file, then rename it into place.
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    info!(
        "Saved {} history entries to '{}'",
        entries.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::notification;
    use notifyd_core::types::CloseReason;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("notifyd-history-{}-{name}", std::process::id()))
            .join("history.json")
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let entries = load(&scratch_path("missing")).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_order() {
        let path = scratch_path("order");
        let mut store = HistoryStore::new(10, true);
        for (id, summary) in [(1, "A"), (2, "B"), (3, "C")] {
            store.append(HistoryEntry::archive(
                notification(id, "app", summary),
                CloseReason::Dismissed,
            ));
        }
        save(&path, &store).await.unwrap();

        let mut restored = HistoryStore::new(2, true);
        restored.restore(load(&path).await.unwrap());
        let summaries: Vec<_> = restored
            .list()
            .map(|e| e.notification.summary.as_str())
            .collect();
        assert_eq!(summaries, vec!["C", "B"]);

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let path = scratch_path("corrupt");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let err = load(&path).await.unwrap_err();
        assert_eq!(err.kind, notifyd_core::error::ErrorKind::Serialization);
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
