//! History commands.

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use notifyd_core::control::{ControlCommand, ControlData};
use notifyd_core::error::AppError;
use notifyd_core::types::HistoryEntry;

use crate::client::{ControlClient, unexpected};
use crate::output::{self, OutputFormat};

/// History display row
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// ID
    id: u32,
    /// App
    app: String,
    /// Summary
    summary: String,
    /// Urgency
    urgency: String,
    /// Close reason
    reason: String,
    /// Closed
    closed: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        let n = &entry.notification;
        Self {
            id: n.id.get(),
            app: n.app_name.clone(),
            summary: n.summary.clone(),
            urgency: n.urgency.to_string(),
            reason: entry.reason.as_str().to_string(),
            closed: entry
                .closed_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

/// `history [-n N]`
pub async fn list(
    client: &mut ControlClient,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match client.request(ControlCommand::History { limit }).await? {
        ControlData::History(entries) => {
            match format {
                OutputFormat::Table => {
                    let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
                    output::print_list(&rows, format, "History is empty.");
                }
                OutputFormat::Json => output::print_json(&entries),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// `clear-history`
pub async fn clear(client: &mut ControlClient, force: bool) -> Result<(), AppError> {
    if !force && !super::confirm("Clear the notification history?")? {
        println!("Cancelled.");
        return Ok(());
    }

    match client.request(ControlCommand::ClearHistory).await? {
        ControlData::Cleared(count) => {
            output::print_success(&format!("Removed {count} history entries"));
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}
