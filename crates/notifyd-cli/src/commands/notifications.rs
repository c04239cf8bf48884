//! Commands acting on active notifications.

use chrono::Local;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use notifyd_core::control::{ControlCommand, ControlData};
use notifyd_core::error::AppError;
use notifyd_core::types::{
    HintValue, NotificationId, NotificationSummary, NotifyRequest, Urgency,
};

use crate::client::{ControlClient, unexpected};
use crate::output::{self, OutputFormat};

/// Arguments for `send`
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Summary line
    pub summary: String,
    /// Body text
    pub body: Option<String>,
    /// Application name reported to the daemon
    #[arg(short, long, default_value = "notifyctl")]
    pub app_name: String,
    /// Urgency: low, normal or critical
    #[arg(short, long)]
    pub urgency: Option<Urgency>,
    /// Timeout in milliseconds; 0 never expires, -1 uses the daemon default
    #[arg(short, long, allow_hyphen_values = true)]
    pub timeout: Option<i32>,
    /// Icon name or path
    #[arg(short, long)]
    pub icon: Option<String>,
    /// Replace the notification with this ID
    #[arg(short, long)]
    pub replaces: Option<u32>,
    /// Action as key=label (repeatable)
    #[arg(short = 'A', long = "action", value_parser = parse_action)]
    pub actions: Vec<(String, String)>,
    /// Hint as key=value (repeatable); true/false and integers are typed
    #[arg(short = 'H', long = "hint", value_parser = parse_hint)]
    pub hints: Vec<(String, HintValue)>,
    /// Category hint
    #[arg(long)]
    pub category: Option<String>,
    /// Do not keep this notification in history
    #[arg(long)]
    pub transient: bool,
}

impl SendArgs {
    fn to_request(&self) -> NotifyRequest {
        let mut request = NotifyRequest::new(&self.app_name, &self.summary);
        if let Some(body) = &self.body {
            request = request.body(body);
        }
        if let Some(icon) = &self.icon {
            request = request.icon(icon);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(id) = self.replaces {
            request = request.replaces(NotificationId(id));
        }
        if let Some(urgency) = self.urgency {
            request = request.urgency(urgency);
        }
        for (key, label) in &self.actions {
            request = request.action(key, label);
        }
        for (key, value) in &self.hints {
            request = request.hint(key, value.clone());
        }
        if let Some(category) = &self.category {
            request = request.hint("category", category.as_str());
        }
        if self.transient {
            request = request.hint("transient", true);
        }
        request
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn parse_action(raw: &str) -> Result<(String, String), String> {
    let (key, label) = split_pair(raw)?;
    Ok((key.to_string(), label.to_string()))
}

fn parse_hint(raw: &str) -> Result<(String, HintValue), String> {
    let (key, value) = split_pair(raw)?;
    let value = match value {
        "true" => HintValue::Bool(true),
        "false" => HintValue::Bool(false),
        other => match other.parse::<i64>() {
            Ok(int) => HintValue::Int(int),
            Err(_) => HintValue::Str(other.to_string()),
        },
    };
    Ok((key.to_string(), value))
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// ID
    id: u32,
    /// App
    app: String,
    /// Summary
    summary: String,
    /// Urgency
    urgency: String,
    /// Timeout
    timeout: String,
    /// CSS class
    class: String,
    /// Hidden by DND
    dnd: String,
    /// Created
    created: String,
}

impl From<&NotificationSummary> for NotificationRow {
    fn from(n: &NotificationSummary) -> Self {
        Self {
            id: n.id.get(),
            app: n.app_name.clone(),
            summary: n.summary.clone(),
            urgency: n.urgency.to_string(),
            timeout: if n.timeout_ms == 0 {
                "never".to_string()
            } else {
                format!("{}ms", n.timeout_ms)
            },
            class: n.css_class.clone().unwrap_or_default(),
            dnd: if n.suppressed { "✓" } else { "" }.to_string(),
            created: n
                .created_at
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
        }
    }
}

/// `list`
pub async fn list(client: &mut ControlClient, format: OutputFormat) -> Result<(), AppError> {
    match client.request(ControlCommand::List).await? {
        ControlData::Notifications(list) => {
            let rows: Vec<NotificationRow> = list.iter().map(NotificationRow::from).collect();
            match format {
                OutputFormat::Table => output::print_list(&rows, format, "No active notifications."),
                OutputFormat::Json => output::print_json(&list),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// `count`
pub async fn count(client: &mut ControlClient, format: OutputFormat) -> Result<(), AppError> {
    match client.request(ControlCommand::Count).await? {
        ControlData::Count(count) => {
            match format {
                OutputFormat::Table => {
                    output::print_kv("Active", &count.active.to_string());
                    output::print_kv("Visible", &count.visible.to_string());
                    output::print_kv("Suppressed", &count.suppressed.to_string());
                }
                OutputFormat::Json => output::print_json(&count),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// `dismiss <id>`
pub async fn dismiss(client: &mut ControlClient, id: u32) -> Result<(), AppError> {
    client
        .request(ControlCommand::Dismiss {
            id: NotificationId(id),
        })
        .await?;
    output::print_success(&format!("Notification {id} dismissed"));
    Ok(())
}

/// `dismiss-all`
pub async fn dismiss_all(
    client: &mut ControlClient,
    force: bool,
    format: OutputFormat,
) -> Result<(), AppError> {
    if !force && !super::confirm("Dismiss ALL active notifications?")? {
        println!("Cancelled.");
        return Ok(());
    }

    match client.request(ControlCommand::DismissAll).await? {
        ControlData::Dismissed(ids) => {
            match format {
                OutputFormat::Table if ids.is_empty() => {
                    output::print_warning("Nothing to dismiss");
                }
                OutputFormat::Table => {
                    output::print_success(&format!("Dismissed {} notifications", ids.len()));
                }
                OutputFormat::Json => output::print_json(&ids),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}

/// `invoke <id> <action>`
pub async fn invoke(client: &mut ControlClient, id: u32, action: &str) -> Result<(), AppError> {
    client
        .request(ControlCommand::InvokeAction {
            id: NotificationId(id),
            action: action.to_string(),
        })
        .await?;
    output::print_success(&format!("Invoked '{action}' on notification {id}"));
    Ok(())
}

/// `send`
pub async fn send(
    client: &mut ControlClient,
    args: &SendArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = args.to_request();
    match client.request(ControlCommand::Notify { request }).await? {
        ControlData::Id(id) => {
            match format {
                OutputFormat::Table => println!("{id}"),
                OutputFormat::Json => output::print_json(&id),
            }
            Ok(())
        }
        other => Err(unexpected(other)),
    }
}
