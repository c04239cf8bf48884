//! CLI command definitions and dispatch.

pub mod dnd;
pub mod history;
pub mod notifications;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use notifyd_core::config::AppConfig;
use notifyd_core::error::AppError;

use crate::client::ControlClient;
use crate::output::OutputFormat;

/// notifyctl: control a running notifyd
#[derive(Debug, Parser)]
#[command(name = "notifyctl", version, about, long_about = None)]
pub struct Cli {
    /// Path to the daemon configuration file (used to find the socket)
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Control socket path, overriding the configuration
    #[arg(short, long)]
    pub socket: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List active notifications
    List,
    /// Count active, visible and suppressed notifications
    Count,
    /// Dismiss one notification
    Dismiss {
        /// Notification ID
        id: u32,
    },
    /// Dismiss every active notification
    DismissAll {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Invoke an action on a notification
    Invoke {
        /// Notification ID
        id: u32,
        /// Action key
        action: String,
    },
    /// Send a notification through the daemon
    Send(notifications::SendArgs),
    /// Toggle Do-Not-Disturb
    ToggleDnd,
    /// Show Do-Not-Disturb status
    DndStatus,
    /// Do-Not-Disturb management
    Dnd(dnd::DndArgs),
    /// Show closed notifications, most recent first
    History {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Forget all closed notifications
    ClearHistory {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let mut client = ControlClient::connect(&self.socket_path()?).await?;
        let format = self.format;

        match &self.command {
            Commands::List => notifications::list(&mut client, format).await,
            Commands::Count => notifications::count(&mut client, format).await,
            Commands::Dismiss { id } => notifications::dismiss(&mut client, *id).await,
            Commands::DismissAll { force } => {
                notifications::dismiss_all(&mut client, *force, format).await
            }
            Commands::Invoke { id, action } => {
                notifications::invoke(&mut client, *id, action).await
            }
            Commands::Send(args) => notifications::send(&mut client, args, format).await,
            Commands::ToggleDnd => dnd::toggle(&mut client, format).await,
            Commands::DndStatus => dnd::status(&mut client, format).await,
            Commands::Dnd(args) => dnd::execute(&mut client, args, format).await,
            Commands::History { limit } => history::list(&mut client, *limit, format).await,
            Commands::ClearHistory { force } => history::clear(&mut client, *force).await,
        }
    }

    /// `--socket`, else the configured socket, else the default.
    fn socket_path(&self) -> Result<PathBuf, AppError> {
        if let Some(path) = &self.socket {
            return Ok(path.clone());
        }
        let config = AppConfig::load(&self.config)?;
        Ok(config.control.resolved_socket_path())
    }
}

/// Ask before doing something destructive. Returns `false` if declined.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
