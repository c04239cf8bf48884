//! Do-Not-Disturb commands.

use chrono::Local;
use clap::{Args, Subcommand};

use notifyd_core::control::{ControlCommand, ControlData, DndStatus};
use notifyd_core::error::AppError;

use crate::client::{ControlClient, unexpected};
use crate::output::{self, OutputFormat};

/// DND management arguments
#[derive(Debug, Args)]
pub struct DndArgs {
    /// DND subcommand
    #[command(subcommand)]
    pub command: DndCommand,
}

/// DND subcommands
#[derive(Debug, Subcommand)]
pub enum DndCommand {
    /// Turn manual DND on
    On,
    /// Turn manual DND off
    Off,
    /// Flip manual DND
    Toggle,
    /// Show DND status
    Status,
}

/// Execute a DND subcommand
pub async fn execute(
    client: &mut ControlClient,
    args: &DndArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    match args.command {
        DndCommand::On => set(client, true, format).await,
        DndCommand::Off => set(client, false, format).await,
        DndCommand::Toggle => toggle(client, format).await,
        DndCommand::Status => status(client, format).await,
    }
}

/// `toggle-dnd`
pub async fn toggle(client: &mut ControlClient, format: OutputFormat) -> Result<(), AppError> {
    let status = expect_status(client.request(ControlCommand::ToggleDnd).await?)?;
    report(&status, format);
    Ok(())
}

/// `dnd-status`
pub async fn status(client: &mut ControlClient, format: OutputFormat) -> Result<(), AppError> {
    let status = expect_status(client.request(ControlCommand::DndStatus).await?)?;
    report(&status, format);
    Ok(())
}

async fn set(
    client: &mut ControlClient,
    enabled: bool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let status = expect_status(client.request(ControlCommand::SetDnd { enabled }).await?)?;
    report(&status, format);
    Ok(())
}

fn expect_status(data: ControlData) -> Result<DndStatus, AppError> {
    match data {
        ControlData::Dnd(status) => Ok(status),
        other => Err(unexpected(other)),
    }
}

fn report(status: &DndStatus, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_json(status);
        return;
    }

    println!("Do-Not-Disturb: {}", if status.active { "ON" } else { "OFF" });
    output::print_kv("Manual", if status.manual { "on" } else { "off" });
    output::print_kv("Scheduled", if status.scheduled { "yes" } else { "no" });
    if let Some(until) = status.until {
        output::print_kv(
            "Until",
            &until.with_timezone(&Local).format("%a %H:%M").to_string(),
        );
    }
    if status.manual != status.active {
        output::print_warning("A scheduled window overrides the manual setting");
    }
}
