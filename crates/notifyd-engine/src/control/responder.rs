//! Control responder.
//!
//! Maps each [`ControlCommand`] onto the request handler. Runs on the engine
//! loop, so every command (including `dismiss_all`) is applied atomically
//! with respect to admissions and expiries.

use tracing::debug;

use notifyd_core::control::{ControlCommand, ControlData};
use notifyd_core::error::AppError;

use crate::handler::RequestHandler;

/// Apply one control command.
pub fn execute(
    handler: &mut RequestHandler,
    command: ControlCommand,
) -> Result<ControlData, AppError> {
    debug!("Control command: {}", command.name());

    Ok(match command {
        ControlCommand::List => ControlData::Notifications(handler.list()),
        ControlCommand::Count => ControlData::Count(handler.count()),
        ControlCommand::Dismiss { id } => {
            handler.dismiss(id)?;
            ControlData::Dismissed(vec![id])
        }
        ControlCommand::DismissAll => ControlData::Dismissed(handler.dismiss_all()),
        ControlCommand::ToggleDnd => ControlData::Dnd(handler.toggle_dnd()),
        ControlCommand::SetDnd { enabled } => ControlData::Dnd(handler.set_dnd(enabled)),
        ControlCommand::DndStatus => ControlData::Dnd(handler.dnd_status()),
        ControlCommand::History { limit } => ControlData::History(handler.history(limit)),
        ControlCommand::ClearHistory => ControlData::Cleared(handler.clear_history()),
        ControlCommand::InvokeAction { id, action } => {
            handler.invoke_action(id, &action)?;
            ControlData::Done
        }
        ControlCommand::Notify { request } => ControlData::Id(handler.notify(request)?),
    })
}
