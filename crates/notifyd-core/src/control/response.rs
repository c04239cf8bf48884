//! Control replies.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};
use crate::types::{HistoryEntry, NotificationId, NotificationSummary};

/// Do-Not-Disturb state as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DndStatus {
    /// Effective state.
    pub active: bool,
    /// Manual flag.
    pub manual: bool,
    /// A schedule window is currently forcing DND on.
    pub scheduled: bool,
    /// End of the current schedule window, when `scheduled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Local>>,
}

/// Active-set counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSummary {
    /// Every notification in the active set.
    pub active: usize,
    /// Notifications the renderer currently shows (capped at `max_visible`).
    pub visible: usize,
    /// Notifications hidden by Do-Not-Disturb.
    pub suppressed: usize,
}

/// Successful reply payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ControlData {
    /// Active notifications.
    Notifications(Vec<NotificationSummary>),
    /// Counters.
    Count(CountSummary),
    /// Identities closed by a dismiss command.
    Dismissed(Vec<NotificationId>),
    /// Do-Not-Disturb state.
    Dnd(DndStatus),
    /// Archived notifications.
    History(Vec<HistoryEntry>),
    /// Identity assigned to a submitted notification.
    Id(NotificationId),
    /// Number of entries removed.
    Cleared(usize),
    /// Nothing to report.
    Done,
}

/// One reply per control request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ControlResponse {
    /// Command succeeded.
    Ok {
        /// Payload.
        data: ControlData,
    },
    /// The referenced notification or action does not exist.
    NotFound {
        /// Details.
        message: String,
    },
    /// Command failed.
    Error {
        /// Error category.
        kind: ErrorKind,
        /// Details.
        message: String,
    },
}

impl ControlResponse {
    /// Wrap a payload.
    pub fn ok(data: ControlData) -> Self {
        Self::Ok { data }
    }

    /// Convert an error into the matching reply.
    pub fn from_error(err: &AppError) -> Self {
        match err.kind {
            ErrorKind::NotFound => Self::NotFound {
                message: err.message.clone(),
            },
            kind => Self::Error {
                kind,
                message: err.message.clone(),
            },
        }
    }

    /// Build a reply from a fallible operation.
    pub fn from_result(result: Result<ControlData, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::from_error(&err),
        }
    }

    /// Client side: turn the reply back into a result.
    pub fn into_result(self) -> Result<ControlData, AppError> {
        match self {
            Self::Ok { data } => Ok(data),
            Self::NotFound { message } => Err(AppError::not_found(message)),
            Self::Error { kind, message } => Err(AppError::new(kind, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_has_its_own_status() {
        let reply = ControlResponse::from_error(&AppError::not_found("notification 4 not found"));
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(
            json,
            r#"{"status":"not_found","message":"notification 4 not found"}"#
        );
    }

    #[test]
    fn test_ok_wire_format() {
        let reply = ControlResponse::ok(ControlData::Count(CountSummary {
            active: 2,
            visible: 1,
            suppressed: 1,
        }));
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(
            json,
            r#"{"status":"ok","data":{"kind":"count","value":{"active":2,"visible":1,"suppressed":1}}}"#
        );
        let back: ControlResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reply);
    }

    #[test]
    fn test_into_result_keeps_kind() {
        let reply = ControlResponse::from_error(&AppError::validation("summary is empty"));
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
