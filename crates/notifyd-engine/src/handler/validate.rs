//! Inbound request validation.
//!
//! A request that fails here is rejected before admission and never touches
//! engine state.

use notifyd_core::error::AppError;
use notifyd_core::types::{Action, Hints, NotificationId, NotifyRequest, Urgency};

/// A validated `Notify` request (the `Pending` state).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Sending application.
    pub app_name: String,
    /// Identity the sender asked to replace.
    pub replaces_id: Option<NotificationId>,
    /// Icon name or path.
    pub icon: String,
    /// Summary line, never empty.
    pub summary: String,
    /// Body text.
    pub body: String,
    /// Parsed action pairs.
    pub actions: Vec<Action>,
    /// Hint map.
    pub hints: Hints,
    /// Urgency requested through the hints, `Normal` when absent.
    pub urgency: Urgency,
    /// Timeout requested by the sender; `None` defers to the daemon.
    pub requested_timeout: Option<u32>,
}

/// Validate a raw request.
pub fn validate(request: NotifyRequest) -> Result<Candidate, AppError> {
    if request.summary.trim().is_empty() {
        return Err(AppError::validation("summary must not be empty"));
    }

    let requested_timeout = match request.timeout {
        -1 => None,
        t if t >= 0 => Some(t as u32),
        t => {
            return Err(AppError::validation(format!(
                "invalid timeout {t}, expected -1, 0 or a positive number of milliseconds"
            )));
        }
    };

    if request.actions.len() % 2 != 0 {
        return Err(AppError::validation(format!(
            "action list has {} entries, expected key/label pairs",
            request.actions.len()
        )));
    }
    let actions = request
        .actions
        .chunks_exact(2)
        .map(|pair| {
            if pair[0].is_empty() {
                return Err(AppError::validation("action key must not be empty"));
            }
            Ok(Action {
                key: pair[0].clone(),
                label: pair[1].clone(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let urgency = request.hints.urgency()?.unwrap_or_default();

    Ok(Candidate {
        app_name: request.app_name,
        replaces_id: NotificationId::from_replaces(request.replaces_id),
        icon: request.icon,
        summary: request.summary,
        body: request.body,
        actions,
        hints: request.hints,
        urgency,
        requested_timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyd_core::error::ErrorKind;

    #[test]
    fn test_minimal_request() {
        let candidate = validate(NotifyRequest::new("app", "hello")).unwrap();
        assert_eq!(candidate.urgency, Urgency::Normal);
        assert_eq!(candidate.requested_timeout, None);
        assert_eq!(candidate.replaces_id, None);
    }

    #[test]
    fn test_empty_summary_rejected() {
        let err = validate(NotifyRequest::new("app", "   ")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_timeout_values() {
        let never = validate(NotifyRequest::new("app", "s").timeout(0)).unwrap();
        assert_eq!(never.requested_timeout, Some(0));

        let explicit = validate(NotifyRequest::new("app", "s").timeout(1500)).unwrap();
        assert_eq!(explicit.requested_timeout, Some(1500));

        let err = validate(NotifyRequest::new("app", "s").timeout(-2)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_actions_are_paired() {
        let candidate = validate(
            NotifyRequest::new("app", "s")
                .action("default", "Open")
                .action("reply", "Reply"),
        )
        .unwrap();
        assert_eq!(candidate.actions.len(), 2);
        assert_eq!(candidate.actions[1].key, "reply");

        let mut odd = NotifyRequest::new("app", "s");
        odd.actions = vec!["dangling".to_string()];
        assert_eq!(validate(odd).unwrap_err().kind, ErrorKind::Validation);

        let empty_key = NotifyRequest::new("app", "s").action("", "Nothing");
        assert_eq!(validate(empty_key).unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_invalid_urgency_rejected() {
        let request = NotifyRequest::new("app", "s").hint("urgency", 5i64);
        assert_eq!(validate(request).unwrap_err().kind, ErrorKind::Validation);

        let request = NotifyRequest::new("app", "s").urgency(Urgency::Critical);
        assert_eq!(validate(request).unwrap().urgency, Urgency::Critical);
    }

    #[test]
    fn test_replaces_id_zero_is_fresh() {
        let mut request = NotifyRequest::new("app", "s");
        request.replaces_id = 0;
        assert_eq!(validate(request).unwrap().replaces_id, None);

        let request = NotifyRequest::new("app", "s").replaces(NotificationId(8));
        assert_eq!(validate(request).unwrap().replaces_id, Some(NotificationId(8)));
    }
}
