//! Domain errors for the intervention controller.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while handling a controller event.
///
/// Mirrors the error kinds in the error-handling design: `NotFound` and
/// `IllegalTransition` are logged and the event is dropped; `PersistenceFailure`
/// and `ScheduleFailure` are surfaced so the ingress can retry delivery;
/// `DeliveryFailure` is owned by the task queue's retry loop.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("controller not registered for user: {0}")]
    ControllerNotFound(Uuid),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("schedule failure: {0}")]
    ScheduleFailure(String),

    #[error("illegal transition: event {event} not recognized in phase {phase}")]
    IllegalTransition { phase: String, event: String },

    #[error("delivery failure: {0}")]
    DeliveryFailure(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::PersistenceFailure(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::PersistenceFailure(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::DeliveryFailure(err.to_string())
    }
}

impl DomainError {
    /// Whether this error should be dropped with a log line rather than
    /// surfaced for redelivery (spec §7: NotFound / IllegalTransition).
    pub fn is_terminal_for_event(&self) -> bool {
        matches!(
            self,
            DomainError::UserNotFound(_)
                | DomainError::ComponentNotFound(_)
                | DomainError::IllegalTransition { .. }
        )
    }
}
