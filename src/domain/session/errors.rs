//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, ValidationError};
use crate::domain::setup::EngineError;

/// Errors surfaced by setup session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// Operation not allowed in the session's current status.
    InvalidState(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Oracle failed or timed out; the message was kept and may be resent.
    OracleFailure(String),
    /// Oracle answered outside the requested schema; may be resent.
    SchemaConformance(String),
    /// Persisted step cursor is corrupt.
    InvalidStep(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::OracleFailure(_) => ErrorCode::OracleFailure,
            SessionError::SchemaConformance(_) => ErrorCode::SchemaConformance,
            SessionError::InvalidStep(_) => ErrorCode::InvalidStep,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::InvalidState(msg) => format!("Invalid state: {}", msg),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::OracleFailure(msg) => {
                format!("Could not process your message, please try again: {}", msg)
            }
            SessionError::SchemaConformance(msg) => {
                format!("Could not understand the extraction result, please try again: {}", msg)
            }
            SessionError::InvalidStep(msg) => format!("Session state is corrupt: {}", msg),
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
    /// True when the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::OracleFailure(_) | SessionError::SchemaConformance(_)
        )
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => SessionError::InvalidState(err.message),
            ErrorCode::ValidationFailed => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::InvalidStep => SessionError::InvalidStep(err.message),
            ErrorCode::OracleFailure => SessionError::OracleFailure(err.message),
            ErrorCode::SchemaConformance => SessionError::SchemaConformance(err.message),
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { field } => {
                SessionError::validation(field, "cannot be empty")
            }
            ValidationError::InvalidFormat { field, reason } => {
                SessionError::validation(field, reason)
            }
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::OracleFailure { .. } => SessionError::OracleFailure(err.to_string()),
            EngineError::SchemaConformance { .. } => {
                SessionError::SchemaConformance(err.to_string())
            }
            EngineError::InvalidStepTransition(msg) => SessionError::InvalidStep(msg),
            EngineError::MissingUserMessage { .. } => SessionError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::setup::Step;

    #[test]
    fn engine_errors_map_to_distinct_variants() {
        let oracle: SessionError = EngineError::OracleFailure {
            step: Step::ExtractActions,
            reason: "timeout".into(),
        }
        .into();
        let schema: SessionError = EngineError::SchemaConformance {
            step: Step::ExtractActions,
            reason: "bad".into(),
        }
        .into();
        let step: SessionError = EngineError::InvalidStepTransition("unknown step 'x'".into()).into();

        assert_eq!(oracle.code(), ErrorCode::OracleFailure);
        assert_eq!(schema.code(), ErrorCode::SchemaConformance);
        assert_eq!(step.code(), ErrorCode::InvalidStep);
        assert!(oracle.is_retryable());
        assert!(schema.is_retryable());
        assert!(!step.is_retryable());
    }

    #[test]
    fn domain_state_error_becomes_invalid_state() {
        let err: SessionError =
            DomainError::new(ErrorCode::InvalidStateTransition, "Session is complete").into();
        assert_eq!(err, SessionError::InvalidState("Session is complete".into()));
    }

    #[test]
    fn validation_error_keeps_field() {
        let err: SessionError = ValidationError::empty_field("message").into();
        assert_eq!(
            err.message(),
            "Validation failed for 'message': cannot be empty"
        );
    }

    #[test]
    fn database_error_becomes_infrastructure() {
        let err: SessionError = DomainError::database("connection refused").into();
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }
}
