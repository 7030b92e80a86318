//! Errors raised while running a conversation turn.

use thiserror::Error;

use super::step::Step;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::OracleError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The oracle failed or timed out. The step left the state untouched.
    #[error("oracle failure in {step}: {reason}")]
    OracleFailure { step: Step, reason: String },

    /// The oracle answered with something outside the requested schema.
    #[error("schema conformance failure in {step}: {reason}")]
    SchemaConformance { step: Step, reason: String },

    /// The persisted step cursor names no known step.
    #[error("invalid step transition: {0}")]
    InvalidStepTransition(String),

    /// An extract step ran with no user message to read.
    #[error("{step} requires a user message")]
    MissingUserMessage { step: Step },
}

impl EngineError {
    /// Wraps an oracle error raised while executing `step`.
    pub fn from_oracle(step: Step, err: OracleError) -> Self {
        match err {
            OracleError::SchemaConformance { reason, .. } => Self::SchemaConformance { step, reason },
            other => Self::OracleFailure {
                step,
                reason: other.to_string(),
            },
        }
    }

    /// True when resending the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::OracleFailure { .. } | EngineError::SchemaConformance { .. }
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::OracleFailure { .. } => ErrorCode::OracleFailure,
            EngineError::SchemaConformance { .. } => ErrorCode::SchemaConformance,
            EngineError::InvalidStepTransition(_) => ErrorCode::InvalidStep,
            EngineError::MissingUserMessage { .. } => ErrorCode::InternalError,
        }
    }
}

impl From<EngineError> for DomainError {
    fn from(err: EngineError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
