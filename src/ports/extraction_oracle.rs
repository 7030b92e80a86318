//! Extraction Oracle Port - natural-language understanding for setup steps.
//!
//! The oracle answers two kinds of question: free-form completion and
//! structured extraction against one of the fixed [`ExtractionSchema`]s.
//! Calls are slow and fallible; callers never retry, that belongs to the
//! provider underneath.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::setup::ExtractionSchema;

/// Port for extracting structure from operator utterances.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Free-form completion.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError>;

    /// Asks for a JSON value shaped like `schema`.
    ///
    /// The returned value is not yet validated against the schema's Rust type;
    /// see `domain::setup::decode`.
    async fn extract_structured(
        &self,
        schema: ExtractionSchema,
        prompt: &str,
    ) -> Result<Value, OracleError>;
}

/// Oracle failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// No answer within the caller's deadline.
    #[error("oracle timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport, provider or authentication failure.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// The answer did not fit the requested schema.
    #[error("response does not conform to {schema} schema: {reason}")]
    SchemaConformance {
        schema: ExtractionSchema,
        reason: String,
    },
}

impl OracleError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn schema_conformance(schema: ExtractionSchema, reason: impl Into<String>) -> Self {
        Self::SchemaConformance {
            schema,
            reason: reason.into(),
        }
    }

    pub fn is_schema_conformance(&self) -> bool {
        matches!(self, Self::SchemaConformance { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_schema() {
        let err = OracleError::schema_conformance(ExtractionSchema::Goals, "missing field `goals`");
        assert_eq!(
            err.to_string(),
            "response does not conform to extracted_goals schema: missing field `goals`"
        );
        assert!(err.is_schema_conformance());
    }

    #[test]
    fn timeout_is_not_schema_failure() {
        let err = OracleError::Timeout { timeout_ms: 1500 };
        assert_eq!(err.to_string(), "oracle timed out after 1500ms");
        assert!(!err.is_schema_conformance());
    }
}
