//! Conversation engine - drives steps until the turn boundary.
//!
//! One call is one turn. The engine holds no conversation data between calls;
//! everything it needs arrives in the [`ConversationState`] and everything it
//! produces is written back into it.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::errors::EngineError;
use super::extraction::ExtractionSchema;
use super::router::Router;
use super::state::ConversationState;
use super::step::Step;
use super::steps;
use crate::ports::{ExtractionOracle, OracleError};

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Most recent assistant message after the turn.
    pub reply: Option<String>,
    /// Cursor after the turn.
    pub current_step: Step,
    pub ready_for_labeling: bool,
}

impl TurnOutcome {
    fn from_state(state: &ConversationState) -> Self {
        Self {
            reply: state.last_assistant_message().map(str::to_string),
            current_step: state.current_step,
            ready_for_labeling: state.ready_for_labeling,
        }
    }
}

/// Runs setup conversation turns.
pub struct ConversationEngine {
    oracle: Arc<dyn ExtractionOracle>,
    router: Router,
    oracle_timeout: Option<Duration>,
}

impl ConversationEngine {
    pub fn new(oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self {
            oracle,
            router: Router::setup_flow(),
            oracle_timeout: None,
        }
    }

    /// Bounds every oracle call made during a turn.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = Some(timeout);
        self
    }

    /// Starts a conversation without user input, producing the greeting.
    pub async fn open(&self, state: &mut ConversationState) -> Result<TurnOutcome, EngineError> {
        self.advance(state).await
    }

    /// Records `utterance` and advances the conversation by one turn.
    ///
    /// On error the user message stays recorded and every other field is as
    /// it was before the failing step, so the caller can persist the state and
    /// the operator can resend.
    pub async fn run_turn(
        &self,
        state: &mut ConversationState,
        utterance: &str,
    ) -> Result<TurnOutcome, EngineError> {
        if !state.record_user_message(utterance) {
            tracing::debug!(step = %state.current_step, "Retrying turn for repeated message");
        }
        self.advance(state).await
    }

    async fn advance(&self, state: &mut ConversationState) -> Result<TurnOutcome, EngineError> {
        let oracle = BoundedOracle {
            inner: self.oracle.as_ref(),
            timeout: self.oracle_timeout,
        };

        // Every step runs at most once per turn.
        for _ in 0..Step::ALL.len() {
            let step = state.current_step;
            if step.is_terminal() {
                return Ok(TurnOutcome::from_state(state));
            }

            let output = match steps::execute(step, state, &oracle).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::warn!(step = %step, error = %e, "Setup step failed");
                    return Err(e);
                }
            };

            let replied = output.apply_to(state);
            state.current_step = self.router.next(step);
            tracing::debug!(step = %step, next = %state.current_step, replied, "Setup step completed");

            if replied {
                return Ok(TurnOutcome::from_state(state));
            }
        }

        Err(EngineError::InvalidStepTransition(format!(
            "no reply produced before leaving {}",
            state.current_step
        )))
    }
}

/// Applies the engine's deadline to each oracle call.
struct BoundedOracle<'a> {
    inner: &'a dyn ExtractionOracle,
    timeout: Option<Duration>,
}

impl<'a> BoundedOracle<'a> {
    async fn bounded<T, F>(&self, call: F) -> Result<T, OracleError>
    where
        F: std::future::Future<Output = Result<T, OracleError>> + Send,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| OracleError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => call.await,
        }
    }
}

#[async_trait]
impl<'a> ExtractionOracle for BoundedOracle<'a> {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        self.bounded(self.inner.complete(system_prompt, user_prompt)).await
    }

    async fn extract_structured(
        &self,
        schema: ExtractionSchema,
        prompt: &str,
    ) -> Result<Value, OracleError> {
        self.bounded(self.inner.extract_structured(schema, prompt)).await
    }
}
