//! SendMessageHandler - Runs one conversation turn for a session.
//!
//! Load, engine turn and persist all happen under the session's lock. When
//! the turn fails inside a step, the user's message is persisted anyway so a
//! resend picks up where the failure left off.

use std::sync::Arc;

use super::session_locks::SessionLocks;
use crate::domain::foundation::{SessionId, SessionStatus, ValidationError};
use crate::domain::session::{Session, SessionError};
use crate::domain::setup::ConversationEngine;
use crate::ports::SessionRepository;

/// Command to send an operator message.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub session_id: SessionId,
    pub message: String,
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct SendMessageResult {
    pub reply: String,
    pub status: SessionStatus,
    pub ready_for_labeling: bool,
    pub session: Session,
}

/// Handler for conversation turns.
pub struct SendMessageHandler {
    repository: Arc<dyn SessionRepository>,
    engine: Arc<ConversationEngine>,
    locks: Arc<SessionLocks>,
}

impl SendMessageHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        engine: Arc<ConversationEngine>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            repository,
            engine,
            locks,
        }
    }

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, SessionError> {
        let message = cmd.message.trim();
        if message.is_empty() {
            return Err(ValidationError::empty_field("message").into());
        }

        let _guard = self.locks.acquire(cmd.session_id).await;

        let mut session = self
            .repository
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;
        session.ensure_accepts_turns()?;

        let mut state = session.conversation_state()?;
        let turn = self.engine.run_turn(&mut state, message).await;

        session.absorb(state);
        let session = self.repository.update(&session).await?;

        let outcome = match turn {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    session_id = %cmd.session_id,
                    error = %err,
                    "Setup turn failed; message kept for retry"
                );
                return Err(err.into());
            }
        };

        tracing::info!(
            session_id = %cmd.session_id,
            step = %outcome.current_step,
            ready_for_labeling = outcome.ready_for_labeling,
            "Setup turn completed"
        );

        Ok(SendMessageResult {
            reply: outcome.reply.unwrap_or_default(),
            status: session.status(),
            ready_for_labeling: session.ready_for_labeling(),
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{LlmExtractionOracle, MockAIProvider, MockError};
    use crate::adapters::storage::InMemorySessionRepository;
    use crate::domain::session::SessionRecord;
    use crate::domain::setup::prompts;
    use serde_json::json;

    struct Fixture {
        repo: Arc<InMemorySessionRepository>,
        provider: MockAIProvider,
        handler: SendMessageHandler,
    }

    fn fixture(provider: MockAIProvider) -> Fixture {
        let repo = Arc::new(InMemorySessionRepository::new());
        let oracle = Arc::new(LlmExtractionOracle::new(Arc::new(provider.clone())));
        let handler = SendMessageHandler::new(
            repo.clone(),
            Arc::new(ConversationEngine::new(oracle)),
            Arc::new(SessionLocks::new()),
        );
        Fixture {
            repo,
            provider,
            handler,
        }
    }

    /// Stores a session already past the greeting, positioned at `step`.
    async fn seed(repo: &InMemorySessionRepository, step: &str) -> SessionId {
        let mut record = Session::new(SessionId::new(), None).to_record();
        record.current_step = step.to_string();
        let session = Session::reconstitute(record);
        let id = *session.id();
        repo.insert(session).await;
        id
    }

    fn send(id: SessionId, message: &str) -> SendMessageCommand {
        SendMessageCommand {
            session_id: id,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn turn_is_persisted() {
        let f = fixture(MockAIProvider::new().with_json(json!({"domain": "content", "reasoning": ""})));
        let id = seed(&f.repo, "classify_domain").await;

        let result = f.handler.handle(send(id, "A recipe blog")).await.unwrap();

        assert_eq!(result.reply, prompts::ask_actions(Some(crate::domain::setup::ProductDomain::Content)));
        assert_eq!(result.status, SessionStatus::Active);
        let stored = f.repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_step(), "extract_actions");
        assert_eq!(stored.product_description(), Some("A recipe blog"));
        assert_eq!(stored.messages().len(), 2);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let f = fixture(MockAIProvider::new());
        let id = seed(&f.repo, "classify_domain").await;

        let err = f.handler.handle(send(id, "   ")).await.unwrap_err();

        assert!(matches!(err, SessionError::ValidationFailed { .. }));
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let f = fixture(MockAIProvider::new());
        let id = SessionId::new();

        let err = f.handler.handle(send(id, "hello")).await.unwrap_err();

        assert_eq!(err, SessionError::NotFound(id));
    }

    #[tokio::test]
    async fn oracle_failure_keeps_user_message() {
        let f = fixture(MockAIProvider::new().with_error(MockError::Unavailable {
            message: "overloaded".into(),
        }));
        let id = seed(&f.repo, "extract_actions").await;

        let err = f.handler.handle(send(id, "purchases")).await.unwrap_err();

        assert!(matches!(err, SessionError::OracleFailure(_)));
        let stored = f.repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.current_step(), "extract_actions");
        assert!(stored.key_actions().is_empty());
        assert_eq!(stored.messages().len(), 1);
        assert!(stored.messages()[0].is_user());
    }

    #[tokio::test]
    async fn resend_after_failure_does_not_duplicate() {
        let f = fixture(
            MockAIProvider::new()
                .with_error(MockError::Network {
                    message: "reset".into(),
                })
                .with_json(json!({"actions": ["purchased"]})),
        );
        let id = seed(&f.repo, "extract_actions").await;

        assert!(f.handler.handle(send(id, "purchases")).await.is_err());
        let result = f.handler.handle(send(id, "purchases")).await.unwrap();

        assert_eq!(result.reply, prompts::ASK_SEGMENTS);
        let users = result.session.messages().iter().filter(|m| m.is_user()).count();
        assert_eq!(users, 1);
        assert_eq!(result.session.key_actions(), ["purchased".to_string()]);
    }

    #[tokio::test]
    async fn schema_failure_is_reported_separately() {
        let f = fixture(MockAIProvider::new().with_response("no json here"));
        let id = seed(&f.repo, "extract_goals").await;

        let err = f.handler.handle(send(id, "revenue")).await.unwrap_err();

        assert!(matches!(err, SessionError::SchemaConformance(_)));
        let stored = f.repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(!stored.ready_for_labeling());
    }

    #[tokio::test]
    async fn corrupted_step_is_invalid_step() {
        let f = fixture(MockAIProvider::new());
        let id = seed(&f.repo, "ask_budget").await;

        let err = f.handler.handle(send(id, "hello")).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidStep(ref msg) if msg.contains("ask_budget")));
        let stored = f.repo.find_by_id(&id).await.unwrap().unwrap();
        assert!(stored.messages().is_empty());
    }

    #[tokio::test]
    async fn ready_session_reports_status() {
        let f = fixture(MockAIProvider::new().with_json(json!({"goals": ["retention"]})));
        let id = seed(&f.repo, "extract_goals").await;

        let result = f.handler.handle(send(id, "retention")).await.unwrap();

        assert!(result.ready_for_labeling);
        assert_eq!(result.status, SessionStatus::ReadyForLabeling);
        assert!(result.reply.contains("Start Labeling"));
    }

    #[tokio::test]
    async fn complete_session_rejects_turns() {
        let f = fixture(MockAIProvider::new());
        let mut record: SessionRecord = Session::new(SessionId::new(), None).to_record();
        record.status = SessionStatus::Complete;
        record.current_step = "end".into();
        let session = Session::reconstitute(record);
        let id = *session.id();
        f.repo.insert(session).await;

        let err = f.handler.handle(send(id, "one more thing")).await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidState(_)));
    }
}
