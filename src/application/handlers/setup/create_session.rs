//! CreateSessionHandler - Starts a new setup conversation.

use std::sync::Arc;

use crate::domain::foundation::ProjectId;
use crate::domain::session::{Session, SessionError};
use crate::domain::setup::ConversationEngine;
use crate::ports::SessionRepository;

/// Command to create a new setup session.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionCommand {
    pub project_id: Option<String>,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session: Session,
    /// Greeting the guide opens with.
    pub first_message: String,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    repository: Arc<dyn SessionRepository>,
    engine: Arc<ConversationEngine>,
}

impl CreateSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, engine: Arc<ConversationEngine>) -> Self {
        Self { repository, engine }
    }

    pub async fn handle(&self, cmd: CreateSessionCommand) -> Result<CreateSessionResult, SessionError> {
        let project_id = cmd.project_id.map(ProjectId::new).transpose()?;

        let mut session = self.repository.create(project_id).await?;

        let mut state = session.conversation_state()?;
        let outcome = self.engine.open(&mut state).await?;
        session.absorb(state);
        let session = self.repository.update(&session).await?;

        tracing::info!(session_id = %session.id(), "Setup session created");

        Ok(CreateSessionResult {
            first_message: outcome.reply.unwrap_or_default(),
            session,
        })
    }
}
