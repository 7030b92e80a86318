//! CompleteLabelingHandler - Marks a session complete once labeling is done.

use std::sync::Arc;

use super::session_locks::SessionLocks;
use crate::domain::foundation::SessionId;
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

/// Command sent by the labeling workflow when it finishes.
#[derive(Debug, Clone)]
pub struct CompleteLabelingCommand {
    pub session_id: SessionId,
}

pub struct CompleteLabelingHandler {
    repository: Arc<dyn SessionRepository>,
    locks: Arc<SessionLocks>,
}

impl CompleteLabelingHandler {
    pub fn new(repository: Arc<dyn SessionRepository>, locks: Arc<SessionLocks>) -> Self {
        Self { repository, locks }
    }

    pub async fn handle(&self, cmd: CompleteLabelingCommand) -> Result<Session, SessionError> {
        let _guard = self.locks.acquire(cmd.session_id).await;

        let mut session = self
            .repository
            .find_by_id(&cmd.session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(cmd.session_id))?;

        session.complete_labeling()?;
        let session = self.repository.update(&session).await?;

        tracing::info!(session_id = %cmd.session_id, "Setup session completed");
        Ok(session)
    }
}
