//! In-Memory Session Repository
//!
//! Stores setup sessions in memory. Used for tests and as the development
//! fallback when no database is configured; contents are lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, SessionId};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// In-memory storage for setup sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a session as-is, bypassing `create` (useful for tests).
    pub async fn insert(&self, session: Session) {
        self.sessions.write().await.insert(*session.id(), session);
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, project_id: Option<ProjectId>) -> Result<Session, DomainError> {
        let session = Session::new(SessionId::new(), project_id);
        self.sessions
            .write()
            .await
            .insert(*session.id(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update(&self, session: &Session) -> Result<Session, DomainError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.get_mut(session.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            )
        })?;

        let mut stored = session.clone();
        stored.touch();
        *slot = stored.clone();
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionStatus;

    #[tokio::test]
    async fn create_then_find() {
        let repo = InMemorySessionRepository::new();
        let project = ProjectId::new("proj_1").unwrap();

        let created = repo.create(Some(project.clone())).await.unwrap();
        let found = repo.find_by_id(created.id()).await.unwrap().unwrap();

        assert_eq!(found, created);
        assert_eq!(found.project_id(), Some(&project));
        assert_eq!(found.status(), SessionStatus::Active);
        assert_eq!(repo.session_count().await, 1);
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let repo = InMemorySessionRepository::new();
        assert!(repo.find_by_id(&SessionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_stamps_updated_at() {
        let repo = InMemorySessionRepository::new();
        let created = repo.create(None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = repo.update(&created).await.unwrap();

        assert!(updated.updated_at().is_after(created.updated_at()));
        let found = repo.find_by_id(created.id()).await.unwrap().unwrap();
        assert_eq!(found.updated_at(), updated.updated_at());
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let repo = InMemorySessionRepository::new();
        let orphan = Session::new(SessionId::new(), None);

        let err = repo.update(&orphan).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SessionNotFound);
        assert_eq!(repo.session_count().await, 0);
    }
}
