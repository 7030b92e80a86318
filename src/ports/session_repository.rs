//! Session repository port.
//!
//! Defines the contract for persisting and retrieving setup sessions. The
//! repository is the single durable copy of every conversation; nothing else
//! caches session state between requests.

use crate::domain::foundation::{DomainError, ProjectId, SessionId};
use crate::domain::session::Session;
use async_trait::async_trait;

/// Repository port for Session aggregate persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create and store a new active session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, project_id: Option<ProjectId>) -> Result<Session, DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Replace a stored session, stamping `updated_at`.
    ///
    /// Returns the session as stored.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, session: &Session) -> Result<Session, DomainError>;
}
