//! PostgreSQL implementation of SessionRepository.
//!
//! Persists setup sessions to the `setup_sessions` table. Message history and
//! the extracted lists are stored as JSONB; the step cursor is stored as its
//! name and only parsed when a conversation resumes.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectId, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::{Session, SessionRecord};
use crate::domain::setup::{Message, ProductDomain};
use crate::ports::SessionRepository;

const SELECT_COLUMNS: &str = r#"
    id, project_id, status, messages, product_description, domain,
    key_actions, user_segments, business_goals, current_step,
    ready_for_labeling, created_at, updated_at
"#;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, project_id: Option<ProjectId>) -> Result<Session, DomainError> {
        let session = Session::new(SessionId::new(), project_id);

        sqlx::query(
            r#"
            INSERT INTO setup_sessions (
                id, project_id, status, messages, product_description, domain,
                key_actions, user_segments, business_goals, current_step,
                ready_for_labeling, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.project_id().map(ProjectId::as_str))
        .bind(session.status().as_str())
        .bind(Json(session.messages()))
        .bind(session.product_description())
        .bind(session.domain().map(|d| d.as_str()))
        .bind(Json(session.key_actions()))
        .bind(Json(session.user_segments()))
        .bind(Json(session.business_goals()))
        .bind(session.current_step())
        .bind(session.ready_for_labeling())
        .bind(session.created_at().as_datetime())
        .bind(session.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert session: {}", e),
            )
        })?;

        Ok(session)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM setup_sessions WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch session: {}", e),
            )
        })?;

        row.map(row_to_session).transpose()
    }

    async fn update(&self, session: &Session) -> Result<Session, DomainError> {
        let mut stored = session.clone();
        stored.touch();

        let result = sqlx::query(
            r#"
            UPDATE setup_sessions SET
                status = $2,
                messages = $3,
                product_description = $4,
                domain = $5,
                key_actions = $6,
                user_segments = $7,
                business_goals = $8,
                current_step = $9,
                ready_for_labeling = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(stored.id().as_uuid())
        .bind(stored.status().as_str())
        .bind(Json(stored.messages()))
        .bind(stored.product_description())
        .bind(stored.domain().map(|d| d.as_str()))
        .bind(Json(stored.key_actions()))
        .bind(Json(stored.user_segments()))
        .bind(Json(stored.business_goals()))
        .bind(stored.current_step())
        .bind(stored.ready_for_labeling())
        .bind(stored.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update session: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", stored.id()),
            ));
        }

        Ok(stored)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn column<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    })
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;

    let project_id = column::<Option<String>>(&row, "project_id")?
        .map(ProjectId::new)
        .transpose()
        .map_err(|e| DomainError::database(format!("Invalid project_id: {}", e)))?;

    let status = column::<String>(&row, "status")?
        .parse::<SessionStatus>()
        .map_err(|e| DomainError::database(format!("Invalid session status: {}", e)))?;

    let domain = column::<Option<String>>(&row, "domain")?
        .map(|d| d.parse::<ProductDomain>())
        .transpose()
        .map_err(|e| DomainError::database(format!("Invalid domain: {}", e)))?;

    let Json(messages): Json<Vec<Message>> = column(&row, "messages")?;
    let Json(key_actions): Json<Vec<String>> = column(&row, "key_actions")?;
    let Json(user_segments): Json<Vec<String>> = column(&row, "user_segments")?;
    let Json(business_goals): Json<Vec<String>> = column(&row, "business_goals")?;

    let created_at: chrono::DateTime<chrono::Utc> = column(&row, "created_at")?;
    let updated_at: chrono::DateTime<chrono::Utc> = column(&row, "updated_at")?;

    Ok(Session::reconstitute(SessionRecord {
        id: SessionId::from_uuid(id),
        project_id,
        status,
        messages,
        product_description: column(&row, "product_description")?,
        domain,
        key_actions,
        user_segments,
        business_goals,
        current_step: column(&row, "current_step")?,
        ready_for_labeling: column(&row, "ready_for_labeling")?,
        created_at: Timestamp::from_datetime(created_at),
        updated_at: Timestamp::from_datetime(updated_at),
    }))
}
