//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSessionRepository` - Setup sessions with JSONB history and lists

mod session_repository;

pub use session_repository::PostgresSessionRepository;
