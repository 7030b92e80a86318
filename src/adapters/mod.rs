//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion providers and the extraction oracle built on them
//! - `http` - axum REST API
//! - `postgres` - PostgreSQL session store
//! - `storage` - In-memory session store for development and tests

pub mod ai;
pub mod http;
pub mod postgres;
pub mod storage;

pub use ai::{LlmExtractionOracle, MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use postgres::PostgresSessionRepository;
pub use storage::InMemorySessionRepository;
