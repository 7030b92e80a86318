//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionRepository` - Durable storage for setup sessions
//! - `ExtractionOracle` - Completion and structured extraction for setup steps
//! - `AIProvider` - Raw chat completions from a hosted model

mod ai_provider;
mod extraction_oracle;
mod session_repository;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use extraction_oracle::{ExtractionOracle, OracleError};
pub use session_repository::SessionRepository;
