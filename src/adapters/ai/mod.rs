//! AI Provider Adapters.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI chat models with retry and backoff
//! - `LlmExtractionOracle` - Extraction oracle built on any `AIProvider`

mod llm_oracle;
mod mock_provider;
mod openai_provider;

pub use llm_oracle::{extract_json, format_instructions, LlmExtractionOracle};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
