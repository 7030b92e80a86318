//! Extraction oracle backed by a chat-completion provider.
//!
//! Structured extraction sends the schema as JSON-format instructions in the
//! system prompt, asks for JSON output and pulls the first JSON object out of
//! whatever the model returns (bare or inside a fenced block).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::setup::ExtractionSchema;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, ExtractionOracle, MessageRole, OracleError,
    RequestMetadata,
};

const EXTRACTION_SYSTEM_PROMPT: &str = "You extract structured data from answers given by \
someone setting up product analytics. Respond with a single JSON object and nothing else.";

/// [`ExtractionOracle`] over any [`AIProvider`].
pub struct LlmExtractionOracle {
    provider: Arc<dyn AIProvider>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmExtractionOracle {
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn request(&self, system_prompt: &str, user_prompt: &str) -> CompletionRequest {
        let mut request = CompletionRequest::new(RequestMetadata::new(Uuid::new_v4().to_string()))
            .with_system_prompt(system_prompt)
            .with_message(MessageRole::User, user_prompt);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    async fn send(&self, request: CompletionRequest) -> Result<String, OracleError> {
        self.provider
            .complete(request)
            .await
            .map(|response| response.content)
            .map_err(oracle_error)
    }
}

/// Format instructions appended to the extraction prompt.
pub fn format_instructions(schema: ExtractionSchema) -> String {
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         Here is the output schema:\n```\n{}\n```",
        schema.json_schema()
    )
}

/// Finds the JSON object in a model answer.
///
/// Accepts bare JSON, JSON inside a ```json fence, or JSON surrounded by prose.
pub fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn oracle_error(err: AIError) -> OracleError {
    match err {
        AIError::Timeout { timeout_secs } => OracleError::Timeout {
            timeout_ms: u64::from(timeout_secs) * 1000,
        },
        other => OracleError::unavailable(other.to_string()),
    }
}

#[async_trait]
impl ExtractionOracle for LlmExtractionOracle {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, OracleError> {
        self.send(self.request(system_prompt, user_prompt)).await
    }

    async fn extract_structured(
        &self,
        schema: ExtractionSchema,
        prompt: &str,
    ) -> Result<Value, OracleError> {
        let user_prompt = format!("{}\n\n{}", prompt, format_instructions(schema));
        let request = self
            .request(EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .with_json_response();

        let content = self.send(request).await?;
        let value = extract_json(&content).ok_or_else(|| {
            OracleError::schema_conformance(schema, "model output contained no JSON object")
        })?;

        tracing::debug!(schema = %schema, "Structured extraction received");
        Ok(value)
    }
}
