//! Data Transfer Objects for setup session endpoints.
//!
//! These types decouple the HTTP API from domain types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionStatus;
use crate::domain::session::Session;
use crate::domain::setup::{Message, Role};

/// Next action hint returned once the conversation has collected everything.
pub const NEXT_ACTION_START_LABELING: &str = "start_labeling";

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new setup session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Request carrying one operator message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response for a newly created session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub first_message: String,
    pub status: SessionStatus,
}

/// Response for a completed conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub reply: String,
    pub status: SessionStatus,
    pub ready_for_labeling: bool,
    pub next_action: Option<String>,
}

impl SendMessageResponse {
    pub fn new(reply: String, status: SessionStatus, ready_for_labeling: bool) -> Self {
        Self {
            reply,
            status,
            ready_for_labeling,
            next_action: ready_for_labeling.then(|| NEXT_ACTION_START_LABELING.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_string(),
            timestamp: message.timestamp().as_datetime().to_rfc3339(),
        }
    }
}

/// Full view of a setup session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub project_id: Option<String>,
    pub status: SessionStatus,
    pub current_step: String,
    pub ready_for_labeling: bool,
    pub product_description: Option<String>,
    pub domain: Option<String>,
    pub key_actions: Vec<String>,
    pub user_segments: Vec<String>,
    pub business_goals: Vec<String>,
    pub messages: Vec<MessageResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            project_id: session.project_id().map(|p| p.as_str().to_string()),
            status: session.status(),
            current_step: session.current_step().to_string(),
            ready_for_labeling: session.ready_for_labeling(),
            product_description: session.product_description().map(str::to_string),
            domain: session.domain().map(|d| d.as_str().to_string()),
            key_actions: session.key_actions().to_vec(),
            user_segments: session.user_segments().to_vec(),
            business_goals: session.business_goals().to_vec(),
            messages: session.messages().iter().map(MessageResponse::from).collect(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            updated_at: session.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new("NOT_FOUND", format!("{} not found: {}", resource_type, id))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    /// Oracle trouble; the same request may be sent again.
    pub fn unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(serde_json::json!({ "retryable": true })),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
