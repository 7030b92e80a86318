//! Setup session aggregate.
//!
//! A session is the durable record of one setup conversation: its message
//! history, everything extracted so far, and the persisted step cursor. The
//! engine never sees a session; it works on a [`ConversationState`] built from
//! one and folded back afterwards.

use crate::domain::foundation::{
    DomainError, ErrorCode, ProjectId, SessionId, SessionStatus, StateMachine, Timestamp,
};
use crate::domain::setup::{ConversationState, EngineError, Message, ProductDomain, Step};
use serde::{Deserialize, Serialize};

/// Session aggregate.
///
/// # Invariants
///
/// - `messages` only grows
/// - `status == ReadyForLabeling` once the engine has reported readiness,
///   until the labeling workflow marks the session `Complete`
/// - `Complete` sessions accept no further turns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    project_id: Option<ProjectId>,
    status: SessionStatus,
    messages: Vec<Message>,
    product_description: Option<String>,
    domain: Option<ProductDomain>,
    key_actions: Vec<String>,
    user_segments: Vec<String>,
    business_goals: Vec<String>,
    /// Step name as stored; parsed when the conversation is resumed.
    current_step: String,
    ready_for_labeling: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

/// Flat view of a stored session, used by repositories.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub project_id: Option<ProjectId>,
    pub status: SessionStatus,
    pub messages: Vec<Message>,
    pub product_description: Option<String>,
    pub domain: Option<ProductDomain>,
    pub key_actions: Vec<String>,
    pub user_segments: Vec<String>,
    pub business_goals: Vec<String>,
    pub current_step: String,
    pub ready_for_labeling: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Session {
    /// Creates a new active session positioned at the greeting.
    pub fn new(id: SessionId, project_id: Option<ProjectId>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            project_id,
            status: SessionStatus::Active,
            messages: Vec::new(),
            product_description: None,
            domain: None,
            key_actions: Vec::new(),
            user_segments: Vec::new(),
            business_goals: Vec::new(),
            current_step: Step::Greeting.as_str().to_string(),
            ready_for_labeling: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    pub fn reconstitute(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            project_id: record.project_id,
            status: record.status,
            messages: record.messages,
            product_description: record.product_description,
            domain: record.domain,
            key_actions: record.key_actions,
            user_segments: record.user_segments,
            business_goals: record.business_goals,
            current_step: record.current_step,
            ready_for_labeling: record.ready_for_labeling,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn product_description(&self) -> Option<&str> {
        self.product_description.as_deref()
    }

    pub fn domain(&self) -> Option<ProductDomain> {
        self.domain
    }

    pub fn key_actions(&self) -> &[String] {
        &self.key_actions
    }

    pub fn user_segments(&self) -> &[String] {
        &self.user_segments
    }

    pub fn business_goals(&self) -> &[String] {
        &self.business_goals
    }

    /// Stored step name, possibly not a known step.
    pub fn current_step(&self) -> &str {
        &self.current_step
    }

    pub fn ready_for_labeling(&self) -> bool {
        self.ready_for_labeling
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Latest assistant message, if the guide has said anything yet.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_assistant())
            .map(Message::content)
    }

    /// Flattens the session for storage.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id,
            project_id: self.project_id.clone(),
            status: self.status,
            messages: self.messages.clone(),
            product_description: self.product_description.clone(),
            domain: self.domain,
            key_actions: self.key_actions.clone(),
            user_segments: self.user_segments.clone(),
            business_goals: self.business_goals.clone(),
            current_step: self.current_step.clone(),
            ready_for_labeling: self.ready_for_labeling,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation
    // ─────────────────────────────────────────────────────────────────────────

    /// Builds the engine state for the next turn.
    ///
    /// # Errors
    ///
    /// - `InvalidStepTransition` if the stored cursor names no known step
    pub fn conversation_state(&self) -> Result<ConversationState, EngineError> {
        let current_step = self
            .current_step
            .parse::<Step>()
            .map_err(|e| EngineError::InvalidStepTransition(e.to_string()))?;

        Ok(ConversationState {
            messages: self.messages.clone(),
            product_description: self.product_description.clone(),
            domain: self.domain,
            key_actions: self.key_actions.clone(),
            user_segments: self.user_segments.clone(),
            business_goals: self.business_goals.clone(),
            current_step,
            ready_for_labeling: self.ready_for_labeling,
        })
    }

    /// Folds an engine state back into the session.
    ///
    /// Promotes an active session to `ReadyForLabeling` the first time the
    /// state reports readiness.
    pub fn absorb(&mut self, state: ConversationState) {
        self.messages = state.messages;
        self.product_description = state.product_description;
        self.domain = state.domain;
        self.key_actions = state.key_actions;
        self.user_segments = state.user_segments;
        self.business_goals = state.business_goals;
        self.current_step = state.current_step.as_str().to_string();
        self.ready_for_labeling = self.ready_for_labeling || state.ready_for_labeling;

        if self.ready_for_labeling && self.status == SessionStatus::Active {
            self.status = SessionStatus::ReadyForLabeling;
        }
        self.touch();
    }

    /// Validates that the session can take another turn.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the session is complete
    pub fn ensure_accepts_turns(&self) -> Result<(), DomainError> {
        if self.status.accepts_turns() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Session is complete and accepts no further messages",
            ))
        }
    }

    /// Marks labeling as finished.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the session is ready for labeling
    pub fn complete_labeling(&mut self) -> Result<(), DomainError> {
        let current = self.status;
        self.status = current.transition_to(SessionStatus::Complete).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot complete a session that is {}", current),
            )
        })?;
        self.touch();
        Ok(())
    }

    /// Stamps `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
