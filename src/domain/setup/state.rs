//! Conversation state threaded through the engine.
//!
//! One explicit value per turn: built from the persisted session, mutated by
//! the engine, folded back into the session. Nothing about conversation
//! progress lives anywhere else.

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};
use super::product_domain::ProductDomain;
use super::step::Step;

/// The mutable record every step reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub product_description: Option<String>,
    pub domain: Option<ProductDomain>,
    pub key_actions: Vec<String>,
    pub user_segments: Vec<String>,
    pub business_goals: Vec<String>,
    pub current_step: Step,
    pub ready_for_labeling: bool,
}

impl ConversationState {
    /// Fresh state: no messages, positioned at the greeting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a user utterance.
    ///
    /// Returns false when the utterance repeats a user message that is still
    /// awaiting a reply, which happens when a turn is retried after its
    /// extraction failed. Finished conversations always record the message.
    pub fn record_user_message(&mut self, content: &str) -> bool {
        let awaiting_reply = !self.current_step.is_terminal()
            && self
                .messages
                .last()
                .is_some_and(|m| m.is_user() && m.content() == content);

        if awaiting_reply {
            return false;
        }

        self.messages.push(Message::user(content));
        true
    }

    pub fn push_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Content of the most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.last_message_from(Role::User)
    }

    /// Content of the most recent assistant message, if any.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.last_message_from(Role::Assistant)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step.is_terminal()
    }

    fn last_message_from(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == role)
            .map(Message::content)
    }
}
