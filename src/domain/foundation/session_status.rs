//! SessionStatus enum for tracking lifecycle of setup sessions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle status of a setup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Conversation still gathering metadata.
    #[default]
    Active,
    /// Conversation finished; element labeling may begin.
    ReadyForLabeling,
    /// Labeling workflow has handed the session back as done.
    Complete,
}

impl SessionStatus {
    /// Returns true if the conversation accepts new user turns.
    pub fn accepts_turns(&self) -> bool {
        !matches!(self, SessionStatus::Complete)
    }

    /// Returns the snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::ReadyForLabeling => "ready_for_labeling",
            SessionStatus::Complete => "complete",
        }
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Active, ReadyForLabeling) | (ReadyForLabeling, Complete)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Active => vec![ReadyForLabeling],
            ReadyForLabeling => vec![Complete],
            Complete => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "ready_for_labeling" => Ok(SessionStatus::ReadyForLabeling),
            "complete" => Ok(SessionStatus::Complete),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown session status '{}'", other),
            )),
        }
    }
}
