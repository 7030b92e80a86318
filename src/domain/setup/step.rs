//! Named steps of the setup conversation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// One named unit of conversation logic with a fixed place in the flow.
///
/// `End` is the terminal marker: it names no step function and the engine
/// never executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Greeting,
    ClassifyDomain,
    AskActions,
    ExtractActions,
    AskSegments,
    ExtractSegments,
    AskGoals,
    ExtractGoals,
    Complete,
    End,
}

/// Shape of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Appends a fixed or templated question; never calls the oracle.
    Ask,
    /// Reads the latest user message and writes an extracted field.
    Extract,
    /// Terminal marker.
    Terminal,
}

impl Step {
    /// Every step, in conversational order, terminal marker last.
    pub const ALL: [Step; 10] = [
        Step::Greeting,
        Step::ClassifyDomain,
        Step::AskActions,
        Step::ExtractActions,
        Step::AskSegments,
        Step::ExtractSegments,
        Step::AskGoals,
        Step::ExtractGoals,
        Step::Complete,
        Step::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Greeting => "greeting",
            Step::ClassifyDomain => "classify_domain",
            Step::AskActions => "ask_actions",
            Step::ExtractActions => "extract_actions",
            Step::AskSegments => "ask_segments",
            Step::ExtractSegments => "extract_segments",
            Step::AskGoals => "ask_goals",
            Step::ExtractGoals => "extract_goals",
            Step::Complete => "complete",
            Step::End => "end",
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::Greeting
            | Step::AskActions
            | Step::AskSegments
            | Step::AskGoals
            | Step::Complete => StepKind::Ask,
            Step::ClassifyDomain
            | Step::ExtractActions
            | Step::ExtractSegments
            | Step::ExtractGoals => StepKind::Extract,
            Step::End => StepKind::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind() == StepKind::Terminal
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Step {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format("current_step", format!("unknown step '{}'", s))
            })
    }
}
