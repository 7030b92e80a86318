//! Setup conversation - guided elicitation of analytics metadata.
//!
//! A fixed sequence of steps asks the operator what they are building, which
//! actions matter, who their users are and what they measure. Extract steps
//! hand the answers to an [`ExtractionOracle`](crate::ports::ExtractionOracle);
//! the [`Router`] decides what runs next and the [`ConversationEngine`] drives
//! one turn at a time.

mod engine;
mod errors;
mod extraction;
mod message;
mod product_domain;
pub mod prompts;
mod router;
mod state;
mod step;
mod steps;

pub use engine::{ConversationEngine, TurnOutcome};
pub use errors::EngineError;
pub use extraction::{
    decode, normalize_actions, normalize_list, DomainClassification, ExtractedActions,
    ExtractedGoals, ExtractedSegments, Extraction, ExtractionSchema,
};
pub use message::{Message, Role};
pub use product_domain::ProductDomain;
pub use router::Router;
pub use state::ConversationState;
pub use step::{Step, StepKind};
pub use steps::{signals_no_segments, FieldUpdate, StepOutput};
