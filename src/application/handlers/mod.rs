//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod setup;

pub use setup::{
    CompleteLabelingCommand, CompleteLabelingHandler, CreateSessionCommand, CreateSessionHandler,
    CreateSessionResult, GetSessionHandler, GetSessionQuery, SendMessageCommand,
    SendMessageHandler, SendMessageResult, SessionLocks,
};
