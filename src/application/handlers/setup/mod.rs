//! Setup session handlers.
//!
//! Commands and queries for the guided setup conversation.

mod complete_labeling;
mod create_session;
mod get_session;
mod send_message;
mod session_locks;

pub use complete_labeling::{CompleteLabelingCommand, CompleteLabelingHandler};
pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use send_message::{SendMessageCommand, SendMessageHandler, SendMessageResult};
pub use session_locks::SessionLocks;
