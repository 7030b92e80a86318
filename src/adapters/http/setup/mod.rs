//! HTTP adapter for setup session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateSessionRequest, CreateSessionResponse, ErrorResponse, MessageResponse,
    SendMessageRequest, SendMessageResponse, SessionResponse, NEXT_ACTION_START_LABELING,
};
pub use handlers::SetupHandlers;
pub use routes::setup_routes;
