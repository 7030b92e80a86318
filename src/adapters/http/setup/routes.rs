//! HTTP routes for setup session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_session, create_session, get_session, send_message, SetupHandlers,
};

/// Creates the setup session router, mounted under `/api/v1/sessions`.
pub fn setup_routes(handlers: SetupHandlers) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(get_session))
        .route("/:id/messages", post(send_message))
        .route("/:id/complete", post(complete_session))
        .with_state(handlers)
}
