//! HTTP handlers for setup session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::setup::{
    CompleteLabelingCommand, CompleteLabelingHandler, CreateSessionCommand, CreateSessionHandler,
    GetSessionHandler, GetSessionQuery, SendMessageCommand, SendMessageHandler, SessionLocks,
};
use crate::domain::foundation::SessionId;
use crate::domain::session::SessionError;
use crate::domain::setup::ConversationEngine;
use crate::ports::SessionRepository;

use super::dto::{
    CreateSessionRequest, CreateSessionResponse, ErrorResponse, SendMessageRequest,
    SendMessageResponse, SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SetupHandlers {
    create_handler: Arc<CreateSessionHandler>,
    send_handler: Arc<SendMessageHandler>,
    get_handler: Arc<GetSessionHandler>,
    complete_handler: Arc<CompleteLabelingHandler>,
}

impl SetupHandlers {
    pub fn new(
        create_handler: Arc<CreateSessionHandler>,
        send_handler: Arc<SendMessageHandler>,
        get_handler: Arc<GetSessionHandler>,
        complete_handler: Arc<CompleteLabelingHandler>,
    ) -> Self {
        Self {
            create_handler,
            send_handler,
            get_handler,
            complete_handler,
        }
    }

    /// Builds every handler over one store and engine, sharing a lock table.
    pub fn wire(repository: Arc<dyn SessionRepository>, engine: Arc<ConversationEngine>) -> Self {
        let locks = Arc::new(SessionLocks::new());
        Self::new(
            Arc::new(CreateSessionHandler::new(repository.clone(), engine.clone())),
            Arc::new(SendMessageHandler::new(
                repository.clone(),
                engine,
                locks.clone(),
            )),
            Arc::new(GetSessionHandler::new(repository.clone())),
            Arc::new(CompleteLabelingHandler::new(repository, locks)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/sessions - Start a setup conversation
pub async fn create_session(
    State(handlers): State<SetupHandlers>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    let cmd = CreateSessionCommand {
        project_id: req.project_id,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(result) => {
            let response = CreateSessionResponse {
                session_id: result.session.id().to_string(),
                first_message: result.first_message,
                status: result.session.status(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/v1/sessions/:id/messages - Run one conversation turn
pub async fn send_message(
    State(handlers): State<SetupHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SendMessageCommand {
        session_id,
        message: req.message,
    };

    match handlers.send_handler.handle(cmd).await {
        Ok(result) => {
            let response =
                SendMessageResponse::new(result.reply, result.status, result.ready_for_labeling);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/v1/sessions/:id - Get the full session view
pub async fn get_session(
    State(handlers): State<SetupHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.get_handler.handle(GetSessionQuery { session_id }).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/v1/sessions/:id/complete - Labeling finished for this session
pub async fn complete_session(
    State(handlers): State<SetupHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .complete_handler
        .handle(CompleteLabelingCommand { session_id })
        .await
    {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn handle_session_error(error: SessionError) -> Response {
    let code = error.code().to_string();
    let message = error.message();
    match error {
        SessionError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", &id.to_string())),
        )
            .into_response(),
        SessionError::ValidationFailed { .. } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(message)),
        )
            .into_response(),
        SessionError::InvalidState(_) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(message)),
        )
            .into_response(),
        SessionError::OracleFailure(_) | SessionError::SchemaConformance(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::unavailable(code, message)),
        )
            .into_response(),
        SessionError::InvalidStep(_) => {
            tracing::error!(error = %message, "Session has a corrupt step cursor");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(code, message)),
            )
                .into_response()
        }
        SessionError::Infrastructure(_) => {
            tracing::error!(error = %message, "Setup request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal(message)),
            )
                .into_response()
        }
    }
}
