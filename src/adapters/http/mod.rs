//! HTTP adapters - REST API implementations.
//!
//! `api_router` assembles the setup endpoints, the health check and the
//! tower-http middleware stack into the service `main` serves.

pub mod setup;

use std::time::Duration;

use axum::{routing::get, Json, Router};
use axum::http::{HeaderValue, Method};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use setup::{setup_routes, SetupHandlers};

/// Options for the outer middleware stack.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Upper bound on a whole request, oracle calls included.
    pub request_timeout: Duration,
    /// Allowed CORS origins; empty or `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            cors_origins: Vec::new(),
        }
    }
}

/// GET /health - Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Builds the full application router.
pub fn api_router(handlers: SetupHandlers, options: &HttpOptions) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/sessions", setup_routes(handlers))
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}
