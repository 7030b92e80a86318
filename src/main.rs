//! BetterHeap setup service binary.
//!
//! Reads configuration from `BETTERHEAP__*` environment variables, wires the
//! session store, extraction oracle and conversation engine, and serves the
//! REST API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use betterheap_setup::adapters::http::{api_router, HttpOptions, SetupHandlers};
use betterheap_setup::adapters::{
    InMemorySessionRepository, LlmExtractionOracle, OpenAIConfig, OpenAIProvider,
    PostgresSessionRepository,
};
use betterheap_setup::config::{AppConfig, DatabaseConfig};
use betterheap_setup::domain::setup::ConversationEngine;
use betterheap_setup::ports::SessionRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    // JSON lines in production, compact text everywhere else.
    let production = config.server.is_production();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(production.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
        }))
        .with((!production).then(|| tracing_subscriber::fmt::layer().compact()))
        .init();

    config.validate()?;

    let repository = session_repository(config.database.as_ref()).await?;

    let api_key = config
        .ai
        .openai_api_key
        .clone()
        .ok_or("BETTERHEAP__AI__OPENAI_API_KEY is not set")?;
    let provider = OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;
    let oracle = LlmExtractionOracle::new(Arc::new(provider)).with_temperature(config.ai.temperature);
    let engine = ConversationEngine::new(Arc::new(oracle))
        .with_oracle_timeout(config.ai.extraction_timeout());

    tracing::info!(
        model = %config.ai.model,
        extraction_timeout_secs = config.ai.extraction_timeout_secs,
        "Extraction oracle configured"
    );

    let handlers = SetupHandlers::wire(repository, Arc::new(engine));
    let options = HttpOptions {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = api_router(handlers, &options);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "BetterHeap setup service listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn session_repository(
    database: Option<&DatabaseConfig>,
) -> Result<Arc<dyn SessionRepository>, Box<dyn std::error::Error>> {
    let Some(database) = database else {
        tracing::warn!("No database configured; sessions are kept in memory and lost on restart");
        return Ok(Arc::new(InMemorySessionRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(&database.url)
        .await?;
    let repository = PostgresSessionRepository::new(pool);

    if database.run_migrations {
        repository.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Arc::new(repository))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
