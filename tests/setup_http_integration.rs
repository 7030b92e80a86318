//! Integration tests for the setup HTTP API.
//!
//! Drives the full axum router with `oneshot` requests over the in-memory
//! store and an extraction oracle backed by the mock AI provider:
//! 1. The four-turn setup conversation end to end
//! 2. Error statuses for bad input, unknown sessions and oracle failures
//! 3. Session lifecycle through labeling completion

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use betterheap_setup::adapters::ai::{LlmExtractionOracle, MockAIProvider, MockError, MockResponse};
use betterheap_setup::adapters::http::{api_router, HttpOptions, SetupHandlers};
use betterheap_setup::adapters::storage::InMemorySessionRepository;
use betterheap_setup::domain::foundation::SessionId;
use betterheap_setup::domain::session::Session;
use betterheap_setup::domain::setup::{prompts, ConversationEngine, ProductDomain};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    repo: Arc<InMemorySessionRepository>,
    provider: MockAIProvider,
}

fn test_app(provider: MockAIProvider) -> TestApp {
    let repo = Arc::new(InMemorySessionRepository::new());
    let oracle = LlmExtractionOracle::new(Arc::new(provider.clone())).with_temperature(0.7);
    let engine = Arc::new(ConversationEngine::new(Arc::new(oracle)));
    let handlers = SetupHandlers::wire(repo.clone(), engine);

    TestApp {
        router: api_router(handlers, &HttpOptions::default()),
        repo,
        provider,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_session(&self) -> String {
        let (status, body) = self.send("POST", "/api/v1/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    async fn message(&self, session_id: &str, message: &str) -> (StatusCode, Value) {
        self.send(
            "POST",
            &format!("/api/v1/sessions/{}/messages", session_id),
            Some(json!({ "message": message })),
        )
        .await
    }
}

fn shoe_store_provider() -> MockAIProvider {
    MockAIProvider::new()
        .with_json(json!({"domain": "ecommerce", "reasoning": "sells shoes online"}))
        .with_json(json!({"actions": ["Viewed Product", "added-to-cart", "purchased"]}))
        .with_json(json!({"goals": ["conversion rate", "revenue"]}))
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = app.send("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn create_session_returns_greeting() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = app
        .send("POST", "/api/v1/sessions", Some(json!({"project_id": "proj_1"})))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["first_message"], prompts::GREETING);
    assert_eq!(body["status"], "active");
    assert_eq!(app.repo.session_count().await, 1);
    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn blank_project_id_is_rejected() {
    let app = test_app(MockAIProvider::new());

    let (status, body) = app
        .send("POST", "/api/v1/sessions", Some(json!({"project_id": "  "})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(app.repo.session_count().await, 0);
}

#[tokio::test]
async fn four_turn_conversation_reaches_labeling() {
    let app = test_app(shoe_store_provider());
    let id = app.create_session().await;

    let (status, body) = app.message(&id, "I run an online shoe store").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], prompts::ask_actions(Some(ProductDomain::Ecommerce)));
    assert_eq!(body["ready_for_labeling"], false);
    assert_eq!(body["next_action"], Value::Null);

    let (status, body) = app
        .message(&id, "viewing products, adding to cart, and buying")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], prompts::ASK_SEGMENTS);

    let (status, body) = app.message(&id, "No, everyone's the same").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], prompts::ASK_GOALS);

    let (status, body) = app.message(&id, "conversion rate and revenue").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready_for_labeling"], true);
    assert_eq!(body["status"], "ready_for_labeling");
    assert_eq!(body["next_action"], "start_labeling");
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.contains("viewed_product, added_to_cart, purchased"));

    // Segments were answered without consulting the oracle.
    assert_eq!(app.provider.call_count(), 3);

    let (status, view) = app
        .send("GET", &format!("/api/v1/sessions/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["domain"], "ecommerce");
    assert_eq!(view["product_description"], "I run an online shoe store");
    assert_eq!(
        view["key_actions"],
        json!(["viewed_product", "added_to_cart", "purchased"])
    );
    assert_eq!(view["user_segments"], json!([]));
    assert_eq!(view["business_goals"], json!(["conversion rate", "revenue"]));
    assert_eq!(view["messages"].as_array().unwrap().len(), 9);
    assert_eq!(view["messages"][0]["role"], "assistant");
    assert_eq!(view["messages"][1]["role"], "user");
}

#[tokio::test]
async fn completed_session_rejects_further_turns() {
    let app = test_app(shoe_store_provider());
    let id = app.create_session().await;

    // Not ready yet.
    let (status, _) = app
        .send("POST", &format!("/api/v1/sessions/{}/complete", id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for message in [
        "I run an online shoe store",
        "buying shoes",
        "no",
        "revenue",
    ] {
        let (status, _) = app.message(&id, message).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, view) = app
        .send("POST", &format!("/api/v1/sessions/{}/complete", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "complete");
    assert_eq!(view["ready_for_labeling"], true);

    let (status, body) = app.message(&id, "one more thing").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = test_app(MockAIProvider::new());
    let id = app.create_session().await;

    let (status, _) = app.message("not-a-uuid", "hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.message(&id, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = SessionId::new().to_string();
    let (status, body) = app.message(&missing, "hello").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains(&missing));

    let (status, _) = app
        .send("GET", &format!("/api/v1/sessions/{}", missing), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(app.provider.call_count(), 0);
}

#[tokio::test]
async fn oracle_failure_is_retryable_and_keeps_message() {
    let app = test_app(
        MockAIProvider::new().with_error(MockError::Unavailable {
            message: "upstream overloaded".into(),
        }),
    );
    let id = app.create_session().await;

    let (status, body) = app.message(&id, "I write a recipe blog").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["details"]["retryable"], true);

    let (_, view) = app
        .send("GET", &format!("/api/v1/sessions/{}", id), None)
        .await;
    assert_eq!(view["current_step"], "classify_domain");
    assert_eq!(view["messages"].as_array().unwrap().len(), 2);

    app.provider.enqueue(MockResponse::Success {
        content: json!({"domain": "content", "reasoning": "blog"}).to_string(),
        usage: betterheap_setup::ports::TokenUsage::new(10, 5),
        finish_reason: betterheap_setup::ports::FinishReason::Stop,
    });
    let (status, body) = app.message(&id, "I write a recipe blog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], prompts::ask_actions(Some(ProductDomain::Content)));

    let (_, view) = app
        .send("GET", &format!("/api/v1/sessions/{}", id), None)
        .await;
    // Resending the same text does not record it twice.
    assert_eq!(view["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn schema_violation_maps_to_service_unavailable() {
    let app = test_app(MockAIProvider::new().with_response("I think it's a marketplace."));
    let id = app.create_session().await;

    let (status, body) = app.message(&id, "Buyers meet sellers").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SCHEMA_CONFORMANCE");
}

#[tokio::test]
async fn corrupted_step_surfaces_as_server_error() {
    let app = test_app(MockAIProvider::new());
    let mut record = Session::new(SessionId::new(), None).to_record();
    record.current_step = "ask_budget".to_string();
    let session = Session::reconstitute(record);
    let id = session.id().to_string();
    app.repo.insert(session).await;

    let (status, body) = app.message(&id, "hello").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("ask_budget"));
    assert_eq!(app.provider.call_count(), 0);
}
