//! Cortex enhancement flow through the HTTP surface, with a stubbed client.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use snowdax::config::ServerConfig;
use snowdax::cortex::CortexClient;
use snowdax::server::{build_router, AppState};

struct StubCortex {
    reply: &'static str,
}

#[async_trait]
impl CortexClient for StubCortex {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.reply.to_string())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

fn app_with_cortex(reply: &'static str) -> Router {
    let state = Arc::new(AppState {
        config: ServerConfig {
            cortex_enabled: true,
            ..ServerConfig::default()
        },
        cortex_client: Some(Arc::new(StubCortex { reply })),
    });
    build_router(state)
}

async fn request(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn low_confidence_translation_is_enhanced() {
    // Unpatterned functions keep the deterministic confidence at LOW, which
    // is the trigger for the Cortex pass.
    let (status, body) = request(
        app_with_cortex("SELECT enhanced"),
        "POST",
        "/translate/expression",
        Some(json!({ "dax": "FOO(BAR([a]), BAZ([b]))" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sql"], "SELECT enhanced");
    assert_eq!(body["confidence"], "MEDIUM");
}

#[tokio::test]
async fn high_confidence_translation_is_untouched() {
    let (_, body) = request(
        app_with_cortex("SELECT enhanced"),
        "POST",
        "/translate/expression",
        Some(json!({ "dax": "SUM(Sales[Amount])" })),
    )
    .await;

    assert_eq!(body["sql"], "SUM(sales.amount)");
    assert_eq!(body["confidence"], "HIGH");
}

#[tokio::test]
async fn cortex_status_reports_the_stub_client() {
    let (status, body) = request(
        app_with_cortex("ignored"),
        "GET",
        "/translate/cortex/status",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], true);
    assert_eq!(body["enabled"], true);
    assert_eq!(body["model"], "stub-model");
}

#[tokio::test]
async fn cortex_completion_endpoint_answers_directly() {
    let (status, body) = request(
        app_with_cortex("SELECT 42"),
        "POST",
        "/translate/cortex",
        Some(json!({ "prompt": "translate this" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion"], "SELECT 42");
    assert_eq!(body["model"], "stub-model");
}
