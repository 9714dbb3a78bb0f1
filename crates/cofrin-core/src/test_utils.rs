//! Test utilities for cofrin-core
//!
//! Provides a mock generateContent server so the Gemini backend can be
//! exercised over real HTTP without a provider account.

use axum::extract::{Json, Path, Query};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Sentinel that makes the mock return a safety block instead of text
pub const BLOCK_TRIGGER: &str = "TRIGGER_BLOCK";

/// Sentinel that makes the mock return an empty candidate list
pub const EMPTY_TRIGGER: &str = "TRIGGER_EMPTY";

/// Mock generateContent server for testing and development
pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new().route(
            "/v1beta/models/:model",
            get(handle_model_info).post(handle_generate),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model info endpoint (health check)
async fn handle_model_info(Path(model): Path<String>) -> Json<Value> {
    Json(json!({
        "name": format!("models/{}", model),
        "displayName": model,
        "supportedGenerationMethods": ["generateContent"],
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Deserialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Deserialize)]
struct RequestPart {
    text: String,
}

/// generateContent endpoint
///
/// The reply is chosen from the prompt content, mirroring what the real
/// model would produce for each prompt family.
async fn handle_generate(
    Path(model_and_action): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(request): Json<GenerateRequest>,
) -> Json<Value> {
    // The path segment arrives as "<model>:generateContent"
    assert!(
        model_and_action.ends_with(":generateContent"),
        "unexpected action in {}",
        model_and_action
    );
    assert!(query.contains_key("key"), "missing api key query parameter");

    let prompt = request
        .contents
        .first()
        .and_then(|content| content.parts.first())
        .map(|part| part.text.as_str())
        .unwrap_or_default();

    if prompt.contains(BLOCK_TRIGGER) {
        return Json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
    }

    if prompt.contains(EMPTY_TRIGGER) {
        return Json(json!({"candidates": []}));
    }

    let reply = if prompt.contains("array JSON") {
        // Insight prompt: answer with a fenced array, the way models do
        format!("```json\n{}\n```", insight_array_reply())
    } else {
        "Olá! Com base nos seus dados, seus gastos estão sob controle.".to_string()
    };

    Json(json!({
        "candidates": [
            {"content": {"parts": [{"text": reply}]}}
        ]
    }))
}

fn insight_array_reply() -> &'static str {
    r#"[
  {"title": "Saldo positivo", "description": "Sua renda cobre todas as despesas do período.", "recommendation": "Invista a diferença."},
  {"title": "Categoria dominante", "description": "Uma única categoria concentra boa parte dos gastos.", "recommendation": "Acompanhe essa categoria de perto."},
  {"title": "Gastos recentes", "description": "Os últimos meses mantêm o mesmo nível de despesa.", "recommendation": "Estabeleça um orçamento mensal."}
]"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiBackend, GeminiBackend};
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::with_host(&server.url(), "test-model", "test-key");

        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_fails_against_dead_server() {
        let url = {
            let mut server = MockGeminiServer::start().await;
            let url = server.url();
            server.stop();
            url
        };
        // Give the listener a moment to close
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let client = GeminiBackend::with_host(&url, "test-model", "test-key");
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::with_host(&server.url(), "test-model", "test-key");

        let text = client.generate("Qualquer pergunta").await.unwrap();
        assert!(text.contains("seus dados"));
    }

    #[tokio::test]
    async fn test_generate_insight_prompt_returns_fenced_array() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::with_host(&server.url(), "test-model", "test-key");

        let text = client
            .generate("Responda SOMENTE com um array JSON válido")
            .await
            .unwrap();
        let insights = crate::ai::parse_insights(Some(&text));
        assert_eq!(insights.len(), 3);
    }

    #[tokio::test]
    async fn test_blocked_prompt_surfaces_block_reason() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::with_host(&server.url(), "test-model", "test-key");

        let err = client.generate(BLOCK_TRIGGER).await.unwrap_err();
        match err {
            Error::Blocked(reason) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_surface_empty_response() {
        let server = MockGeminiServer::start().await;
        let client = GeminiBackend::with_host(&server.url(), "test-model", "test-key");

        let err = client.generate(EMPTY_TRIGGER).await.unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }
}
