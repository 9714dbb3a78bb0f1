//! Mock backend for testing
//!
//! Returns configurable canned responses and records every prompt it
//! receives, so tests can assert both on what was sent and on how many
//! gateway calls a flow made (including zero).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AiBackend;

/// Canned reply: a well-formed 3-insight array matching the prompt contract
const DEFAULT_REPLY: &str = r#"[
  {"title": "Saldo positivo", "description": "Você fechou o período gastando menos do que ganhou.", "recommendation": "Guarde parte da sobra todo mês."},
  {"title": "Maior gasto: Alimentação", "description": "Alimentação concentra a maior fatia das suas despesas.", "recommendation": "Defina um teto mensal para a categoria."},
  {"title": "Despesas estáveis", "description": "Seus gastos mensais se mantiveram no mesmo patamar.", "recommendation": "Aproveite para planejar uma meta de poupança."}
]"#;

#[derive(Clone)]
enum MockReply {
    Text(String),
    Failure(String),
}

/// Mock AI backend
///
/// Healthy by default, answering every prompt with a fixed well-formed
/// insight array. Call records are shared across clones, so a test can keep
/// one handle while the orchestrator owns another.
#[derive(Clone)]
pub struct MockBackend {
    healthy: bool,
    reply: MockReply,
    call_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: MockReply::Text(DEFAULT_REPLY.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock that answers every prompt with the given text
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(text.into()),
            ..Self::new()
        }
    }

    /// Mock whose `generate` always fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Failure(message.into()),
            ..Self::new()
        }
    }

    /// Mock whose health check reports unavailable
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Number of `generate` calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// All prompts received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().last().cloned()
    }
}

#[async_trait]
impl AiBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Failure(message) => Err(Error::Api {
                status: 503,
                body: message.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_prompts_across_clones() {
        let mock = MockBackend::new();
        let clone = mock.clone();

        clone.generate("primeiro").await.unwrap();
        clone.generate("segundo").await.unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.prompts(), vec!["primeiro", "segundo"]);
        assert_eq!(mock.last_prompt().as_deref(), Some("segundo"));
    }

    #[tokio::test]
    async fn test_mock_default_reply_is_valid_contract_output() {
        let mock = MockBackend::new();
        let reply = mock.generate("qualquer").await.unwrap();
        let parsed = crate::ai::parsing::parse_insights(Some(&reply));
        assert_eq!(parsed.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_mock_surfaces_api_error() {
        let mock = MockBackend::failing("indisponível");
        let err = mock.generate("oi").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 503, .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
