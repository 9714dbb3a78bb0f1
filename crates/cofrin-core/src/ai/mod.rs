//! Pluggable AI gateway abstraction
//!
//! A single interface over the remote generative-language call. The backend
//! is selected once at the composition root (not through runtime-mutable
//! factories) and injected into the orchestrators.
//!
//! # Architecture
//!
//! - `AiBackend` trait: the gateway contract - submit a prompt, get text back
//! - `AiClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `COFRIN_AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)
//! - `GEMINI_HOST`: API host override (used by tests/self-hosted proxies)
//! - `COFRIN_AI_TIMEOUT_SECS`: Request timeout (default: 30)

mod gemini;
mod mock;
pub mod parsing;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use parsing::parse_insights;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the gateway contract for all AI backends
///
/// One network round trip per `generate` call, best-effort and
/// single-attempt. Implementations convert every provider failure mode into
/// a typed error; nothing provider-specific crosses this boundary.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Submit a prompt and return the model's raw text response
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AiClient {
    /// Gemini REST backend (generateContent API)
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AiClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `COFRIN_AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEMINI_API_KEY, GEMINI_MODEL, GEMINI_HOST
    /// - `mock`: Creates a mock backend for testing/offline development
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("COFRIN_AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(AiClient::Gemini),
            "mock" => Some(AiClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown COFRIN_AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(AiClient::Gemini)
            }
        }
    }

    /// Create a Gemini backend directly
    pub fn gemini(model: &str, api_key: &str) -> Self {
        AiClient::Gemini(GeminiBackend::new(model, api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AiClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AiClient::Gemini(b) => AiClient::Gemini(b.with_model(model)),
            AiClient::Mock(b) => AiClient::Mock(b.with_model(model)),
        }
    }
}

#[async_trait]
impl AiBackend for AiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            AiClient::Gemini(b) => b.generate(prompt).await,
            AiClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AiClient::Gemini(b) => b.health_check().await,
            AiClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AiClient::Gemini(b) => b.model(),
            AiClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AiClient::Gemini(b) => b.host(),
            AiClient::Mock(b) => b.host(),
        }
    }
}
