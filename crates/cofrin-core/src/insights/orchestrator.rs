//! Insight orchestrator
//!
//! Sequences aggregation → prompt building → gateway call → parsing for the
//! insights feature, and maps the outcome into the request state the UI
//! layer observes. One logical request at a time; the gateway call is the
//! only suspension point, so cancellation is just dropping the future.

use tracing::{debug, warn};

use crate::ai::parsing::parse_insights;
use crate::ai::{AiBackend, AiClient};
use crate::error::Result;
use crate::models::Transaction;
use crate::prompts::build_insight_prompt;
use crate::summary::summarize;

use super::types::Insight;

/// Publication state for one user-initiated request
///
/// Idle → Loading → Ready | Failed, then back to Idle-equivalent for the
/// next request. The orchestrator produces the settled states; the observer
/// owns the transitions in between.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> RequestState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }
}

/// Orchestrates insight generation for one user's ledger
pub struct InsightOrchestrator {
    ai: AiClient,
}

impl InsightOrchestrator {
    pub fn new(ai: AiClient) -> Self {
        Self { ai }
    }

    /// Create from environment variables (see [`AiClient::from_env`])
    pub fn from_env() -> Option<Self> {
        AiClient::from_env().map(Self::new)
    }

    /// Generate insights for the given transaction snapshot
    ///
    /// An empty ledger short-circuits to the canned welcome insight without
    /// touching the gateway. A gateway failure propagates as `Err`; a parse
    /// failure does not - the response parser already degraded it to a
    /// diagnostic insight, so the call still succeeds.
    pub async fn generate_insights(&self, transactions: &[Transaction]) -> Result<Vec<Insight>> {
        if transactions.is_empty() {
            debug!("Empty ledger, skipping gateway call");
            return Ok(vec![Insight::welcome()]);
        }

        let summary = summarize(transactions);
        let prompt = build_insight_prompt(&summary)?;

        let raw = self.ai.generate(&prompt).await?;
        Ok(parse_insights(Some(&raw)))
    }

    /// Generate insights and settle into a [`RequestState`]
    ///
    /// Never panics and never surfaces a raw error: failures become a
    /// user-visible message.
    pub async fn run(&self, transactions: &[Transaction]) -> RequestState<Vec<Insight>> {
        match self.generate_insights(transactions).await {
            Ok(insights) => RequestState::Ready(insights),
            Err(e) => {
                warn!(error = %e, "Insight generation failed");
                RequestState::Failed(
                    "Não foi possível gerar insights agora. Verifique sua conexão e tente novamente."
                        .to_string(),
                )
            }
        }
    }
}
