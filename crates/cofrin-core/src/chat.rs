//! Conversational chat with financial context
//!
//! Maintains an append-only transcript and rebuilds the user's financial
//! context from the current snapshots on every turn. The first turn lets the
//! assistant introduce itself; follow-up prompts carry an explicit
//! no-reintroduction instruction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ai::{AiBackend, AiClient};
use crate::context::UserFinancialContext;
use crate::models::{Budget, Transaction};
use crate::prompts::build_chat_prompt;

/// Fallback assistant reply when the gateway call fails
///
/// Appended to the transcript in place of a real answer - the conversation
/// degrades to a message, it never crashes or loses the user's turn.
pub const CHAT_ERROR_REPLY: &str =
    "Desculpe, não consegui responder agora. Tente novamente em instantes.";

/// One transcript entry, stamped with sender and time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub from_user: bool,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_user: true,
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            from_user: false,
            sent_at: Utc::now(),
        }
    }
}

/// A running conversation with the financial assistant
pub struct ChatSession {
    ai: AiClient,
    transcript: Vec<ChatMessage>,
    first_turn: bool,
}

impl ChatSession {
    pub fn new(ai: AiClient) -> Self {
        Self {
            ai,
            transcript: Vec::new(),
            first_turn: true,
        }
    }

    /// Create from environment variables (see [`AiClient::from_env`])
    pub fn from_env() -> Option<Self> {
        AiClient::from_env().map(Self::new)
    }

    /// The full conversation so far, oldest first
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Whether the assistant has answered successfully yet
    pub fn is_first_turn(&self) -> bool {
        self.first_turn
    }

    /// Send one user message and get the assistant's reply
    ///
    /// Context is assembled fresh from the given snapshots. On gateway
    /// failure the canned [`CHAT_ERROR_REPLY`] becomes the assistant entry,
    /// the transcript stays consistent (two entries per turn) and the
    /// first-turn flag is not consumed.
    pub async fn send(
        &mut self,
        message: &str,
        transactions: &[Transaction],
        budgets: &[Budget],
    ) -> &ChatMessage {
        self.transcript.push(ChatMessage::user(message));

        let context = UserFinancialContext::assemble(transactions, budgets, Utc::now());

        let outcome = match build_chat_prompt(message, Some(&context), self.first_turn) {
            Ok(prompt) => self.ai.generate(&prompt).await,
            Err(e) => Err(e),
        };

        let reply = match outcome {
            Ok(text) => {
                self.first_turn = false;
                ChatMessage::assistant(text.trim().to_string())
            }
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                ChatMessage::assistant(CHAT_ERROR_REPLY)
            }
        };

        self.transcript.push(reply);
        self.transcript.last().expect("reply just appended")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::models::{Category, TransactionKind};
    use chrono::TimeZone;

    fn ledger() -> Vec<Transaction> {
        vec![Transaction {
            id: "t1".to_string(),
            kind: TransactionKind::Expense,
            amount: 120.0,
            category: Category::food(),
            description: "Feira".to_string(),
            date: chrono::Utc.with_ymd_and_hms(2026, 7, 5, 12, 0, 0).unwrap(),
            owner_id: "u1".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_two_turns_produce_four_ordered_messages() {
        let spy = MockBackend::with_response("Claro, posso ajudar!");
        let mut session = ChatSession::new(AiClient::Mock(spy.clone()));

        session.send("Quanto gastei?", &ledger(), &[]).await;
        session.send("E este mês?", &ledger(), &[]).await;

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert!(transcript[0].from_user);
        assert!(!transcript[1].from_user);
        assert!(transcript[2].from_user);
        assert!(!transcript[3].from_user);
        assert_eq!(transcript[0].text, "Quanto gastei?");
        assert_eq!(transcript[2].text, "E este mês?");
    }

    #[tokio::test]
    async fn test_second_prompt_reflects_followup_framing() {
        let spy = MockBackend::with_response("Oi!");
        let mut session = ChatSession::new(AiClient::Mock(spy.clone()));

        session.send("Primeira pergunta", &ledger(), &[]).await;
        session.send("Segunda pergunta", &ledger(), &[]).await;

        let prompts = spy.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("não se apresente novamente"));
        assert!(prompts[1].contains("não se apresente novamente"));
    }

    #[tokio::test]
    async fn test_prompt_carries_fresh_financial_context() {
        let spy = MockBackend::with_response("Certo.");
        let mut session = ChatSession::new(AiClient::Mock(spy.clone()));

        session.send("Como estou?", &ledger(), &[]).await;

        let prompt = spy.last_prompt().unwrap();
        assert!(prompt.contains("Contexto financeiro do usuário"));
        assert!(prompt.contains("R$ 120,00"));
        assert!(prompt.contains("Pergunta do usuário: Como estou?"));
    }

    #[tokio::test]
    async fn test_failure_appends_error_reply_and_keeps_first_turn() {
        let mut session = ChatSession::new(AiClient::Mock(MockBackend::failing("offline")));

        let reply = session.send("Oi", &ledger(), &[]).await;
        assert_eq!(reply.text, CHAT_ERROR_REPLY);
        assert!(!reply.from_user);

        assert_eq!(session.transcript().len(), 2);
        assert!(session.is_first_turn());
    }

    #[tokio::test]
    async fn test_recovery_after_failure_still_introduces() {
        let failing = MockBackend::failing("offline");
        let mut session = ChatSession::new(AiClient::Mock(failing));
        session.send("Oi", &ledger(), &[]).await;

        // Swap in a healthy backend; the next prompt is still a first turn
        let healthy = MockBackend::with_response("Olá! Sou o Cofrin.");
        session.ai = AiClient::Mock(healthy.clone());
        session.send("Oi de novo", &ledger(), &[]).await;

        assert!(!healthy.last_prompt().unwrap().contains("não se apresente novamente"));
        assert!(!session.is_first_turn());
    }
}
