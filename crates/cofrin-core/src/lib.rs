//! Cofrin Core Library
//!
//! Shared functionality for the Cofrin personal finance assistant:
//! - Domain models (transactions, categories, budgets, savings goals)
//! - Financial aggregator (totals and rankings from a transaction snapshot)
//! - Prompt library and builders for the AI assistant
//! - Pluggable AI gateway (Gemini REST backend, mock backend)
//! - Tolerant parsing of model responses into typed insights
//! - Insight and chat orchestrators exposed to the UI layer
//!
//! The UI, navigation, notifications and the backing document store are
//! external collaborators: they hand this crate transaction/budget snapshots
//! and observe the typed results it publishes.

pub mod ai;
pub mod chat;
pub mod context;
pub mod error;
pub mod insights;
pub mod models;
pub mod prompts;
pub mod summary;

/// Test utilities including a mock generateContent server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AiBackend, AiClient, GeminiBackend, MockBackend};
pub use chat::{ChatMessage, ChatSession, CHAT_ERROR_REPLY};
pub use context::UserFinancialContext;
pub use error::{Error, Result};
pub use insights::{Insight, InsightCategory, InsightOrchestrator, RequestState};
pub use models::{Budget, Category, SavingsGoal, Transaction, TransactionKind};
pub use prompts::{
    build_chat_prompt, build_insight_prompt, format_brl, Prompt, PromptId, PromptLibrary,
};
pub use summary::{summarize, FinancialSummary, YearMonth};
