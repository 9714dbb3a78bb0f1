//! AI-generated financial insights

pub mod orchestrator;
pub mod types;

pub use orchestrator::{InsightOrchestrator, RequestState};
pub use types::{Insight, InsightCategory};
