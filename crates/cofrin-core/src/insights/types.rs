//! Core types for AI-generated insights

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tag for an insight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    #[default]
    General,
    Spending,
    Savings,
    Budget,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Spending => "spending",
            Self::Savings => "savings",
            Self::Budget => "budget",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Self::General),
            "spending" => Ok(Self::Spending),
            "savings" => Ok(Self::Savings),
            "budget" => Ok(Self::Budget),
            _ => Err(format!("Unknown insight category: {}", s)),
        }
    }
}

/// Maximum length of the raw-text prefix embedded in diagnostic insights
pub const DIAGNOSTIC_PREFIX_CHARS: usize = 150;

/// A short structured finding about the user's finances
///
/// Produced only by the response parser or by the static fallback
/// constructors below. The prompt contract asks the model for a title of at
/// most 50 characters, a description of at most 150 and a recommendation of
/// at most 100; the ceilings are instructions to the model, not validated
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub category: InsightCategory,
}

impl Insight {
    /// Canned insight for a user with no transactions yet
    ///
    /// The insight orchestrator returns this without touching the gateway.
    pub fn welcome() -> Self {
        Self {
            title: "Bem-vindo ao Cofrin!".to_string(),
            description: "Adicione suas primeiras transações para receber dicas \
                          personalizadas sobre suas finanças."
                .to_string(),
            recommendation: Some("Comece registrando sua renda e seus gastos de hoje.".to_string()),
            category: InsightCategory::General,
        }
    }

    /// Diagnostic insight for a null or blank model response
    pub fn empty_response() -> Self {
        Self {
            title: "Resposta vazia".to_string(),
            description: "O assistente não retornou nenhum conteúdo. Tente novamente em instantes."
                .to_string(),
            recommendation: None,
            category: InsightCategory::General,
        }
    }

    /// Diagnostic insight for a response that could not be decoded
    ///
    /// Embeds a truncated prefix of the raw text so the failure stays
    /// visible to the user and debuggable, never silently empty.
    pub fn unparseable(raw: &str) -> Self {
        let prefix: String = raw.trim().chars().take(DIAGNOSTIC_PREFIX_CHARS).collect();
        Self {
            title: "Não consegui analisar a resposta".to_string(),
            description: prefix,
            recommendation: None,
            category: InsightCategory::General,
        }
    }
}
