//! Prompt library and prompt builders
//!
//! Templates are embedded at compile time (YAML frontmatter + body) and
//! rendered with simple mustache-style substitution. The builder functions
//! turn aggregated financial data into the exact prompt strings sent to the
//! AI gateway - pure string templating, no I/O.
//!
//! The insight prompt carries a strict output contract (a JSON array of
//! exactly 3 objects) that [`crate::ai::parsing`] depends on; the two sides
//! must not drift apart.

use std::collections::HashMap;

use serde::Deserialize;

use crate::context::UserFinancialContext;
use crate::error::{Error, Result};
use crate::summary::FinancialSummary;

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const INSIGHTS: &str = include_str!("../../../prompts/insights.md");
    pub const CHAT: &str = include_str!("../../../prompts/chat.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Insight generation from a financial summary
    Insights,
    /// Conversational chat with financial context
    Chat,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insights => "insights",
            Self::Chat => "chat",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::Insights, Self::Chat]
    }

    /// Get the embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::Insights => defaults::INSIGHTS,
            Self::Chat => defaults::CHAT,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The template body
    pub content: String,
}

impl Prompt {
    /// Render the prompt with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut result = self.content.clone();

        // Simple mustache-style replacement: {{var}}
        for (key, value) in vars {
            let pattern = format!("{{{{{}}}}}", key);
            result = result.replace(&pattern, value);
        }

        // Also handle conditional blocks: {{#if var}}...{{/if}}
        remove_unmatched_conditionals(&result, vars)
    }
}

/// Prompt library for loading and caching embedded prompts
pub struct PromptLibrary {
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, parsing and caching it on first use
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let (metadata, content) = parse_prompt(id.default_content())?;
            self.cache.insert(id, Prompt { metadata, content });
        }
        Ok(self.cache.get(&id).expect("prompt cached above"))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Remove unmatched conditional blocks from the template
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    // Find all {{#if var}}...{{/if}} blocks (no nesting)
    loop {
        if let Some(if_start) = result.find("{{#if ") {
            let var_start = if_start + 6;
            if let Some(var_end) = result[var_start..].find("}}") {
                let var_name = &result[var_start..var_start + var_end];
                let block_start = var_start + var_end + 2;

                if let Some(endif_pos) = result[block_start..].find("{{/if}}") {
                    let block_content = &result[block_start..block_start + endif_pos];
                    let full_end = block_start + endif_pos + 7;

                    let should_include = vars.get(var_name).is_some_and(|v| !v.is_empty());

                    if should_include {
                        result = format!(
                            "{}{}{}",
                            &result[..if_start],
                            block_content,
                            &result[full_end..]
                        );
                    } else {
                        result = format!("{}{}", &result[..if_start], &result[full_end..]);
                    }
                    continue;
                }
            }
        }
        break;
    }

    result
}

/// Format a value as Brazilian currency: two decimals, comma separator
///
/// `1000.0` renders as `R$ 1000,00`. No thousands grouping - the exact
/// convention the prompts instruct the model with and the tests pin.
pub fn format_brl(value: f64) -> String {
    format!("R$ {:.2}", value).replace('.', ",")
}

/// Build the insight-generation prompt for a financial summary
///
/// Renders the Portuguese persona preamble, the summary as currency lines,
/// and the strict 3-object JSON output contract.
pub fn build_insight_prompt(summary: &FinancialSummary) -> Result<String> {
    let total_income = format_brl(summary.total_income);
    let total_expenses = format_brl(summary.total_expenses);
    let balance = format_brl(summary.balance);

    let category_lines = summary
        .category_expenses
        .iter()
        .map(|(category, amount)| format!("- {}: {}", category.name, format_brl(*amount)))
        .collect::<Vec<_>>()
        .join("\n");

    let monthly_lines = summary
        .monthly_expenses
        .iter()
        .map(|(month, amount)| format!("- {}: {}", month, format_brl(*amount)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("total_income", &total_income);
    vars.insert("total_expenses", &total_expenses);
    vars.insert("balance", &balance);
    if !category_lines.is_empty() {
        vars.insert("category_lines", &category_lines);
    }
    if !monthly_lines.is_empty() {
        vars.insert("monthly_lines", &monthly_lines);
    }

    let mut library = PromptLibrary::new();
    let template = library.get(PromptId::Insights)?;
    Ok(template.render(&vars))
}

/// Build the chat prompt for one conversational turn
///
/// The user's message is included literally. On follow-up turns
/// (`first_turn == false`) an explicit no-reintroduction instruction is
/// rendered before the question.
pub fn build_chat_prompt(
    message: &str,
    context: Option<&UserFinancialContext>,
    first_turn: bool,
) -> Result<String> {
    let context_vars = context.map(|c| c.to_template_vars()).unwrap_or_default();

    let mut vars: HashMap<&str, &str> = context_vars
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    vars.insert("message", message);
    if context.is_some() {
        vars.insert("has_context", "true");
    }
    if !first_turn {
        vars.insert("no_reintroduce", "true");
    }

    let mut library = PromptLibrary::new();
    let template = library.get(PromptId::Chat)?;
    Ok(template.render(&vars))
}
