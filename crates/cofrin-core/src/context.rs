//! Financial context assembly
//!
//! Given the current transaction and budget snapshots, assembles everything
//! the chat prompt needs about the user's situation. Built fresh on every
//! turn and never persisted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{Budget, Category, Transaction};
use crate::prompts::format_brl;
use crate::summary::summarize;

/// How many expense categories the chat context carries
pub const CONTEXT_TOP_CATEGORIES: usize = 3;

/// Snapshot of a user's finances for one chat turn
#[derive(Debug, Clone)]
pub struct UserFinancialContext {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub total_income: f64,
    pub total_expenses: f64,
    /// Sum of all budget limits for the period
    pub monthly_budget: f64,
    /// Top expense categories, descending, at most [`CONTEXT_TOP_CATEGORIES`]
    pub top_categories: Vec<(Category, f64)>,
    pub today: DateTime<Utc>,
}

impl UserFinancialContext {
    /// Assemble a context from the current snapshots
    pub fn assemble(
        transactions: &[Transaction],
        budgets: &[Budget],
        today: DateTime<Utc>,
    ) -> Self {
        let summary = summarize(transactions);
        let mut top_categories = summary.category_expenses;
        top_categories.truncate(CONTEXT_TOP_CATEGORIES);

        Self {
            transactions: transactions.to_vec(),
            budgets: budgets.to_vec(),
            total_income: summary.total_income,
            total_expenses: summary.total_expenses,
            monthly_budget: budgets.iter().map(|b| b.limit).sum(),
            top_categories,
            today,
        }
    }

    /// Convert the context to template variables for prompt rendering
    pub fn to_template_vars(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();

        vars.insert("current_date", self.today.format("%d/%m/%Y").to_string());
        vars.insert("transaction_count", self.transactions.len().to_string());
        vars.insert("total_income", format_brl(self.total_income));
        vars.insert("total_expenses", format_brl(self.total_expenses));
        vars.insert("monthly_budget", format_brl(self.monthly_budget));

        if !self.top_categories.is_empty() {
            let lines = self
                .top_categories
                .iter()
                .map(|(category, amount)| format!("- {}: {}", category.name, format_brl(*amount)))
                .collect::<Vec<_>>()
                .join("\n");
            vars.insert("top_categories", lines);
        }

        vars
    }
}
