//! Financial aggregator
//!
//! Pure reduction of a transaction snapshot into the totals and rankings the
//! prompt builder renders. Aggregates are recomputed from scratch on every
//! request - O(n) per call, consistent by construction.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Category, Transaction, TransactionKind};

/// How many expense categories the ranking keeps
pub const TOP_CATEGORIES: usize = 5;

/// How many recent months the monthly ranking keeps
pub const RECENT_MONTHS: usize = 3;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl From<DateTime<Utc>> for YearMonth {
    fn from(date: DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Derived totals and rankings for one transaction snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// total_income - total_expenses
    pub balance: f64,
    /// Top expense categories, descending by amount, at most [`TOP_CATEGORIES`]
    pub category_expenses: Vec<(Category, f64)>,
    /// Most recent expense months, newest first, at most [`RECENT_MONTHS`]
    pub monthly_expenses: Vec<(YearMonth, f64)>,
}

/// Reduce a transaction list into a [`FinancialSummary`]
///
/// Ties in the category ranking keep first-encountered order (stable sort).
/// Empty input yields zero totals and empty rankings.
pub fn summarize(transactions: &[Transaction]) -> FinancialSummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;

    // Insertion order doubles as the tie-break for the ranking
    let mut category_order: Vec<Category> = Vec::new();
    let mut category_totals: HashMap<Category, f64> = HashMap::new();
    let mut monthly_totals: HashMap<YearMonth, f64> = HashMap::new();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => total_income += tx.amount,
            TransactionKind::Expense => {
                let value = tx.amount.abs();
                total_expenses += value;

                if !category_totals.contains_key(&tx.category) {
                    category_order.push(tx.category.clone());
                }
                *category_totals.entry(tx.category.clone()).or_insert(0.0) += value;
                *monthly_totals.entry(YearMonth::from(tx.date)).or_insert(0.0) += value;
            }
        }
    }

    let mut category_expenses: Vec<(Category, f64)> = category_order
        .into_iter()
        .map(|category| {
            let total = category_totals[&category];
            (category, total)
        })
        .collect();
    category_expenses.sort_by(|a, b| b.1.total_cmp(&a.1));
    category_expenses.truncate(TOP_CATEGORIES);

    let mut monthly_expenses: Vec<(YearMonth, f64)> = monthly_totals.into_iter().collect();
    monthly_expenses.sort_by(|a, b| b.0.cmp(&a.0));
    monthly_expenses.truncate(RECENT_MONTHS);

    FinancialSummary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        category_expenses,
        monthly_expenses,
    }
}
