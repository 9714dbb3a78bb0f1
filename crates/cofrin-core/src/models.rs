//! Domain models for Cofrin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transaction kind - determines the sign of the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry
///
/// Immutable once read. The amount is always non-negative; the kind carries
/// the sign. Dates are UTC timestamps stamped when the transaction is created
/// at the input boundary, so no downstream code ever parses date strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque identifier assigned by the backing store
    pub id: String,
    pub kind: TransactionKind,
    /// Non-negative; sign implied by kind
    pub amount: f64,
    pub category: Category,
    pub description: String,
    pub date: DateTime<Utc>,
    /// The user this transaction belongs to
    pub owner_id: String,
}

/// A spending/income category
///
/// Equality and hashing are identity-based on `id` only - two categories with
/// the same id but different display names compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// User-defined category vs. built-in
    pub custom: bool,
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl std::hash::Hash for Category {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Built-in category ids
pub const FOOD: &str = "FOOD";
pub const BILLS: &str = "BILLS";
pub const ENTERTAINMENT: &str = "ENTERTAINMENT";
pub const TRANSPORT: &str = "TRANSPORT";
pub const SHOPPING: &str = "SHOPPING";
pub const SALARY: &str = "SALARY";
pub const OTHER: &str = "OTHER";

impl Category {
    fn built(id: &str, name: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            custom: false,
        }
    }

    pub fn food() -> Self {
        Self::built(FOOD, "Alimentação", "restaurant")
    }

    pub fn bills() -> Self {
        Self::built(BILLS, "Contas", "receipt_long")
    }

    pub fn entertainment() -> Self {
        Self::built(ENTERTAINMENT, "Entretenimento", "movie")
    }

    pub fn transport() -> Self {
        Self::built(TRANSPORT, "Transporte", "directions_bus")
    }

    pub fn shopping() -> Self {
        Self::built(SHOPPING, "Compras", "shopping_bag")
    }

    pub fn salary() -> Self {
        Self::built(SALARY, "Salário", "payments")
    }

    pub fn other() -> Self {
        Self::built(OTHER, "Outros", "category")
    }

    /// The fixed system-wide set of built-in categories
    pub fn all_builtin() -> Vec<Category> {
        vec![
            Self::food(),
            Self::bills(),
            Self::entertainment(),
            Self::transport(),
            Self::shopping(),
            Self::salary(),
            Self::other(),
        ]
    }

    /// Resolve a category reference by id, falling back to OTHER
    ///
    /// Every transaction belongs to exactly one category; an unresolvable
    /// reference degrades to OTHER instead of failing the read.
    pub fn builtin(id: &str) -> Category {
        Self::all_builtin()
            .into_iter()
            .find(|c| c.id == id)
            .unwrap_or_else(Self::other)
    }
}

/// A monthly spending limit for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub owner_id: String,
    pub category: Category,
    /// Monthly limit amount
    pub limit: f64,
    /// 1-12
    pub month: u32,
    pub year: i32,
    /// Running spent amount for the period
    pub spent: f64,
}

impl Budget {
    /// Amount left before the limit is reached (may be negative)
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    /// Fraction of the limit consumed, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        (self.spent / self.limit).clamp(0.0, 1.0)
    }

    /// Warning text if adding `amount` would exceed the limit
    ///
    /// Exceeding a budget is never an error - the transaction proceeds and
    /// the caller surfaces this text alongside it.
    pub fn warning_for(&self, amount: f64) -> Option<String> {
        if self.spent + amount > self.limit {
            Some(format!(
                "Este gasto ultrapassa o orçamento de {} para {:02}/{}",
                self.category.name, self.month, self.year
            ))
        } else {
            None
        }
    }
}

/// A savings target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub owner_id: String,
    pub name: String,
    pub target: f64,
    pub current: f64,
}

impl SavingsGoal {
    /// Amount still missing to reach the target (never negative)
    pub fn remaining(&self) -> f64 {
        (self.target - self.current).max(0.0)
    }

    /// Fraction of the target reached, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expense(amount: f64, category: Category) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            kind: TransactionKind::Expense,
            amount,
            category,
            description: "test".to_string(),
            date: Utc.with_ymd_and_hms(2026, 7, 10, 12, 0, 0).unwrap(),
            owner_id: "u1".to_string(),
        }
    }

    #[test]
    fn test_kind_round_trip() {
        use std::str::FromStr;
        assert_eq!(TransactionKind::from_str("income").unwrap(), TransactionKind::Income);
        assert_eq!(TransactionKind::from_str("EXPENSE").unwrap(), TransactionKind::Expense);
        assert!(TransactionKind::from_str("transfer").is_err());
        assert_eq!(TransactionKind::Expense.to_string(), "expense");
    }

    #[test]
    fn test_category_identity_equality() {
        let mut renamed = Category::food();
        renamed.name = "Restaurantes".to_string();
        assert_eq!(renamed, Category::food());

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Category::food());
        assert!(set.contains(&renamed));
    }

    #[test]
    fn test_category_builtin_fallback() {
        assert_eq!(Category::builtin(TRANSPORT).name, "Transporte");
        assert_eq!(Category::builtin("NOPE"), Category::other());
    }

    #[test]
    fn test_budget_derived_fields() {
        let budget = Budget {
            owner_id: "u1".to_string(),
            category: Category::food(),
            limit: 500.0,
            month: 7,
            year: 2026,
            spent: 350.0,
        };
        assert_eq!(budget.remaining(), 150.0);
        assert_eq!(budget.progress(), 0.7);
    }

    #[test]
    fn test_budget_progress_clamps() {
        let budget = Budget {
            owner_id: "u1".to_string(),
            category: Category::food(),
            limit: 100.0,
            month: 7,
            year: 2026,
            spent: 250.0,
        };
        assert_eq!(budget.progress(), 1.0);
        assert_eq!(budget.remaining(), -150.0);

        let zero_limit = Budget { limit: 0.0, ..budget };
        assert_eq!(zero_limit.progress(), 0.0);
    }

    #[test]
    fn test_budget_warning_boundary() {
        let budget = Budget {
            owner_id: "u1".to_string(),
            category: Category::shopping(),
            limit: 200.0,
            month: 7,
            year: 2026,
            spent: 150.0,
        };
        // Exactly at the limit is still within budget
        assert!(budget.warning_for(50.0).is_none());
        let warning = budget.warning_for(50.01).unwrap();
        assert!(warning.contains("Compras"));
        assert!(warning.contains("07/2026"));
    }

    #[test]
    fn test_savings_goal_progress() {
        let goal = SavingsGoal {
            owner_id: "u1".to_string(),
            name: "Viagem".to_string(),
            target: 2000.0,
            current: 500.0,
        };
        assert_eq!(goal.progress(), 0.25);
        assert_eq!(goal.remaining(), 1500.0);

        let done = SavingsGoal { current: 2500.0, ..goal };
        assert_eq!(done.progress(), 1.0);
        assert_eq!(done.remaining(), 0.0);
    }

    #[test]
    fn test_expense_helper_category() {
        let tx = expense(42.0, Category::builtin("UNKNOWN_ID"));
        assert_eq!(tx.category, Category::other());
    }
}
