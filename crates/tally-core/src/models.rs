//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Column names of the ledger file, in order
pub const LEDGER_COLUMNS: [&str; 5] = ["Date", "Type", "Category", "Amount", "Note"];

/// Category assigned to rows that arrive without one
pub const DEFAULT_CATEGORY: &str = "Other";

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Exact-match coercion used on stored rows: anything that is not
    /// literally "Income" or "Expense" becomes an expense.
    pub fn coerce(s: &str) -> Self {
        match s {
            "Income" => Self::Income,
            _ => Self::Expense,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {} (valid: income, expense)", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry
///
/// Serializes with the ledger file's column names (`tally list --json`).
/// Rows come in through `RawRow` on load and `SnapshotRecord` on import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Type")]
    pub kind: TransactionType,

    #[serde(rename = "Category")]
    pub category: String,

    /// Always non-negative; the direction lives in `kind`
    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Note")]
    pub note: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
        amount: f64,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            note: note.into(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Content hash over the five stored fields
    ///
    /// Unlike a position in the ledger, the fingerprint survives reloads and
    /// re-sorting. Identical rows share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.date.to_string().as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.category.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.amount.to_be_bytes());
        hasher.update([0x1f]);
        hasher.update(self.note.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A raw row as read from storage, before validation
///
/// Each field is `None` when the cell was missing or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub date: Option<String>,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
}

// ========== Report Models ==========

/// Headline figures across the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

/// Income and expense for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Month key formatted as YYYY-MM
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Per-category statistics for one transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total: f64,
    pub mean: f64,
    pub count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Share of the type's total, rounded to 2 decimal places
    pub percentage: f64,
}

/// A category and its summed amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Activity within a trailing window ending at the latest transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub days: u32,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub avg_daily_income: f64,
    pub avg_daily_expense: f64,
    pub net_flow: f64,
    pub top_expense_categories: Vec<CategoryTotal>,
    pub transaction_count: usize,
}

/// Coarse savings-rate heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// One of 0, 20, 60, 80, 100
    pub score: u8,
    /// None when there is no income to measure against
    pub savings_rate: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            TransactionType::Expense,
            "Food",
            12.5,
            "lunch",
        )
    }

    #[test]
    fn test_transaction_type_coerce() {
        assert_eq!(TransactionType::coerce("Income"), TransactionType::Income);
        assert_eq!(TransactionType::coerce("Expense"), TransactionType::Expense);
        assert_eq!(TransactionType::coerce("Transfer"), TransactionType::Expense);
        // Coercion is exact-match; only the CLI parser is case-insensitive
        assert_eq!(TransactionType::coerce("income"), TransactionType::Expense);
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("EXPENSE".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_fields() {
        let a = sample();
        let mut b = sample();
        b.note = "dinner".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());

        let mut c = sample();
        c.amount = 12.51;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["Date"], "2024-01-05");
        assert_eq!(json["Type"], "Expense");
        assert_eq!(json["Category"], "Food");
        assert_eq!(json["Amount"], 12.5);
        assert_eq!(json["Note"], "lunch");
    }
}
