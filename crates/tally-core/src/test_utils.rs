//! Test utilities: ledger fixtures shared by core and CLI tests
//!
//! Enabled for this crate's own tests and, through the `test-utils`
//! feature, for downstream crates.

use chrono::NaiveDate;

use crate::models::{Transaction, TransactionType};

/// Shorthand for a calendar date
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn income(d: NaiveDate, category: &str, amount: f64) -> Transaction {
    Transaction::new(d, TransactionType::Income, category, amount, "")
}

pub fn expense(d: NaiveDate, category: &str, amount: f64) -> Transaction {
    Transaction::new(d, TransactionType::Expense, category, amount, "")
}

/// A small, already-validated ledger (newest first) spanning two months
pub fn sample_ledger() -> Vec<Transaction> {
    vec![
        Transaction::new(date(2024, 2, 10), TransactionType::Expense, "Food", 45.25, "groceries"),
        Transaction::new(date(2024, 2, 1), TransactionType::Income, "Salary", 1000.0, "february"),
        Transaction::new(date(2024, 1, 20), TransactionType::Expense, "Transport", 50.0, "bus pass"),
        Transaction::new(date(2024, 1, 10), TransactionType::Expense, "Food", 300.0, ""),
        Transaction::new(date(2024, 1, 5), TransactionType::Income, "Salary", 1000.0, "january"),
    ]
}
