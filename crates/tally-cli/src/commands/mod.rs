//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `backup` - Backup management commands (list, prune)
//! - `core` - Shared utilities (config resolution, opening the ledger, argument parsing)
//! - `import` - Snapshot export/import commands
//! - `reports` - Summary and report commands
//! - `transactions` - Transaction commands (list, add, remove)

pub mod backup;
pub mod core;
pub mod import;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use backup::*;
pub use core::*;
pub use import::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Colored amount: green with a plus sign for income, red for expenses
pub fn format_amount(tx: &tally_core::Transaction) -> String {
    if tx.is_income() {
        format!("\x1b[32m+${:.2}\x1b[0m", tx.amount)
    } else {
        format!("\x1b[31m-${:.2}\x1b[0m", tx.amount)
    }
}
