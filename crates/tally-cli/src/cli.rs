//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track income and expenses in a plain CSV ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Personal finance ledger with reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger CSV path (overrides the configured path)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// Config file path
    ///
    /// Defaults to <data_local_dir>/tally/config/ledger.toml when present,
    /// otherwise built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print JSON instead of tables (list, summary, report)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List transactions, newest first
    List {
        /// Only this type: Income or Expense
        #[arg(long = "type")]
        kind: Option<String>,

        /// Only this category (exact match)
        #[arg(short, long)]
        category: Option<String>,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Maximum number of rows to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Record a transaction
    Add {
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type")]
        kind: String,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Amount (non-negative)
        #[arg(short, long, allow_negative_numbers = true)]
        amount: f64,

        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Remove a transaction by list position or fingerprint
    Remove {
        /// Zero-based position as shown by `tally list`
        #[arg(required_unless_present = "id")]
        position: Option<usize>,

        /// Fingerprint (or a unique prefix of at least 8 characters)
        #[arg(long, conflicts_with = "position")]
        id: Option<String>,
    },

    /// Show totals and the financial health score
    Summary,

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Export the ledger to a JSON snapshot
    Export {
        /// Output file (defaults to the configured export path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the ledger with a JSON snapshot
    Import {
        /// Snapshot file (defaults to the configured export path)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage ledger backups
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Income, expense and balance per month
    Monthly,

    /// Per-category totals for one transaction type
    Categories {
        /// Transaction type: income or expense
        #[arg(long = "type", default_value = "expense")]
        kind: String,
    },

    /// Total expense per category
    Expenses {
        /// Categories to include (repeatable, defaults to all expense categories)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },

    /// Activity over the days leading up to the latest transaction
    Trends {
        /// Window length in days (defaults to the configured value)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Savings rate and health score
    Health,
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// List backups of the ledger, newest first
    List,

    /// Delete old backups, keeping the most recent
    Prune {
        /// Number of backups to keep
        #[arg(short, long)]
        keep: usize,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
