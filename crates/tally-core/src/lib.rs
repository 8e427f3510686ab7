//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance ledger:
//! - Transaction model and record validation
//! - CSV ledger storage with backup-on-write
//! - Backup system with pluggable destinations
//! - Spending reports and analytics
//! - Ledger service for add/remove/replace
//! - JSON snapshot export and import
//! - Layered TOML configuration

pub mod analytics;
pub mod backup;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod service;
pub mod store;
pub mod validate;

/// Test utilities: shared ledger fixtures
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use backup::{
    BackupDestination, BackupInfo, LocalDestination, MemoryDestination, PruneResult,
    RetentionPolicy,
};
pub use config::LedgerConfig;
pub use error::{Error, Result};
pub use export::{export_snapshot, export_to_path, import_snapshot, SnapshotRecord};
pub use models::{
    CategoryStats, CategoryTotal, HealthScore, LedgerTotals, MonthlySummary, Transaction,
    TransactionType, TrendReport,
};
pub use service::LedgerService;
pub use store::{LedgerStore, SaveOutcome};
pub use validate::{ValidationReport, Validated};
