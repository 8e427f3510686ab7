//! Shared utilities for command implementations
//!
//! This module contains:
//! - `load_config` - Resolve configuration plus CLI overrides
//! - `open_service` - Open the configured ledger
//! - `parse_date_arg` / `parse_kind` - Validate user input

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::{LedgerConfig, LedgerService, TransactionType};
use tracing::debug;

/// Resolve configuration, letting `--ledger` override the configured path
pub fn load_config(config_path: Option<&Path>, ledger: Option<PathBuf>) -> Result<LedgerConfig> {
    let mut config = LedgerConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(path) = ledger {
        debug!("Ledger path overridden by --ledger: {}", path.display());
        config.ledger_path = path;
    }
    debug!(
        "Using ledger {} (export {}, trend window {} days, backups kept: {})",
        config.ledger_path.display(),
        config.export_path.display(),
        config.trend_days,
        config
            .backup_keep
            .map_or_else(|| "all".to_string(), |n| n.to_string())
    );
    Ok(config)
}

/// Open the configured ledger (created with a header if missing)
pub fn open_service(config: &LedgerConfig) -> LedgerService {
    let service = LedgerService::open(config.open_store());
    debug!(
        "Opened {} ({} transactions)",
        service.store().path().display(),
        service.ledger().len()
    );
    service
}

/// Parse a YYYY-MM-DD command-line date
pub fn parse_date_arg(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date: {} (use YYYY-MM-DD)", flag, value))
}

/// Parse a transaction type, case-insensitively
pub fn parse_kind(value: &str) -> Result<TransactionType> {
    TransactionType::from_str(value).map_err(|e| anyhow::anyhow!(e))
}
