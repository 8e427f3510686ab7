//! Ledger configuration
//!
//! Resolution order:
//! 1. An explicit config file (`--config`), when it exists
//! 2. The user override at `<data_local_dir>/tally/config/ledger.toml`
//! 3. Defaults compiled in from `config/ledger.toml`
//!
//! Keys missing from a file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::analytics::DEFAULT_TREND_DAYS;
use crate::backup::RetentionPolicy;
use crate::error::Result;
use crate::export::DEFAULT_EXPORT_PATH;
use crate::store::LedgerStore;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/ledger.toml");

/// Default ledger file location
pub const DEFAULT_LEDGER_PATH: &str = "data/transactions.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// CSV ledger file
    pub ledger_path: PathBuf,
    /// Snapshot document used by export and import
    pub export_path: PathBuf,
    /// Trailing window for trend reports
    pub trend_days: u32,
    /// Backups to keep per ledger (`None` keeps all)
    pub backup_keep: Option<usize>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            trend_days: DEFAULT_TREND_DAYS,
            backup_keep: None,
        }
    }
}

impl LedgerConfig {
    /// Resolve configuration, preferring `explicit` when given
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if path.exists() {
                debug!("Loading config from {}", path.display());
                return Self::parse(&fs::read_to_string(path)?);
            }
            warn!("Config file {} not found, using defaults", path.display());
            return Self::parse(DEFAULT_CONFIG);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                debug!("Loading config override from {}", path.display());
                return Self::parse(&fs::read_to_string(&path)?);
            }
        }

        Self::parse(DEFAULT_CONFIG)
    }

    /// Parse TOML content on top of the defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(ledger) = raw.ledger {
            if let Some(path) = ledger.path {
                config.ledger_path = path;
            }
            if let Some(path) = ledger.export_path {
                config.export_path = path;
            }
        }

        if let Some(trend_days) = raw.reports.and_then(|r| r.trend_days) {
            config.trend_days = trend_days;
        }

        config.backup_keep = raw.backup.and_then(|b| b.keep);

        Ok(config)
    }

    pub fn retention(&self) -> Option<RetentionPolicy> {
        self.backup_keep.map(RetentionPolicy::keep_last)
    }

    /// A store for the configured ledger with local backups
    pub fn open_store(&self) -> LedgerStore {
        LedgerStore::new(&self.ledger_path).with_retention(self.retention())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("ledger.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ledger: Option<RawLedger>,
    reports: Option<RawReports>,
    backup: Option<RawBackup>,
}

#[derive(Debug, Deserialize)]
struct RawLedger {
    path: Option<PathBuf>,
    export_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawReports {
    trend_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawBackup {
    keep: Option<usize>,
}
