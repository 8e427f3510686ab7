//! Backup system with pluggable destinations
//!
//! Every save of a ledger file first hands the previous file to a
//! `BackupDestination`. The destination is injected into the store, so tests
//! can swap the filesystem for an in-memory recorder.
//!
//! # Architecture
//!
//! - `BackupDestination` trait defines the interface for storage backends
//! - `LocalDestination` stores backups next to the ledger file
//! - `MemoryDestination` keeps backups in memory (tests, dry runs)
//!
//! # Backup Format
//!
//! Backups are verbatim copies of the ledger CSV.
//!
//! File naming: `<stem>_backup_YYYYMMDD_HHMMSS.<ext>`, with a `_N` suffix
//! when two backups land in the same second.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

mod local;
mod memory;

pub use local::LocalDestination;
pub use memory::MemoryDestination;

/// Marker between the ledger stem and the timestamp
const BACKUP_MARKER: &str = "_backup_";

/// Timestamp layout inside backup names
const BACKUP_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Information about a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub name: String,
    /// Full path (or a pseudo path for non-filesystem destinations)
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// When the backup was taken, local time
    pub created_at: NaiveDateTime,
}

/// Result of a prune operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneResult {
    /// Number of backups deleted
    pub deleted_count: usize,
    /// Names of deleted backups
    pub deleted_names: Vec<String>,
    /// Number of backups retained
    pub retained_count: usize,
    /// Total bytes freed
    pub bytes_freed: u64,
}

/// Backup retention policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Number of most recent backups to keep
    pub keep: usize,
}

impl RetentionPolicy {
    /// Create a simple policy keeping last N backups
    pub fn keep_last(n: usize) -> Self {
        Self { keep: n }
    }
}

/// Trait for backup storage destinations
pub trait BackupDestination: Send + Sync {
    /// Human-readable name for this destination
    fn name(&self) -> &str;

    /// Store a copy of `source` under `backup_name`
    ///
    /// Returns the name actually used, which differs from `backup_name`
    /// when a backup of that name already exists.
    fn store(&self, source: &Path, backup_name: &str) -> Result<String>;

    /// List all backups in this destination, newest first
    fn list(&self) -> Result<Vec<BackupInfo>>;

    /// Delete a backup
    fn delete(&self, backup_name: &str) -> Result<()>;

    /// Apply retention policy and delete old backups
    fn prune(&self, policy: &RetentionPolicy) -> Result<PruneResult> {
        let mut backups = self.list()?;
        sort_newest_first(&mut backups);

        let mut deleted_names = Vec::new();
        let mut bytes_freed = 0u64;

        for backup in backups.iter().skip(policy.keep) {
            if let Err(e) = self.delete(&backup.name) {
                tracing::warn!("Failed to delete backup {}: {}", backup.name, e);
                continue;
            }
            bytes_freed += backup.size;
            deleted_names.push(backup.name.clone());
        }

        let retained_count = backups.len().saturating_sub(deleted_names.len());

        Ok(PruneResult {
            deleted_count: deleted_names.len(),
            deleted_names,
            retained_count,
            bytes_freed,
        })
    }
}

/// Generate the backup filename for a ledger at a given time
///
/// `data/transactions.csv` at 2024-01-15 14:30:22 becomes
/// `transactions_backup_20240115_143022.csv`.
pub fn backup_name(ledger_path: &Path, at: NaiveDateTime) -> String {
    let mut name = backup_prefix(ledger_path);
    name.push_str(&at.format(BACKUP_TIME_FORMAT).to_string());
    if let Some(ext) = ledger_path.extension().and_then(|e| e.to_str()) {
        name.push('.');
        name.push_str(ext);
    }
    name
}

/// The `<stem>_backup_` prefix shared by all backups of a ledger
pub fn backup_prefix(ledger_path: &Path) -> String {
    let stem = ledger_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ledger");
    format!("{}{}", stem, BACKUP_MARKER)
}

/// Parse backup creation time from filename
pub fn parse_backup_time(name: &str) -> Option<NaiveDateTime> {
    // Expected format: <stem>_backup_YYYYMMDD_HHMMSS[_N][.ext]
    let start = name.rfind(BACKUP_MARKER)? + BACKUP_MARKER.len();
    let stamp = name.get(start..start + 15)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()
}

/// Insert a `_N` collision suffix before the extension
pub(crate) fn with_collision_suffix(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((base, ext)) => format!("{}_{}.{}", base, n, ext),
        None => format!("{}_{}", name, n),
    }
}

/// Newest first; same-second collisions order by their suffix
pub(crate) fn sort_newest_first(backups: &mut [BackupInfo]) {
    backups.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.name.len().cmp(&a.name.len()))
            .then_with(|| b.name.cmp(&a.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_backup_name() {
        let name = backup_name(Path::new("data/transactions.csv"), at(14, 30, 22));
        assert_eq!(name, "transactions_backup_20240115_143022.csv");
    }

    #[test]
    fn test_backup_name_without_extension() {
        let name = backup_name(Path::new("ledger"), at(9, 5, 0));
        assert_eq!(name, "ledger_backup_20240115_090500");
    }

    #[test]
    fn test_parse_backup_time() {
        let time = parse_backup_time("transactions_backup_20240115_143022.csv").unwrap();
        assert_eq!(
            time.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-15 14:30:22"
        );
    }

    #[test]
    fn test_parse_backup_time_with_suffix() {
        let time = parse_backup_time("transactions_backup_20240115_143022_2.csv").unwrap();
        assert_eq!(time, at(14, 30, 22));
    }

    #[test]
    fn test_parse_backup_time_invalid() {
        assert!(parse_backup_time("transactions.csv").is_none());
        assert!(parse_backup_time("transactions_backup_baddate.csv").is_none());
    }

    #[test]
    fn test_collision_suffix() {
        assert_eq!(
            with_collision_suffix("t_backup_20240115_143022.csv", 2),
            "t_backup_20240115_143022_2.csv"
        );
        assert_eq!(with_collision_suffix("t_backup_x", 3), "t_backup_x_3");
    }

    #[test]
    fn test_sort_newest_first() {
        let info = |name: &str, time: NaiveDateTime| BackupInfo {
            name: name.to_string(),
            path: name.to_string(),
            size: 0,
            created_at: time,
        };
        let mut backups = vec![
            info("t_backup_20240115_100000.csv", at(10, 0, 0)),
            info("t_backup_20240115_120000.csv", at(12, 0, 0)),
            info("t_backup_20240115_120000_2.csv", at(12, 0, 0)),
        ];
        sort_newest_first(&mut backups);
        let names: Vec<&str> = backups.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "t_backup_20240115_120000_2.csv",
                "t_backup_20240115_120000.csv",
                "t_backup_20240115_100000.csv"
            ]
        );
    }
}
