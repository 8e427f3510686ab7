//! Durable CSV storage for the ledger
//!
//! `load` never fails: a missing or empty file is initialized with the header,
//! a file with the wrong columns is reset (after being backed up), and any
//! other read failure yields an empty in-memory ledger.
//!
//! `save` copies the previous file to the backup destination, then replaces
//! the ledger file in full. A failed backup is logged and the save proceeds.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::backup::{backup_name, BackupDestination, LocalDestination, RetentionPolicy};
use crate::error::Result;
use crate::models::{RawRow, Transaction, LEDGER_COLUMNS};
use crate::validate::{validate, Validated};

/// What a save did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Number of transactions written
    pub rows: usize,
    /// Name of the backup taken of the previous file, if any
    pub backup: Option<String>,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// A ledger file plus the destination its backups go to
pub struct LedgerStore {
    path: PathBuf,
    backups: Box<dyn BackupDestination>,
    retention: Option<RetentionPolicy>,
    clock: fn() -> NaiveDateTime,
}

impl LedgerStore {
    /// Store backed by `path`, with backups kept next to it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backups = Box::new(LocalDestination::for_ledger(&path));
        Self::with_destination(path, backups)
    }

    /// Store with an explicit backup destination
    pub fn with_destination(path: impl Into<PathBuf>, backups: Box<dyn BackupDestination>) -> Self {
        Self {
            path: path.into(),
            backups,
            retention: None,
            clock: local_now,
        }
    }

    /// Prune old backups after each save (`None` keeps every backup)
    pub fn with_retention(mut self, retention: Option<RetentionPolicy>) -> Self {
        self.retention = retention;
        self
    }

    /// Override the clock used for backup timestamps
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn destination(&self) -> &dyn BackupDestination {
        self.backups.as_ref()
    }

    /// Load and validate the ledger
    pub fn load(&self) -> Vec<Transaction> {
        if let Err(e) = self.ensure_dir() {
            error!("Failed to create ledger directory for {}: {}", self.path.display(), e);
            return Vec::new();
        }

        let needs_init = match fs::metadata(&self.path) {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                error!("Failed to stat ledger {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        if needs_init {
            match self.write_ledger(&[]) {
                Ok(()) => info!("Initialized empty ledger at {}", self.path.display()),
                Err(e) => error!("Failed to initialize ledger {}: {}", self.path.display(), e),
            }
            return Vec::new();
        }

        match self.read_ledger() {
            Ok(Validated::Ledger {
                transactions,
                report,
            }) => {
                debug!(
                    "Loaded {} transactions from {} ({} rows read)",
                    transactions.len(),
                    self.path.display(),
                    report.total_rows
                );
                transactions
            }
            Ok(Validated::SchemaMismatch { found }) => {
                warn!(
                    "Ledger {} has columns {:?}, expected {:?}; resetting to an empty ledger",
                    self.path.display(),
                    found,
                    LEDGER_COLUMNS
                );
                if let Err(e) = self.save(&[]) {
                    error!("Failed to reset ledger {}: {}", self.path.display(), e);
                }
                Vec::new()
            }
            Err(e) => {
                error!("Failed to read ledger {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Back up the current file, then replace it with `ledger`
    pub fn save(&self, ledger: &[Transaction]) -> Result<SaveOutcome> {
        self.ensure_dir()?;

        let backup = if self.path.exists() {
            self.backup_existing()
        } else {
            None
        };

        self.write_ledger(ledger)?;
        info!("Saved {} transactions to {}", ledger.len(), self.path.display());

        Ok(SaveOutcome {
            rows: ledger.len(),
            backup,
        })
    }

    fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created ledger directory: {}", parent.display());
            }
        }
        Ok(())
    }

    fn backup_existing(&self) -> Option<String> {
        let name = backup_name(&self.path, (self.clock)());

        let stored = match self.backups.store(&self.path, &name) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    "Backup of {} to {} destination failed, saving anyway: {}",
                    self.path.display(),
                    self.backups.name(),
                    e
                );
                return None;
            }
        };

        if let Some(policy) = self.retention {
            match self.backups.prune(&policy) {
                Ok(result) if result.deleted_count > 0 => {
                    info!(
                        "Pruned {} old backup(s), {} retained",
                        result.deleted_count, result.retained_count
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to prune backups: {}", e),
            }
        }

        Some(stored)
    }

    fn read_ledger(&self) -> Result<Validated> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let cell = |i: usize| record.get(i).filter(|s| !s.is_empty()).map(str::to_string);
            rows.push(RawRow {
                date: cell(0),
                kind: cell(1),
                category: cell(2),
                amount: cell(3),
                note: cell(4),
            });
        }

        Ok(validate(&headers, rows))
    }

    /// Write the full ledger through a temp file in the same directory
    fn write_ledger(&self, ledger: &[Transaction]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;

        {
            let mut wtr = WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            wtr.write_record(LEDGER_COLUMNS)?;
            for tx in ledger {
                wtr.write_record([
                    tx.date.format("%Y-%m-%d").to_string(),
                    tx.kind.as_str().to_string(),
                    tx.category.clone(),
                    tx.amount.to_string(),
                    tx.note.clone(),
                ])?;
            }
            wtr.flush()?;
        }

        tmp.persist(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::MemoryDestination;
    use crate::models::TransactionType;
    use crate::test_utils::{date, sample_ledger};
    use chrono::Duration;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    const HEADER: &str = "Date,Type,Category,Amount,Note\n";

    /// Shares one MemoryDestination between the store and the test
    struct SharedDestination(Arc<MemoryDestination>);

    impl BackupDestination for SharedDestination {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn store(&self, source: &Path, backup_name: &str) -> Result<String> {
            self.0.store(source, backup_name)
        }
        fn list(&self) -> Result<Vec<crate::backup::BackupInfo>> {
            self.0.list()
        }
        fn delete(&self, backup_name: &str) -> Result<()> {
            self.0.delete(backup_name)
        }
    }

    fn fixed_clock() -> NaiveDateTime {
        date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap()
    }

    fn setup_store() -> (TempDir, Arc<MemoryDestination>, LedgerStore) {
        let dir = TempDir::new().unwrap();
        let backups = Arc::new(MemoryDestination::new());
        let store = LedgerStore::with_destination(
            dir.path().join("data").join("transactions.csv"),
            Box::new(SharedDestination(backups.clone())),
        )
        .with_clock(fixed_clock);
        (dir, backups, store)
    }

    #[test]
    fn test_load_nonexistent_creates_empty_ledger() {
        let (_dir, backups, store) = setup_store();
        assert!(!store.path().exists());

        let ledger = store.load();
        assert!(ledger.is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), HEADER);

        // Second load sees the same well-formed empty ledger
        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), HEADER);
        assert_eq!(backups.count(), 0);
    }

    #[test]
    fn test_load_zero_length_file_is_initialized() {
        let (_dir, _backups, store) = setup_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), b"").unwrap();

        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), HEADER);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (_dir, _backups, store) = setup_store();
        let ledger = sample_ledger();

        store.save(&ledger).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, ledger);

        // Saving what was loaded changes nothing
        store.save(&loaded).unwrap();
        assert_eq!(store.load(), loaded);
    }

    #[test]
    fn test_load_normalizes_rows() {
        let (_dir, _backups, store) = setup_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            "Date,Type,Category,Amount,Note\n\
             2024-01-05,Expense,Food,-5,refund?\n\
             2024-01-06,Transfer,Bank,40,\n\
             garbage,Income,Salary,10,\n\
             2024-01-07 09:30:00,Income,,100,bonus\n",
        )
        .unwrap();

        let ledger = store.load();
        assert_eq!(ledger.len(), 2);

        assert_eq!(ledger[0].date, date(2024, 1, 7));
        assert_eq!(ledger[0].kind, TransactionType::Income);
        assert_eq!(ledger[0].category, "Other");
        assert_eq!(ledger[0].note, "bonus");

        assert_eq!(ledger[1].kind, TransactionType::Expense);
        assert_eq!(ledger[1].category, "Bank");
        assert!(ledger.iter().all(|t| t.amount >= 0.0));
    }

    #[test]
    fn test_load_short_rows_use_defaults() {
        let (_dir, _backups, store) = setup_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "Date,Type,Category,Amount,Note\n2024-01-05,Income,Salary,10\n")
            .unwrap();

        let ledger = store.load();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].note, "");
    }

    #[test]
    fn test_schema_mismatch_resets_and_keeps_backup() {
        let (_dir, backups, store) = setup_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let original = "date,amount\n2024-01-05,10\n";
        fs::write(store.path(), original).unwrap();

        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), HEADER);

        let names = backups.stored_names();
        assert_eq!(names, vec!["transactions_backup_20240115_120000.csv".to_string()]);
        assert_eq!(backups.contents(&names[0]).unwrap(), original.as_bytes());
    }

    #[test]
    fn test_load_read_failure_returns_empty() {
        let (_dir, _backups, store) = setup_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let mut bytes = b"Date,Type,Category,Amount,Note\n2024-01-05,Income,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b",10,\n");
        fs::write(store.path(), &bytes).unwrap();

        assert!(store.load().is_empty());
        // The unreadable file is left alone
        assert_eq!(fs::read(store.path()).unwrap(), bytes);
    }

    #[test]
    fn test_load_directory_path_returns_empty() {
        let (_dir, _backups, store) = setup_store();
        fs::create_dir_all(store.path()).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_backs_up_previous_file() {
        let (_dir, backups, store) = setup_store();

        let first = store.save(&sample_ledger()).unwrap();
        assert_eq!(first.backup, None);
        assert_eq!(backups.count(), 0);

        let previous = fs::read(store.path()).unwrap();
        let second = store.save(&[]).unwrap();
        assert_eq!(
            second.backup.as_deref(),
            Some("transactions_backup_20240115_120000.csv")
        );
        assert_eq!(backups.contents("transactions_backup_20240115_120000.csv").unwrap(), previous);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), HEADER);
    }

    #[test]
    fn test_backup_failure_does_not_abort_save() {
        let dir = TempDir::new().unwrap();
        let store = LedgerStore::with_destination(
            dir.path().join("transactions.csv"),
            Box::new(MemoryDestination::failing()),
        );

        store.save(&sample_ledger()).unwrap();
        let outcome = store.save(&sample_ledger()[..1]).unwrap();
        assert_eq!(outcome.backup, None);
        assert_eq!(store.load().len(), 1);
    }

    static TICKS: AtomicI64 = AtomicI64::new(0);

    fn ticking_clock() -> NaiveDateTime {
        fixed_clock() + Duration::seconds(TICKS.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn test_retention_prunes_backups() {
        let (_dir, backups, store) = setup_store();
        let store = store
            .with_clock(ticking_clock)
            .with_retention(Some(RetentionPolicy::keep_last(1)));

        for _ in 0..4 {
            store.save(&sample_ledger()).unwrap();
        }

        assert_eq!(
            backups.stored_names(),
            vec!["transactions_backup_20240115_120002.csv".to_string()]
        );
    }

    #[test]
    fn test_unbounded_backups_by_default() {
        let (_dir, backups, store) = setup_store();
        for _ in 0..4 {
            store.save(&sample_ledger()).unwrap();
        }
        assert_eq!(backups.count(), 3);
    }

    #[test]
    fn test_local_destination_writes_alongside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        let store = LedgerStore::new(&path).with_clock(fixed_clock);

        store.save(&sample_ledger()).unwrap();
        store.save(&sample_ledger()).unwrap();

        assert!(dir
            .path()
            .join("transactions_backup_20240115_120000.csv")
            .exists());
        assert_eq!(store.destination().list().unwrap().len(), 1);
    }
}
