//! In-memory backup destination

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{parse_backup_time, sort_newest_first, with_collision_suffix, BackupDestination, BackupInfo};
use crate::error::{Error, Result};

struct StoredBackup {
    info: BackupInfo,
    contents: Vec<u8>,
}

/// Records backups in memory instead of writing them to disk
///
/// Used by tests to observe backup-on-write, and by front ends that want a
/// save without a backup trail.
#[derive(Default)]
pub struct MemoryDestination {
    backups: Mutex<Vec<StoredBackup>>,
    /// When set, every `store` fails (to exercise failure handling)
    fail_stores: bool,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// A destination whose `store` always fails
    pub fn failing() -> Self {
        Self {
            backups: Mutex::new(Vec::new()),
            fail_stores: true,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredBackup>>> {
        self.backups
            .lock()
            .map_err(|_| Error::Backup("Backup registry poisoned".to_string()))
    }

    /// Names of stored backups, oldest first
    pub fn stored_names(&self) -> Vec<String> {
        self.lock()
            .map(|backups| backups.iter().map(|b| b.info.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of stored backups
    pub fn count(&self) -> usize {
        self.lock().map(|backups| backups.len()).unwrap_or(0)
    }

    /// Contents of a stored backup
    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().ok().and_then(|backups| {
            backups
                .iter()
                .find(|b| b.info.name == name)
                .map(|b| b.contents.clone())
        })
    }
}

impl BackupDestination for MemoryDestination {
    fn name(&self) -> &str {
        "memory"
    }

    fn store(&self, source: &Path, backup_name: &str) -> Result<String> {
        if self.fail_stores {
            return Err(Error::Backup(format!(
                "Refusing to store {} (failing destination)",
                backup_name
            )));
        }

        let contents = fs::read(source)?;
        let created_at = parse_backup_time(backup_name).ok_or_else(|| {
            Error::Backup(format!("Backup name has no timestamp: {}", backup_name))
        })?;

        let mut backups = self.lock()?;

        let mut name = backup_name.to_string();
        let mut n = 2;
        while backups.iter().any(|b| b.info.name == name) {
            name = with_collision_suffix(backup_name, n);
            n += 1;
        }

        backups.push(StoredBackup {
            info: BackupInfo {
                name: name.clone(),
                path: format!("memory://{}", name),
                size: contents.len() as u64,
                created_at,
            },
            contents,
        });

        Ok(name)
    }

    fn list(&self) -> Result<Vec<BackupInfo>> {
        let mut infos: Vec<BackupInfo> = self.lock()?.iter().map(|b| b.info.clone()).collect();
        sort_newest_first(&mut infos);
        Ok(infos)
    }

    fn delete(&self, backup_name: &str) -> Result<()> {
        let mut backups = self.lock()?;
        let before = backups.len();
        backups.retain(|b| b.info.name != backup_name);
        if backups.len() == before {
            return Err(Error::NotFound(format!("Backup {}", backup_name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::RetentionPolicy;

    #[test]
    fn test_store_records_contents() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), b"ledger bytes").unwrap();

        let dest = MemoryDestination::new();
        let name = dest
            .store(file.path(), "t_backup_20240115_120000.csv")
            .unwrap();

        assert_eq!(dest.count(), 1);
        assert_eq!(dest.contents(&name).unwrap(), b"ledger bytes");
    }

    #[test]
    fn test_failing_destination() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dest = MemoryDestination::failing();
        assert!(dest.store(file.path(), "t_backup_20240115_120000.csv").is_err());
        assert_eq!(dest.count(), 0);
    }

    #[test]
    fn test_prune() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dest = MemoryDestination::new();
        dest.store(file.path(), "t_backup_20240115_120000.csv").unwrap();
        dest.store(file.path(), "t_backup_20240115_120000.csv").unwrap();
        dest.store(file.path(), "t_backup_20240116_120000.csv").unwrap();

        let result = dest.prune(&RetentionPolicy::keep_last(2)).unwrap();
        assert_eq!(result.deleted_names, vec!["t_backup_20240115_120000.csv"]);
        assert_eq!(
            dest.stored_names(),
            vec![
                "t_backup_20240115_120000_2.csv".to_string(),
                "t_backup_20240116_120000.csv".to_string()
            ]
        );
    }
}
