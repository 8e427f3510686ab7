//! Local filesystem backup destination

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{
    backup_prefix, parse_backup_time, sort_newest_first, with_collision_suffix,
    BackupDestination, BackupInfo,
};
use crate::error::{Error, Result};

/// Keeps backups in the ledger's own directory
pub struct LocalDestination {
    /// Directory where backups are stored
    backup_dir: PathBuf,
    /// Only files starting with this prefix belong to this ledger
    prefix: String,
    /// Backups also carry the ledger's extension
    extension: Option<String>,
}

impl LocalDestination {
    /// Create a destination for the ledger at `ledger_path`
    ///
    /// Backups go into the same directory as the ledger file.
    pub fn for_ledger(ledger_path: &Path) -> Self {
        let backup_dir = match ledger_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            backup_dir,
            prefix: backup_prefix(ledger_path),
            extension: ledger_path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_string),
        }
    }

    /// Get the full path for a backup name
    fn backup_path(&self, name: &str) -> PathBuf {
        self.backup_dir.join(name)
    }

    fn is_own_backup(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix)
            && Path::new(file_name).extension().and_then(|e| e.to_str())
                == self.extension.as_deref()
    }

    /// Get the backup directory path
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

impl BackupDestination for LocalDestination {
    fn name(&self) -> &str {
        "local"
    }

    fn store(&self, source: &Path, backup_name: &str) -> Result<String> {
        if !self.backup_dir.exists() {
            fs::create_dir_all(&self.backup_dir).map_err(|e| {
                Error::Backup(format!(
                    "Failed to create backup directory {}: {}",
                    self.backup_dir.display(),
                    e
                ))
            })?;
        }

        let mut name = backup_name.to_string();
        let mut n = 2;
        while self.backup_path(&name).exists() {
            name = with_collision_suffix(backup_name, n);
            n += 1;
        }

        let dest_path = self.backup_path(&name);
        fs::copy(source, &dest_path).map_err(|e| {
            Error::Backup(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                dest_path.display(),
                e
            ))
        })?;

        info!("Stored backup: {}", dest_path.display());
        Ok(name)
    }

    fn list(&self) -> Result<Vec<BackupInfo>> {
        let mut backups = Vec::new();

        if !self.backup_dir.exists() {
            return Ok(backups);
        }

        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let path = entry.path();

            // Only include this ledger's backup files
            let file_name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) if self.is_own_backup(name) => name.to_string(),
                _ => continue,
            };

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            let Some(created_at) = parse_backup_time(&file_name) else {
                continue;
            };

            backups.push(BackupInfo {
                name: file_name,
                path: path.to_string_lossy().to_string(),
                size: metadata.len(),
                created_at,
            });
        }

        sort_newest_first(&mut backups);

        Ok(backups)
    }

    fn delete(&self, backup_name: &str) -> Result<()> {
        let path = self.backup_path(backup_name);

        if !path.exists() {
            return Err(Error::NotFound(format!("Backup {}", path.display())));
        }

        fs::remove_file(&path)?;
        info!("Deleted backup: {}", path.display());
        Ok(())
    }
}
