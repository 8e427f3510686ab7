//! Backup management commands

use std::io::{self, Write};

use anyhow::{Context, Result};
use tally_core::{LedgerStore, RetentionPolicy};

/// List backups of the ledger
pub fn cmd_backup_list(store: &LedgerStore) -> Result<()> {
    let destination = store.destination();
    let backups = destination.list().context("Failed to list backups")?;

    if backups.is_empty() {
        println!("No backups found for {}", store.path().display());
        return Ok(());
    }

    println!(
        "Backups of {} ({} destination):",
        store.path().display(),
        destination.name()
    );
    println!();
    println!("{:<45} {:>10} {:>17}", "NAME", "SIZE", "CREATED");
    println!("{}", "-".repeat(74));

    for backup in backups {
        let created = backup.created_at.format("%Y-%m-%d %H:%M:%S");
        println!(
            "{:<45} {:>10} {:>17}",
            backup.name,
            format_size(backup.size),
            created
        );
    }

    Ok(())
}

/// Prune old backups according to retention policy
pub fn cmd_backup_prune(store: &LedgerStore, keep: usize, yes: bool) -> Result<()> {
    let destination = store.destination();
    let backups = destination.list().context("Failed to list backups")?;

    if backups.len() <= keep {
        println!(
            "Nothing to prune. {} backup(s) found, keeping {}.",
            backups.len(),
            keep
        );
        return Ok(());
    }

    let to_delete = backups.len() - keep;

    if !yes {
        println!(
            "This will delete {} backup(s), keeping the {} most recent:",
            to_delete, keep
        );
        println!();
        for backup in backups.iter().skip(keep) {
            println!("  - {} ({})", backup.name, format_size(backup.size));
        }
        println!();
        print!("Continue? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            return Ok(());
        }
    }

    let policy = RetentionPolicy::keep_last(keep);
    let result = destination
        .prune(&policy)
        .context("Failed to prune backups")?;

    println!("✅ Pruned {} backup(s)", result.deleted_count);
    println!("   Freed: {}", format_size(result.bytes_freed));
    println!("   Remaining: {} backup(s)", result.retained_count);

    if !result.deleted_names.is_empty() {
        println!();
        println!("Deleted:");
        for name in &result.deleted_names {
            println!("  - {}", name);
        }
    }

    Ok(())
}

/// Format a byte size as human-readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
