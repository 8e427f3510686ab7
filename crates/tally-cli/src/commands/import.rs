//! Snapshot export/import commands

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{export_to_path, import_snapshot, LedgerService};

/// Export the ledger to a JSON snapshot
pub fn cmd_export(service: &LedgerService, output: &Path) -> Result<()> {
    let written = export_to_path(service.ledger(), output)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    if !written {
        println!("Ledger is empty, nothing exported.");
        return Ok(());
    }

    println!("✅ Exported {} transactions", service.ledger().len());
    println!("   Output: {}", output.display());
    Ok(())
}

/// Replace the ledger with the contents of a JSON snapshot
///
/// An absent or empty snapshot leaves the ledger untouched.
pub fn cmd_import(service: &mut LedgerService, file: &Path) -> Result<()> {
    let imported = import_snapshot(file)
        .with_context(|| format!("Failed to read snapshot {}", file.display()))?;

    if imported.is_empty() {
        println!("No transactions found in {}. Ledger unchanged.", file.display());
        return Ok(());
    }

    let previous = service.ledger().len();
    let ledger = service
        .replace(imported)
        .context("Failed to save imported ledger")?;

    println!("✅ Imported {} transactions from {}", ledger.len(), file.display());
    println!("   Replaced {} existing transaction(s); the previous file was backed up", previous);
    Ok(())
}
