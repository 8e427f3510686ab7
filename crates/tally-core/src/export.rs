//! JSON snapshot export and import
//!
//! A snapshot is a JSON array of records with the same five fields as the
//! ledger file. Export skips empty ledgers; import of a missing file yields
//! an empty ledger.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType, DEFAULT_CATEGORY};
use crate::validate::parse_date;

/// Default location of the snapshot document
pub const DEFAULT_EXPORT_PATH: &str = "data/transactions_export.json";

/// One transaction as it appears in a snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// `YYYY-MM-DD`
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Note", default)]
    pub note: String,
}

impl From<&Transaction> for SnapshotRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind.as_str().to_string(),
            category: tx.category.clone(),
            amount: tx.amount,
            note: tx.note.clone(),
        }
    }
}

impl TryFrom<SnapshotRecord> for Transaction {
    type Error = Error;

    fn try_from(record: SnapshotRecord) -> Result<Self> {
        let date = parse_date(&record.date)
            .ok_or_else(|| Error::InvalidData(format!("Invalid date in snapshot: {}", record.date)))?;

        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Invalid amount in snapshot: {}",
                record.amount
            )));
        }

        let category = if record.category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            record.category
        };

        Ok(Transaction::new(
            date,
            TransactionType::coerce(&record.kind),
            category,
            record.amount,
            record.note,
        ))
    }
}

/// Snapshot records for `ledger`, or `None` when there is nothing to export
pub fn export_snapshot(ledger: &[Transaction]) -> Option<Vec<SnapshotRecord>> {
    if ledger.is_empty() {
        return None;
    }
    Some(ledger.iter().map(SnapshotRecord::from).collect())
}

/// Write `ledger` to `path` as pretty-printed JSON
///
/// Returns `false` without touching the filesystem when the ledger is empty.
pub fn export_to_path(ledger: &[Transaction], path: &Path) -> Result<bool> {
    let Some(records) = export_snapshot(ledger) else {
        info!("Ledger is empty, nothing to export");
        return Ok(false);
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json)?;

    info!("Exported {} transactions to {}", records.len(), path.display());
    Ok(true)
}

/// Read a snapshot document, keeping document order
///
/// A missing file is an empty ledger. Malformed JSON, unparseable dates and
/// negative amounts are errors.
pub fn import_snapshot(path: &Path) -> Result<Vec<Transaction>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No snapshot at {}, nothing to import", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let records: Vec<SnapshotRecord> = serde_json::from_str(&contents)?;
    let ledger = records
        .into_iter()
        .map(Transaction::try_from)
        .collect::<Result<Vec<_>>>()?;

    info!("Imported {} transactions from {}", ledger.len(), path.display());
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, sample_ledger};
    use tempfile::TempDir;

    #[test]
    fn test_export_snapshot_empty() {
        assert!(export_snapshot(&[]).is_none());
    }

    #[test]
    fn test_export_snapshot_records() {
        let records = export_snapshot(&sample_ledger()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(
            records[0],
            SnapshotRecord {
                date: "2024-02-10".to_string(),
                kind: "Expense".to_string(),
                category: "Food".to_string(),
                amount: 45.25,
                note: "groceries".to_string(),
            }
        );
    }

    #[test]
    fn test_export_to_path_empty_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("export.json");

        assert!(!export_to_path(&[], &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_export_document_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("export.json");
        assert!(export_to_path(&sample_ledger(), &path).unwrap());

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["Date"], "2024-02-10");
        assert_eq!(first["Type"], "Expense");
        assert_eq!(first["Category"], "Food");
        assert_eq!(first["Amount"], 45.25);
        assert_eq!(first["Note"], "groceries");
    }

    #[test]
    fn test_export_import_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        let ledger = sample_ledger();

        export_to_path(&ledger, &path).unwrap();
        assert_eq!(import_snapshot(&path).unwrap(), ledger);
    }

    #[test]
    fn test_import_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(import_snapshot(&dir.path().join("absent.json"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_import_keeps_document_order_and_coerces_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("import.json");
        fs::write(
            &path,
            r#"[
                {"Date": "2024-01-01", "Type": "Transfer", "Category": "Bank", "Amount": 5},
                {"Date": "2024-03-01", "Type": "Income", "Category": "Salary", "Amount": 100.5, "Note": "x"}
            ]"#,
        )
        .unwrap();

        let ledger = import_snapshot(&path).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].date, date(2024, 1, 1));
        assert_eq!(ledger[0].kind, TransactionType::Expense);
        assert_eq!(ledger[0].note, "");
        assert_eq!(ledger[1].kind, TransactionType::Income);
        assert_eq!(ledger[1].amount, 100.5);
    }

    #[test]
    fn test_import_defaults_blank_or_missing_category() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("import.json");
        fs::write(
            &path,
            r#"[
                {"Date": "2024-01-01", "Type": "Expense", "Category": "", "Amount": 5},
                {"Date": "2024-01-02", "Type": "Expense", "Category": "   ", "Amount": 6},
                {"Date": "2024-01-03", "Type": "Expense", "Amount": 7}
            ]"#,
        )
        .unwrap();

        let ledger = import_snapshot(&path).unwrap();
        assert_eq!(ledger.len(), 3);
        assert!(ledger.iter().all(|t| t.category == DEFAULT_CATEGORY));
    }

    #[test]
    fn test_import_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(import_snapshot(&path), Err(Error::Json(_))));

        fs::write(
            &path,
            r#"[{"Date": "someday", "Type": "Expense", "Category": "Food", "Amount": 1}]"#,
        )
        .unwrap();
        assert!(matches!(import_snapshot(&path), Err(Error::InvalidData(_))));

        fs::write(
            &path,
            r#"[{"Date": "2024-01-01", "Type": "Expense", "Category": "Food", "Amount": -1}]"#,
        )
        .unwrap();
        assert!(matches!(import_snapshot(&path), Err(Error::InvalidData(_))));
    }
}
