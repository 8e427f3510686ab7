//! Normalization and rejection of raw ledger rows
//!
//! Rules applied to every load:
//! - a header that is not exactly `Date,Type,Category,Amount,Note` discards the dataset
//! - rows with an unparseable date are dropped
//! - a type other than `Income`/`Expense` becomes `Expense`
//! - rows with a non-numeric, non-finite or negative amount are dropped
//! - a missing category becomes `Other`, a missing note becomes empty
//! - survivors are sorted by date, newest first
//!
//! Nothing here returns an error; bad rows are counted in the report.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::models::{RawRow, Transaction, TransactionType, DEFAULT_CATEGORY, LEDGER_COLUMNS};

/// Outcome of validating a raw dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Validated {
    /// Header matched; contains the cleaned ledger
    Ledger {
        transactions: Vec<Transaction>,
        report: ValidationReport,
    },
    /// Header did not match; the dataset was discarded
    SchemaMismatch { found: Vec<String> },
}

/// Counters describing what validation did to a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub kept: usize,
    pub dropped_bad_date: usize,
    pub dropped_bad_amount: usize,
    pub coerced_type: usize,
    pub defaulted_category: usize,
}

impl ValidationReport {
    pub fn dropped(&self) -> usize {
        self.dropped_bad_date + self.dropped_bad_amount
    }
}

/// Whether a header row is exactly the ledger schema
pub fn header_matches<S: AsRef<str>>(headers: &[S]) -> bool {
    headers.len() == LEDGER_COLUMNS.len()
        && headers
            .iter()
            .zip(LEDGER_COLUMNS.iter())
            .all(|(found, expected)| found.as_ref() == *expected)
}

/// Validate a full dataset: schema check first, then per-row rules
pub fn validate<S: AsRef<str>>(
    headers: &[S],
    rows: impl IntoIterator<Item = RawRow>,
) -> Validated {
    if !header_matches(headers) {
        let found: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        warn!("Ledger header mismatch, discarding dataset: {:?}", found);
        return Validated::SchemaMismatch { found };
    }

    let (transactions, report) = validate_rows(rows);
    Validated::Ledger {
        transactions,
        report,
    }
}

/// Apply the per-row rules and sort the survivors newest first
pub fn validate_rows(rows: impl IntoIterator<Item = RawRow>) -> (Vec<Transaction>, ValidationReport) {
    let mut report = ValidationReport::default();
    let mut transactions = Vec::new();

    for row in rows {
        report.total_rows += 1;

        let Some(date) = row.date.as_deref().and_then(parse_date) else {
            report.dropped_bad_date += 1;
            continue;
        };

        let Some(amount) = row.amount.as_deref().and_then(parse_amount) else {
            report.dropped_bad_amount += 1;
            continue;
        };

        let raw_kind = row.kind.unwrap_or_default();
        let kind = TransactionType::coerce(&raw_kind);
        if kind.as_str() != raw_kind {
            report.coerced_type += 1;
        }

        let category = match row.category {
            Some(c) if !c.trim().is_empty() => c,
            _ => {
                report.defaulted_category += 1;
                DEFAULT_CATEGORY.to_string()
            }
        };

        transactions.push(Transaction {
            date,
            kind,
            category,
            amount,
            note: row.note.unwrap_or_default(),
        });
    }

    // Stable: rows sharing a date keep their stored order
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    report.kept = transactions.len();

    if report.dropped() > 0 {
        warn!(
            "Dropped {} of {} ledger rows ({} bad date, {} bad amount)",
            report.dropped(),
            report.total_rows,
            report.dropped_bad_date,
            report.dropped_bad_amount
        );
    }
    debug!("Validation: {:?}", report);

    (transactions, report)
}

/// Parse a stored date, discarding any time component
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%m/%d/%Y", // 01/15/2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parse a stored amount; negatives and non-finite values are rejected
pub fn parse_amount(s: &str) -> Option<f64> {
    let amount = s.trim().parse::<f64>().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some(amount)
}
