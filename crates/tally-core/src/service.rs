//! Ledger service: the in-session ledger plus its store
//!
//! Every mutating operation persists the full ledger before returning.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionType};
use crate::store::LedgerStore;

/// Shortest fingerprint prefix accepted by `remove_by_fingerprint`
pub const MIN_FINGERPRINT_PREFIX: usize = 8;

pub struct LedgerService {
    store: LedgerStore,
    ledger: Vec<Transaction>,
}

impl LedgerService {
    /// Load the ledger from `store`
    pub fn open(store: LedgerStore) -> Self {
        let ledger = store.load();
        debug!("Opened ledger with {} transactions", ledger.len());
        Self { store, ledger }
    }

    /// The current ledger, newest first as loaded
    pub fn ledger(&self) -> &[Transaction] {
        &self.ledger
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Record a transaction ahead of existing rows and persist
    ///
    /// The amount is taken as given; callers reject negative amounts.
    pub fn add(
        &mut self,
        date: NaiveDate,
        kind: TransactionType,
        category: impl Into<String>,
        amount: f64,
        note: impl Into<String>,
    ) -> Result<&[Transaction]> {
        let tx = Transaction::new(date, kind, category, amount, note);
        info!("Adding {} {} ({}) on {}", tx.kind, tx.amount, tx.category, tx.date);
        self.ledger.insert(0, tx);
        self.store.save(&self.ledger)?;
        Ok(&self.ledger)
    }

    /// Drop the row at `position` and persist
    ///
    /// An out-of-range position leaves the ledger and the file untouched.
    pub fn remove(&mut self, position: usize) -> Result<&[Transaction]> {
        if position >= self.ledger.len() {
            debug!(
                "Remove position {} out of range ({} rows), nothing to do",
                position,
                self.ledger.len()
            );
            return Ok(&self.ledger);
        }

        let removed = self.ledger.remove(position);
        info!("Removed transaction {} at position {}", removed.fingerprint(), position);
        self.store.save(&self.ledger)?;
        Ok(&self.ledger)
    }

    /// Drop the transaction whose fingerprint starts with `fingerprint`
    ///
    /// Returns the removed transaction, or `None` when nothing matches. A
    /// prefix matching more than one distinct fingerprint is rejected.
    /// Identical rows share a fingerprint; only the first is removed.
    pub fn remove_by_fingerprint(&mut self, fingerprint: &str) -> Result<Option<Transaction>> {
        let needle = fingerprint.trim().to_ascii_lowercase();
        if needle.len() < MIN_FINGERPRINT_PREFIX || !needle.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidData(format!(
                "Fingerprint must be at least {} hex characters: {}",
                MIN_FINGERPRINT_PREFIX, fingerprint
            )));
        }

        let fingerprints: Vec<String> = self.ledger.iter().map(Transaction::fingerprint).collect();
        let mut matches = fingerprints
            .iter()
            .enumerate()
            .filter(|(_, fp)| fp.starts_with(&needle));

        let Some((position, first)) = matches.next() else {
            debug!("No transaction matches fingerprint {}", needle);
            return Ok(None);
        };
        if matches.any(|(_, fp)| fp != first) {
            return Err(Error::InvalidData(format!(
                "Fingerprint prefix {} is ambiguous",
                needle
            )));
        }

        let removed = self.ledger.remove(position);
        info!("Removed transaction {}", fingerprints[position]);
        self.store.save(&self.ledger)?;
        Ok(Some(removed))
    }

    /// Swap in a whole new ledger and persist
    pub fn replace(&mut self, ledger: Vec<Transaction>) -> Result<&[Transaction]> {
        info!("Replacing ledger ({} -> {} transactions)", self.ledger.len(), ledger.len());
        self.ledger = ledger;
        self.store.save(&self.ledger)?;
        Ok(&self.ledger)
    }

    /// Re-read the ledger from the store
    pub fn reload(&mut self) -> &[Transaction] {
        self.ledger = self.store.load();
        &self.ledger
    }
}
