//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::analytics::{filter_by_category, filter_by_date_range, filter_by_type};
use tally_core::LedgerService;

use super::{format_amount, parse_date_arg, parse_kind, truncate};

/// Filters for `tally list`, as given on the command line
#[derive(Debug, Default)]
pub struct ListFilters<'a> {
    pub kind: Option<&'a str>,
    pub category: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

pub fn cmd_list(
    service: &LedgerService,
    filters: &ListFilters<'_>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let ledger = service.ledger();
    let mut rows = ledger.to_vec();

    if let Some(kind) = filters.kind {
        rows = filter_by_type(&rows, parse_kind(kind)?.as_str());
    }
    if let Some(category) = filters.category {
        rows = filter_by_category(&rows, category);
    }
    if filters.from.is_some() || filters.to.is_some() {
        let from = filters
            .from
            .map(|s| parse_date_arg(s, "--from"))
            .transpose()?
            .unwrap_or(NaiveDate::MIN);
        let to = filters
            .to
            .map(|s| parse_date_arg(s, "--to"))
            .transpose()?
            .unwrap_or(NaiveDate::MAX);
        rows = filter_by_date_range(&rows, from, to);
    }

    let matched = rows.len();
    rows.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if ledger.is_empty() {
        println!("No transactions yet. Record one with:");
        println!("  tally add --type expense --category Food --amount 12.50");
        return Ok(());
    }

    if rows.is_empty() {
        println!("No transactions match the given filters.");
        return Ok(());
    }

    println!();
    println!("📝 Transactions ({} of {})", rows.len(), matched);
    println!("   ─────────────────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:12} │ {:10} │ {:>12} │ {:15} │ {}",
        "#", "ID", "Date", "Amount", "Category", "Note"
    );

    for tx in &rows {
        // Identical rows are interchangeable, so the first match is a valid position
        let position = ledger
            .iter()
            .position(|t| t == tx)
            .map(|p| p.to_string())
            .unwrap_or_default();
        let fingerprint = tx.fingerprint();

        println!(
            "   {:>4} │ {:12} │ {} │ {:>21} │ {:15} │ {}",
            position,
            &fingerprint[..12],
            tx.date,
            format_amount(tx),
            truncate(&tx.category, 15),
            truncate(&tx.note, 30)
        );
    }

    Ok(())
}

pub fn cmd_add(
    service: &mut LedgerService,
    date: Option<&str>,
    kind: &str,
    category: &str,
    amount: f64,
    note: Option<&str>,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let date = match date {
        Some(s) => parse_date_arg(s, "--date")?,
        None => Local::now().date_naive(),
    };

    if !amount.is_finite() || amount < 0.0 {
        anyhow::bail!(
            "Amount must be a non-negative number, got {}. Use --type to record money going out.",
            amount
        );
    }

    let category = category.trim();
    if category.is_empty() {
        anyhow::bail!("Category must not be empty");
    }

    let ledger = service
        .add(date, kind, category, amount, note.unwrap_or(""))
        .context("Failed to save transaction")?;

    let tx = &ledger[0];
    println!("✅ Added {} {}", tx.kind, format_amount(tx));
    println!("   Date: {}", tx.date);
    println!("   Category: {}", tx.category);
    if !tx.note.is_empty() {
        println!("   Note: {}", tx.note);
    }
    println!("   ID: {}", &tx.fingerprint()[..12]);

    Ok(())
}

pub fn cmd_remove(service: &mut LedgerService, position: usize) -> Result<()> {
    let total = service.ledger().len();
    let Some(tx) = service.ledger().get(position).cloned() else {
        println!(
            "No transaction at position {} (ledger has {} transaction(s)). Nothing removed.",
            position, total
        );
        return Ok(());
    };

    service
        .remove(position)
        .context("Failed to save ledger after removal")?;

    println!(
        "✅ Removed {} {} ({}, {})",
        tx.kind,
        format_amount(&tx),
        tx.category,
        tx.date
    );
    Ok(())
}

pub fn cmd_remove_by_id(service: &mut LedgerService, id: &str) -> Result<()> {
    match service
        .remove_by_fingerprint(id)
        .context("Failed to remove transaction")?
    {
        Some(tx) => println!(
            "✅ Removed {} {} ({}, {})",
            tx.kind,
            format_amount(&tx),
            tx.category,
            tx.date
        ),
        None => println!("No transaction matches {}. Nothing removed.", id),
    }
    Ok(())
}
