//! Spending reports and analytics
//!
//! Pure functions over a validated ledger snapshot. Nothing here touches the
//! store; views are recomputed on demand and never persisted.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{
    CategoryStats, CategoryTotal, HealthScore, LedgerTotals, MonthlySummary, Transaction,
    TransactionType, TrendReport,
};

/// Default trailing window for trend analysis
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Number of categories listed in a trend report
const TOP_CATEGORY_LIMIT: usize = 5;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sum_of(ledger: &[Transaction], kind: TransactionType) -> f64 {
    ledger
        .iter()
        .filter(|t| t.kind == kind)
        .map(|t| t.amount)
        .sum()
}

/// Total income, total expense and the resulting balance
pub fn totals(ledger: &[Transaction]) -> LedgerTotals {
    let income = sum_of(ledger, TransactionType::Income);
    let expense = sum_of(ledger, TransactionType::Expense);
    LedgerTotals {
        income,
        expense,
        balance: income - expense,
        transaction_count: ledger.len(),
    }
}

/// Income, expense and balance per calendar month, oldest month first
pub fn monthly_summary(ledger: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

    for tx in ledger {
        let entry = months
            .entry((tx.date.year(), tx.date.month()))
            .or_insert((0.0, 0.0));
        match tx.kind {
            TransactionType::Income => entry.0 += tx.amount,
            TransactionType::Expense => entry.1 += tx.amount,
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expense))| MonthlySummary {
            month: format!("{:04}-{:02}", year, month),
            income,
            expense,
            balance: income - expense,
        })
        .collect()
}

/// Per-category statistics for one transaction type, ordered by category
///
/// `percentage` is the category's share of the type's total, rounded to two
/// decimal places. Returns an empty list when no rows have the type.
pub fn category_analysis(ledger: &[Transaction], kind: TransactionType) -> Vec<CategoryStats> {
    struct Acc {
        total: f64,
        count: usize,
        first: NaiveDate,
        last: NaiveDate,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for tx in ledger.iter().filter(|t| t.kind == kind) {
        groups
            .entry(tx.category.as_str())
            .and_modify(|acc| {
                acc.total += tx.amount;
                acc.count += 1;
                acc.first = acc.first.min(tx.date);
                acc.last = acc.last.max(tx.date);
            })
            .or_insert(Acc {
                total: tx.amount,
                count: 1,
                first: tx.date,
                last: tx.date,
            });
    }

    let grand_total: f64 = groups.values().map(|acc| acc.total).sum();

    groups
        .into_iter()
        .map(|(category, acc)| CategoryStats {
            category: category.to_string(),
            total: acc.total,
            mean: acc.total / acc.count as f64,
            count: acc.count,
            first_date: acc.first,
            last_date: acc.last,
            percentage: if grand_total > 0.0 {
                round2(acc.total / grand_total * 100.0)
            } else {
                0.0
            },
        })
        .collect()
}

/// Total expense per registered category
///
/// Categories are registered up front, either from `categories` or from the
/// distinct categories of expense rows. Expenses in unregistered categories
/// are ignored. A single pass over the ledger, so depth does not grow with
/// ledger size.
pub fn cumulative_expense(
    ledger: &[Transaction],
    categories: Option<&[String]>,
) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = match categories {
        Some(list) => list.iter().map(|c| (c.clone(), 0.0)).collect(),
        None => ledger
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| (t.category.clone(), 0.0))
            .collect(),
    };

    for tx in ledger.iter().filter(|t| t.is_expense()) {
        if let Some(total) = totals.get_mut(&tx.category) {
            *total += tx.amount;
        }
    }

    totals
}

/// Activity over the `days` leading up to the latest transaction date
///
/// The window is `[latest - days, latest]`, inclusive on both ends, anchored
/// at the ledger's own latest date rather than today. Returns `None` for an
/// empty ledger or a zero-day window.
pub fn trend_analysis(ledger: &[Transaction], days: u32) -> Option<TrendReport> {
    if days == 0 {
        return None;
    }

    let window_end = ledger.iter().map(|t| t.date).max()?;
    // Windows reaching past the earliest representable date start there
    let window_start = window_end
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MIN);

    let window: Vec<&Transaction> = ledger
        .iter()
        .filter(|t| t.date >= window_start && t.date <= window_end)
        .collect();
    if window.is_empty() {
        return None;
    }

    let mut total_income = 0.0;
    let mut total_expense = 0.0;
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    for tx in &window {
        match tx.kind {
            TransactionType::Income => total_income += tx.amount,
            TransactionType::Expense => {
                total_expense += tx.amount;
                *by_category.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
            }
        }
    }

    let mut top: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    top.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    top.truncate(TOP_CATEGORY_LIMIT);

    let span = f64::from(days);
    Some(TrendReport {
        days,
        window_start,
        window_end,
        total_income,
        total_expense,
        avg_daily_income: total_income / span,
        avg_daily_expense: total_expense / span,
        net_flow: total_income - total_expense,
        top_expense_categories: top,
        transaction_count: window.len(),
    })
}

/// Four-bucket score from the savings rate
///
/// 100 at a savings rate of 20% or more, 80 from 10%, 60 from 0%, 20 below
/// that. No income (or no transactions) scores 0.
pub fn health_score(ledger: &[Transaction]) -> HealthScore {
    let income = sum_of(ledger, TransactionType::Income);
    if ledger.is_empty() || income == 0.0 {
        return HealthScore {
            score: 0,
            savings_rate: None,
        };
    }

    let expense = sum_of(ledger, TransactionType::Expense);
    let savings_rate = (income - expense) / income * 100.0;

    let score = if savings_rate >= 20.0 {
        100
    } else if savings_rate >= 10.0 {
        80
    } else if savings_rate >= 0.0 {
        60
    } else {
        20
    };

    HealthScore {
        score,
        savings_rate: Some(savings_rate),
    }
}

/// Rows whose type is exactly `kind` ("Income" or "Expense"); anything else
/// matches nothing
pub fn filter_by_type(ledger: &[Transaction], kind: &str) -> Vec<Transaction> {
    ledger
        .iter()
        .filter(|t| t.kind.as_str() == kind)
        .cloned()
        .collect()
}

/// Rows whose category is exactly `category`
pub fn filter_by_category(ledger: &[Transaction], category: &str) -> Vec<Transaction> {
    ledger
        .iter()
        .filter(|t| t.category == category)
        .cloned()
        .collect()
}

/// Rows dated within `[from, to]`, inclusive
pub fn filter_by_date_range(ledger: &[Transaction], from: NaiveDate, to: NaiveDate) -> Vec<Transaction> {
    ledger
        .iter()
        .filter(|t| t.date >= from && t.date <= to)
        .cloned()
        .collect()
}
