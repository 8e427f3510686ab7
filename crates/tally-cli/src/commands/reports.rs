//! Report command implementations

use anyhow::Result;
use tally_core::analytics::{
    category_analysis, cumulative_expense, health_score, monthly_summary, totals, trend_analysis,
};
use tally_core::{HealthScore, LedgerService};

use super::{parse_kind, truncate};

fn health_label(score: u8) -> &'static str {
    match score {
        100 => "Excellent",
        80 => "Good",
        60 => "Fair",
        20 => "Poor",
        _ => "No income recorded",
    }
}

fn print_health(health: &HealthScore) {
    println!("   Health score: {}/100 ({})", health.score, health_label(health.score));
    match health.savings_rate {
        Some(rate) => println!("   Savings rate: {:.1}%", rate),
        None => println!("   Savings rate: n/a"),
    }
}

pub fn cmd_summary(service: &LedgerService, json: bool) -> Result<()> {
    let ledger = service.ledger();
    let totals = totals(ledger);
    let health = health_score(ledger);

    if json {
        let value = serde_json::json!({ "totals": totals, "health": health });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("💰 Ledger Summary");
    println!("   Ledger: {}", service.store().path().display());
    println!("   ─────────────────────────────────────────────");
    println!("   Transactions: {}", totals.transaction_count);
    println!("   Income:       ${:.2}", totals.income);
    println!("   Expenses:     ${:.2}", totals.expense);
    println!("   Balance:      ${:.2}", totals.balance);
    println!();
    print_health(&health);

    Ok(())
}

pub fn cmd_report_monthly(service: &LedgerService, json: bool) -> Result<()> {
    let months = monthly_summary(service.ledger());

    if json {
        println!("{}", serde_json::to_string_pretty(&months)?);
        return Ok(());
    }

    println!();
    println!("📅 Monthly Summary");
    println!("   ─────────────────────────────────────────────────────");

    if months.is_empty() {
        println!("   No transactions recorded.");
        return Ok(());
    }

    println!(
        "   {:7} │ {:>12} │ {:>12} │ {:>12}",
        "Month", "Income", "Expense", "Balance"
    );
    println!("   ────────┼──────────────┼──────────────┼──────────────");
    for m in &months {
        println!(
            "   {:7} │ {:>12.2} │ {:>12.2} │ {:>12.2}",
            m.month, m.income, m.expense, m.balance
        );
    }

    Ok(())
}

pub fn cmd_report_categories(service: &LedgerService, kind: &str, json: bool) -> Result<()> {
    let kind = parse_kind(kind)?;
    let stats = category_analysis(service.ledger(), kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📊 {} by Category", kind);
    println!("   ─────────────────────────────────────────────────────────────────────────────");

    if stats.is_empty() {
        println!("   No {} transactions recorded.", kind.as_str().to_lowercase());
        return Ok(());
    }

    println!(
        "   {:20} │ {:>10} │ {:>9} │ {:>5} │ {:>6} │ {:10} │ {:10}",
        "Category", "Total", "Mean", "Count", "%", "First", "Last"
    );
    println!("   ─────────────────────┼────────────┼───────────┼───────┼────────┼────────────┼───────────");
    for s in &stats {
        println!(
            "   {:20} │ {:>10.2} │ {:>9.2} │ {:>5} │ {:>5.2}% │ {} │ {}",
            truncate(&s.category, 20),
            s.total,
            s.mean,
            s.count,
            s.percentage,
            s.first_date,
            s.last_date
        );
    }

    Ok(())
}

pub fn cmd_report_expenses(service: &LedgerService, categories: &[String], json: bool) -> Result<()> {
    let registered = if categories.is_empty() {
        None
    } else {
        Some(categories)
    };
    let totals = cumulative_expense(service.ledger(), registered);

    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    println!();
    println!("🧾 Cumulative Expenses");
    println!("   ─────────────────────────────────────");

    if totals.is_empty() {
        println!("   No expenses recorded.");
        return Ok(());
    }

    for (category, total) in &totals {
        println!("   {:20} │ {:>12.2}", truncate(category, 20), total);
    }
    println!("   ─────────────────────┼─────────────");
    println!("   {:20} │ {:>12.2}", "Total", totals.values().sum::<f64>());

    Ok(())
}

pub fn cmd_report_trends(service: &LedgerService, days: u32, json: bool) -> Result<()> {
    let report = trend_analysis(service.ledger(), days);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(report) = report else {
        println!("No data for a {}-day trend.", days);
        return Ok(());
    };

    println!();
    println!("📈 Trends: last {} days", report.days);
    println!("   Window: {} to {}", report.window_start, report.window_end);
    println!("   ─────────────────────────────────────────────");
    println!("   Transactions:   {}", report.transaction_count);
    println!(
        "   Income:         ${:.2} (${:.2}/day)",
        report.total_income, report.avg_daily_income
    );
    println!(
        "   Expenses:       ${:.2} (${:.2}/day)",
        report.total_expense, report.avg_daily_expense
    );
    println!("   Net flow:       ${:.2}", report.net_flow);

    if !report.top_expense_categories.is_empty() {
        println!();
        println!("   Top expense categories:");
        for (i, c) in report.top_expense_categories.iter().enumerate() {
            println!("   {}. {:20} ${:.2}", i + 1, truncate(&c.category, 20), c.total);
        }
    }

    Ok(())
}

pub fn cmd_report_health(service: &LedgerService, json: bool) -> Result<()> {
    let health = health_score(service.ledger());

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    println!();
    println!("🩺 Financial Health");
    println!("   ─────────────────────────────────────");
    print_health(&health);

    Ok(())
}
