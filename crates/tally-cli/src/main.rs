//! Tally CLI - Personal finance ledger
//!
//! Usage:
//!   tally add --type expense --category Food --amount 12.50
//!   tally list --type expense --from 2024-01-01
//!   tally report monthly
//!   tally export --output snapshot.json

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.ledger)?;
    let mut service = commands::open_service(&config);
    let json = cli.json;

    match cli.command {
        Commands::List {
            kind,
            category,
            from,
            to,
            limit,
        } => {
            let filters = commands::ListFilters {
                kind: kind.as_deref(),
                category: category.as_deref(),
                from: from.as_deref(),
                to: to.as_deref(),
            };
            commands::cmd_list(&service, &filters, limit, json)
        }
        Commands::Add {
            date,
            kind,
            category,
            amount,
            note,
        } => commands::cmd_add(
            &mut service,
            date.as_deref(),
            &kind,
            &category,
            amount,
            note.as_deref(),
        ),
        Commands::Remove { position, id } => match (position, id) {
            (_, Some(id)) => commands::cmd_remove_by_id(&mut service, &id),
            (Some(position), None) => commands::cmd_remove(&mut service, position),
            (None, None) => anyhow::bail!("Specify a position or --id"),
        },
        Commands::Summary => commands::cmd_summary(&service, json),
        Commands::Report { report_type } => match report_type {
            ReportType::Monthly => commands::cmd_report_monthly(&service, json),
            ReportType::Categories { kind } => {
                commands::cmd_report_categories(&service, &kind, json)
            }
            ReportType::Expenses { categories } => {
                commands::cmd_report_expenses(&service, &categories, json)
            }
            ReportType::Trends { days } => {
                commands::cmd_report_trends(&service, days.unwrap_or(config.trend_days), json)
            }
            ReportType::Health => commands::cmd_report_health(&service, json),
        },
        Commands::Export { output } => {
            let output = output.unwrap_or_else(|| config.export_path.clone());
            commands::cmd_export(&service, &output)
        }
        Commands::Import { file } => {
            let file = file.unwrap_or_else(|| config.export_path.clone());
            commands::cmd_import(&mut service, &file)
        }
        Commands::Backup { action } => match action {
            BackupAction::List => commands::cmd_backup_list(service.store()),
            BackupAction::Prune { keep, yes } => {
                commands::cmd_backup_prune(service.store(), keep, yes)
            }
        },
    }
}
