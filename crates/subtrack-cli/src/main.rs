//! Subtrack CLI - Bill and subscription tracker
//!
//! Usage:
//!   subtrack init                          Initialize database
//!   subtrack subscriptions add ...         Record a subscription
//!   subtrack due --days 7                  What is due soon
//!   subtrack serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
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

    run(cli)
        .await
        .map_err(|err| anyhow::anyhow!(commands::describe_error(&err)))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Subscriptions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(SubscriptionsAction::List) => commands::cmd_subscriptions_list(&db),
                Some(SubscriptionsAction::Add {
                    name,
                    amount,
                    cycle,
                    due,
                    category,
                    notes,
                }) => commands::cmd_subscriptions_add(
                    &db,
                    &name,
                    &amount,
                    &cycle,
                    &due,
                    &category,
                    notes.as_deref(),
                ),
                Some(SubscriptionsAction::Show { id }) => commands::cmd_subscriptions_show(&db, id),
                Some(SubscriptionsAction::Update {
                    id,
                    name,
                    amount,
                    cycle,
                    due,
                    category,
                    notes,
                    clear_notes,
                }) => commands::cmd_subscriptions_update(
                    &db,
                    id,
                    commands::UpdateArgs {
                        name,
                        amount,
                        cycle,
                        due,
                        category,
                        notes,
                        clear_notes,
                    },
                ),
                Some(SubscriptionsAction::Delete { id }) => {
                    commands::cmd_subscriptions_delete(&db, id)
                }
                Some(SubscriptionsAction::Paid { id }) => {
                    commands::cmd_subscriptions_paid(&db, id, commands::today())
                }
                Some(SubscriptionsAction::Search { term }) => {
                    commands::cmd_subscriptions_search(&db, &term)
                }
            }
        }
        Commands::Due { days, as_of } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let today = commands::resolve_date(as_of.as_deref())?;
            commands::cmd_due(&db, today, days)
        }
        Commands::Summary => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db)
        }
        Commands::Insight { id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_insight(&db, id)
        }
        Commands::Dashboard { days, as_of } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let today = commands::resolve_date(as_of.as_deref())?;
            commands::cmd_dashboard(&db, today, days)
        }
        Commands::Export { export_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match export_type {
                ExportType::Csv { output } => commands::cmd_export_csv(&db, output.as_deref()),
                ExportType::Json { output } => commands::cmd_export_json(&db, output.as_deref()),
            }
        }
        Commands::Import { file, clear, yes } => {
            commands::cmd_import(&cli.db, &file, clear, yes, cli.no_encrypt)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, static_dir.as_deref()).await
        }
    }
}
