//! # RepairDesk Admin CLI
//!
//! One-shot commands over the validated record store.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  argv ──► clap ──► AppConfig::load() ──► Database::new() ──► command    │
//! │                                                                         │
//! │  stdout: JSON result          stderr: tracing logs, JSON error          │
//! │  exit 0: success              exit 1: any failure                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cli;
mod config;

use anyhow::Context;
use clap::Parser;
use repairdesk_core::Condition;
use repairdesk_db::{migrations, Database, DbError};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{to_param, to_record, Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        let body = match err.downcast_ref::<DbError>() {
            Some(db_err) => json!({ "error": { "code": db_err.code(), "message": db_err.to_string() } }),
            None => json!({ "error": { "code": "CLI_ERROR", "message": format!("{err:#}") } }),
        };
        eprintln!("{body}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. Logs go to stderr so stdout stays JSON.
///
/// ## Log Levels
/// Default `info,repairdesk=debug,sqlx=warn`; override with `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,repairdesk=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(path) = cli.db {
        config.database_path = path;
    }
    info!(path = %config.database_path.display(), "Configuration loaded");

    let db = Database::new(config.db_config()).await?;
    let records = db.records();

    let output = match cli.command {
        Command::Init => {
            let (total, applied) = migrations::migration_status(db.pool()).await?;
            json!({
                "database": config.database_path.display().to_string(),
                "migrations": { "total": total, "applied": applied },
                "tables": records.list_tables().await?,
            })
        }

        Command::Tables => json!(records.list_tables().await?),

        Command::Columns { table } => json!(records.columns(&table).await?),

        Command::Count { table } => json!({ "count": records.count(&table).await? }),

        Command::List { table } => json!(records.list(&table).await?),

        Command::Get { table, key } => match records.get(&table, to_param(&key)).await? {
            Some(row) => json!(row),
            None => anyhow::bail!("no {table} row with key {key}"),
        },

        Command::Insert { table, values } => {
            let id = records.insert(&table, &to_record(values)).await?;
            json!({ "id": id })
        }

        Command::Update {
            table,
            values,
            condition,
        } => {
            let condition: Condition = condition.parse().map_err(DbError::from)?;
            let rows = records.update(&table, &to_record(values), &condition).await?;
            json!({ "rows": rows })
        }

        Command::Delete { table, condition } => {
            let condition: Condition = condition.parse().map_err(DbError::from)?;
            let rows = records.delete(&table, &condition).await?;
            json!({ "rows": rows })
        }

        Command::Query { sql, params } => {
            let params: Vec<_> = params.iter().map(String::as_str).map(to_param).collect();
            json!(records.query(&sql, &params).await?)
        }

        Command::Report {
            kind,
            prefix,
            limit,
            days,
            threshold,
        } => {
            let report = kind.into_report(prefix, limit, days, threshold);
            json!({
                "report": report.title(),
                "rows": db.reports().run(&report).await?,
            })
        }

        Command::CreateTable {
            name,
            columns,
            replace,
        } => {
            let outcome = records.create_table(&name, &columns, replace).await?;
            json!({ "table": name, "outcome": outcome })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    db.close().await;
    Ok(())
}
