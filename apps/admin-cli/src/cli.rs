//! CLI argument definitions using clap
//!
//! Commands:
//! - repairdesk init
//! - repairdesk tables | columns <TABLE> | count <TABLE>
//! - repairdesk list <TABLE> | get <TABLE> <KEY>
//! - repairdesk insert <TABLE> --set Col=value ...
//! - repairdesk update <TABLE> --set Col=value ... --where "Col=value AND ..."
//! - repairdesk delete <TABLE> --where "Col=value AND ..."
//! - repairdesk query "<SQL>" [--param value ...]
//! - repairdesk report <KIND> [--prefix S] [--limit N] [--days N] [--threshold X]
//! - repairdesk create-table <NAME> --column "Col=DEFINITION" ... [--replace]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use repairdesk_core::{Record, Value};
use repairdesk_db::Report;

/// RepairDesk - validated record management for a repair shop
#[derive(Parser, Debug)]
#[command(name = "repairdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database file (overrides REPAIRDESK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and apply migrations
    Init,

    /// List user tables
    Tables,

    /// Show a table's column descriptors
    Columns { table: String },

    /// Count a table's rows
    Count { table: String },

    /// Print every row of a table
    List { table: String },

    /// Print one row by primary key
    Get { table: String, key: String },

    /// Insert a validated record
    Insert {
        table: String,

        /// Column value, as Col=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        values: Vec<(String, String)>,
    },

    /// Update matching records
    Update {
        table: String,

        /// Column value, as Col=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        values: Vec<(String, String)>,

        /// Condition, e.g. "RepairID=3 AND Status='Pending'"
        #[arg(long = "where")]
        condition: String,
    },

    /// Delete matching records
    Delete {
        table: String,

        /// Condition, e.g. "ItemID=1"
        #[arg(long = "where")]
        condition: String,
    },

    /// Run a read query
    Query {
        sql: String,

        /// Positional parameter for ?1, ?2, ... (repeatable)
        #[arg(long = "param")]
        params: Vec<String>,
    },

    /// Run a canned report
    Report {
        kind: ReportKind,

        /// Last-name prefix for customers-by-last-name
        #[arg(long, default_value = "S")]
        prefix: String,

        /// Row limit for top-products
        #[arg(long, default_value_t = 5)]
        limit: i64,

        /// Window for recent-computer-repairs
        #[arg(long, default_value_t = 7)]
        days: i64,

        /// Amount for customers-spending-over
        #[arg(long, default_value_t = 100.0)]
        threshold: f64,
    },

    /// Create a table from column definitions
    CreateTable {
        name: String,

        /// Column definition, as Col=DEFINITION (repeatable)
        #[arg(long = "column", value_parser = parse_assignment, required = true)]
        columns: Vec<(String, String)>,

        /// Drop and recreate if the table exists
        #[arg(long)]
        replace: bool,
    },
}

/// Report names on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    SuppliersByName,
    CustomersByLastName,
    TopProducts,
    OpenRepairJobs,
    RecentComputerRepairs,
    PartsWithSuppliers,
    RepairJobsWithCustomers,
    SoldItemsWithCustomers,
    CarRepairs,
    JobsPerCustomer,
    PartUsage,
    SalesRevenue,
    CustomersSpendingOver,
    AverageRepairPrice,
    TableCounts,
}

impl ReportKind {
    /// Builds the report, taking only the options this kind uses.
    pub fn into_report(self, prefix: String, limit: i64, days: i64, threshold: f64) -> Report {
        match self {
            ReportKind::SuppliersByName => Report::SuppliersByName,
            ReportKind::CustomersByLastName => Report::CustomersByLastNamePrefix { prefix },
            ReportKind::TopProducts => Report::TopProductsByPrice { limit },
            ReportKind::OpenRepairJobs => Report::OpenRepairJobs,
            ReportKind::RecentComputerRepairs => Report::RecentComputerRepairs { days },
            ReportKind::PartsWithSuppliers => Report::PartsWithSuppliers,
            ReportKind::RepairJobsWithCustomers => Report::RepairJobsWithCustomers,
            ReportKind::SoldItemsWithCustomers => Report::SoldItemsWithCustomers,
            ReportKind::CarRepairs => Report::CarRepairsWithStatus,
            ReportKind::JobsPerCustomer => Report::JobCountPerCustomer,
            ReportKind::PartUsage => Report::PartUsageTotals,
            ReportKind::SalesRevenue => Report::SalesRevenue,
            ReportKind::CustomersSpendingOver => Report::CustomersSpendingOver { threshold },
            ReportKind::AverageRepairPrice => Report::AverageRepairPriceByType,
            ReportKind::TableCounts => Report::TableRowCounts,
        }
    }
}

/// Splits `Col=value` at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Col=value, got {raw:?}"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in {raw:?}"));
    }
    Ok((column.to_string(), value.to_string()))
}

/// Command-line values are text; the engine coerces them per column.
pub fn to_record(values: Vec<(String, String)>) -> Record {
    values
        .into_iter()
        .map(|(column, value)| (column, Value::Text(value)))
        .collect()
}

/// Query parameters have no column type to coerce against, so numbers are
/// recognised here.
pub fn to_param(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Integer(i)
    } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        Value::Real(f)
    } else if raw.eq_ignore_ascii_case("NULL") {
        Value::Null
    } else {
        Value::Text(raw.to_string())
    }
}
