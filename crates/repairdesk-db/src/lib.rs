//! # repairdesk-db: Database Layer for RepairDesk
//!
//! Validated writes and plain reads over the RepairDesk SQLite store.
//! Uses sqlx for async access; the business rules come from
//! `repairdesk-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RepairDesk Data Flow                             │
//! │                                                                         │
//! │  repairdesk insert Parts --set Name=... --set StockQTY=4                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  repairdesk-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌─────────────┐   ┌─────────────────────┐  │   │
//! │  │   │  Database   │   │ Repositories│   │  Validation         │  │   │
//! │  │   │  (pool.rs)  │   │             │   │                     │  │   │
//! │  │   │             │   │ RecordRepo ─┼──►│ schema   (columns)  │  │   │
//! │  │   │ SqlitePool  │◄──│ ReportRepo  │   │ validator (rules)   │  │   │
//! │  │   │ DbConfig    │   │             │   │ existence (probes)  │  │   │
//! │  │   └─────────────┘   └─────────────┘   └─────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite (WAL, foreign_keys = ON), migrations/sqlite embedded    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`schema`] - Table and column introspection
//! - [`existence`] - Foreign-key existence probes
//! - [`validator`] - Per-table rules plus probes
//! - [`repository`] - Record writes/reads and reports
//! - [`row`] - Dynamically typed result rows
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repairdesk_core::{record, Condition, Value};
//! use repairdesk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("repairdesk.db")).await?;
//!
//! let part = db.records().insert("Parts", &record([
//!     ("Name", Value::from("Brake pad")),
//!     ("StockQTY", Value::from("12")),
//! ])).await?;
//!
//! db.records()
//!     .update("Parts", &record([("StockQTY", Value::from(10))]), &Condition::eq("PartID", part))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod existence;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod row;
pub mod schema;
pub mod sql;
pub mod validator;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, WriteSettings};
pub use row::Row;

// Repository re-exports for convenience
pub use repository::records::{CreateOutcome, RecordRepository, WriteStage};
pub use repository::reports::{Report, ReportRepository};
