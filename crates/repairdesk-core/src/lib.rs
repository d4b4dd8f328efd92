//! # repairdesk-core: Pure Record Rules for RepairDesk
//!
//! Everything about a write that can be decided without touching the
//! database: value types, coercion, and the per-table business rules.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RepairDesk Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    admin-cli / other callers                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    repairdesk-db                                │   │
//! │  │   introspect ─► coerce ─► validate ─► probe FKs ─► write        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ uses                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ repairdesk-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ coercion  │  │   rules   │  │ condition │  │   │
//! │  │   │  Value    │  │  TEXT →   │  │ per-table │  │  col op v │  │   │
//! │  │   │  Table    │  │  INTEGER  │  │  checks   │  │  AND ...  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `Value`, `Record`, `ColumnDef`, `Table`
//! - [`coercion`] - raw input → declared column types
//! - [`validation`] - field-level validators
//! - [`rules`] - one rule value per table
//! - [`condition`] - WHERE conditions for update/delete
//! - [`error`] - domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use repairdesk_core::rules::{check_local, rules_for, RuleMode};
//! use repairdesk_core::types::{record, Table, Value};
//!
//! let part = record([("Name", Value::from("Brake pad")), ("StockQTY", Value::Integer(-2))]);
//! let err = check_local(rules_for(Table::Parts), &part, RuleMode::Insert).unwrap_err();
//! assert_eq!(err.to_string(), "StockQTY must be >= 0");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coercion;
pub mod condition;
pub mod error;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use condition::{Condition, Operator, Predicate};
pub use error::{CoercionError, ConditionError, CoreError, CoreResult, ValidationError};
pub use rules::{ForeignKey, RuleMode, SubtypeLink, TableRules};
pub use types::*;
