//! # Database Error Types
//!
//! Error types for database operations and validated writes.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Stage reached        Failure                    DbError               │
//! │  ─────────────        ───────                    ───────               │
//! │  Received             table unknown          →   SchemaNotFound        │
//! │  Coerced              "abc" in INTEGER col   →   TypeCoercion          │
//! │  Validated            business rule          →   Validation            │
//! │  Validated            parent row missing     →   ForeignKeyNotFound    │
//! │  Applied (delete)     dependents exist       →   DependencyViolation   │
//! │  Applied              store constraint       →   ConstraintViolation   │
//! │                                                                         │
//! │  The caller receives exactly one of these; nothing has been written.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use repairdesk_core::{CoercionError, ConditionError, ValidationError, Value};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The table does not exist in the store.
    #[error("Table not found: {table}")]
    SchemaNotFound { table: String },

    /// A value could not be parsed as its column's declared type.
    #[error("Type coercion failed: {0}")]
    TypeCoercion(#[from] CoercionError),

    /// A business rule rejected the record.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Update/delete condition text could not be parsed.
    #[error("Invalid condition: {0}")]
    InvalidCondition(#[from] ConditionError),

    /// A referenced parent row does not exist.
    ///
    /// ## When This Occurs
    /// - PartSuppliers.PartID pointing at a deleted or never-created part
    /// - Sales.CustomerID for an unknown customer
    #[error("{column} {value} does not exist in {table}")]
    ForeignKeyNotFound {
        table: String,
        column: String,
        value: String,
    },

    /// Delete refused because other rows still reference the target.
    #[error("Cannot delete from {table}: dependent records exist")]
    DependencyViolation { table: String },

    /// The store rejected a statement that passed the engine's checks.
    ///
    /// ## When This Occurs
    /// - Duplicate composite key on a junction table
    /// - A parent deleted by another session between probe and write
    /// - NOT NULL column left out of an insert
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The write did not finish within the configured time.
    #[error("Write timed out after {0:?}")]
    Timeout(Duration),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a ForeignKeyNotFound error.
    pub fn foreign_key(table: impl Into<String>, column: impl Into<String>, value: &Value) -> Self {
        DbError::ForeignKeyNotFound {
            table: table.into(),
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Machine-readable error code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            DbError::SchemaNotFound { .. } => "SCHEMA_NOT_FOUND",
            DbError::TypeCoercion(_) => "TYPE_COERCION_ERROR",
            DbError::Validation(_) | DbError::InvalidCondition(_) => "VALIDATION_ERROR",
            DbError::ForeignKeyNotFound { .. } => "FOREIGN_KEY_NOT_FOUND",
            DbError::DependencyViolation { .. } => "DEPENDENCY_VIOLATION",
            DbError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            DbError::Timeout(_) => "TIMEOUT",
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => "DATABASE_ERROR",
        }
    }

    /// True for a store-level foreign-key refusal.
    pub(crate) fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::ConstraintViolation { message } if message.contains("FOREIGN KEY"))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                //   "FOREIGN KEY constraint failed"
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "NOT NULL constraint failed: <table>.<column>"
                //   "CHECK constraint failed: <name>"
                if msg.contains("constraint failed") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_message() {
        let err = DbError::foreign_key("Parts", "PartID", &Value::Integer(99));
        assert_eq!(err.to_string(), "PartID 99 does not exist in Parts");
        assert_eq!(err.code(), "FOREIGN_KEY_NOT_FOUND");
    }

    #[test]
    fn test_validation_wraps_reason() {
        let err: DbError = ValidationError::Required {
            field: "Name".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Validation failed: Name is required");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_foreign_key_violation_detection() {
        let fk = DbError::ConstraintViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        };
        let unique = DbError::ConstraintViolation {
            message: "UNIQUE constraint failed: SoldItems.SaleID, SoldItems.ProductID".to_string(),
        };
        assert!(fk.is_foreign_key_violation());
        assert!(!unique.is_foreign_key_violation());
    }
}
