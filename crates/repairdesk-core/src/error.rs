//! # Error Types
//!
//! Domain-specific error types for repairdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  repairdesk-core errors (this file)                                     │
//! │  ├── CoercionError    - Value does not parse as its column type         │
//! │  ├── ValidationError  - Business rule failures                          │
//! │  ├── ConditionError   - Malformed WHERE text                            │
//! │  └── CoreError        - Any of the above                                │
//! │                                                                         │
//! │  repairdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Store failures + the engine taxonomy            │
//! │                                                                         │
//! │  Flow: CoercionError / ValidationError → DbError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::DeclaredType;

// =============================================================================
// Core Error
// =============================================================================

/// Any failure raised by the pure layer.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Condition(#[from] ConditionError),
}

// =============================================================================
// Coercion Error
// =============================================================================

/// A raw value could not be converted to its column's declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{column} must be of type {expected}")]
pub struct CoercionError {
    pub column: String,
    pub expected: DeclaredType,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Business-rule violations.
///
/// Every variant names the offending field so the caller can show it next to
/// the input that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required business field is missing, NULL, or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g. email without `@`, malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Value must be > 0.
    #[error("{field} must be > 0")]
    MustBePositive { field: String },

    /// Value must be >= 0.
    #[error("{field} must be >= 0")]
    MustBeNonNegative { field: String },

    /// Value is below an inclusive lower bound.
    #[error("{field} must be >= {min}")]
    TooSmall { field: String, min: i64 },

    /// A numeric rule was applied to a non-numeric value.
    #[error("{field} must be a number")]
    NotANumber { field: String },

    /// Cross-field date ordering.
    #[error("{later} cannot be before {earlier}")]
    DateOrder { earlier: String, later: String },

    /// A subtype row points at a parent of the wrong kind.
    #[error("{key} {value} is not a {expected} repair item")]
    SubtypeMismatch {
        key: String,
        value: String,
        expected: String,
    },

    /// A parent's kind can't change while subtype rows depend on the old kind.
    #[error("{field} cannot change: {table} rows require {expected}")]
    SubtypeInUse {
        field: String,
        table: String,
        expected: String,
    },

    /// The record names a column the table does not have.
    #[error("{table} has no column named {column}")]
    UnknownColumn { table: String, column: String },

    /// The caller tried to supply a key the store assigns.
    #[error("{column} is assigned by the database and cannot be supplied")]
    ServerAssignedKey { column: String },

    /// Insert with no columns at all.
    #[error("no values supplied for {table}")]
    EmptyRecord { table: String },

    /// Update/delete without a condition would touch every row.
    #[error("a condition is required")]
    EmptyCondition,

    /// A table or column name that cannot be used as a SQL identifier.
    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },
}

// =============================================================================
// Condition Error
// =============================================================================

/// Malformed condition text such as `"ItemID 1"`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("missing comparison operator in '{0}'")]
    MissingOperator(String),

    #[error("missing column name in '{0}'")]
    EmptyColumn(String),

    #[error("missing value in '{0}'")]
    EmptyValue(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_message() {
        let err = CoercionError {
            column: "StockQTY".to_string(),
            expected: DeclaredType::Integer,
        };
        assert_eq!(err.to_string(), "StockQTY must be of type INTEGER");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Name".to_string(),
        };
        assert_eq!(err.to_string(), "Name is required");

        let err = ValidationError::DateOrder {
            earlier: "DateReceived".to_string(),
            later: "DateCompleted".to_string(),
        };
        assert_eq!(err.to_string(), "DateCompleted cannot be before DateReceived");

        let err = ValidationError::NotAllowed {
            field: "RepairType".to_string(),
            allowed: vec!["Car".to_string(), "Computer".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"RepairType must be one of: ["Car", "Computer"]"#
        );

        let err = ValidationError::SubtypeInUse {
            field: "RepairType".to_string(),
            table: "CarDetails".to_string(),
            expected: "Car".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "RepairType cannot change: CarDetails rows require Car"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyCondition.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
