//! # Validation Module
//!
//! Field-level validators the per-table rules are assembled from.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Coercion (coercion.rs)                                        │
//! │  └── Values now carry their column's declared type                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Table rules (rules.rs) built from THIS MODULE                 │
//! │  ├── required fields, formats, enumerations, ranges                     │
//! │  └── foreign keys declared, probed by repairdesk-db                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── PRIMARY KEY constraints                                            │
//! │  └── Foreign key constraints (authoritative backstop)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Optional fields: a field that is absent or NULL is "not supplied" and its
//! format/range validators pass. Nothing here substitutes a default.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::rules::RuleMode;
use crate::types::{Record, Value};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// The only accepted date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the field's value if it is present and not NULL.
fn supplied<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

// =============================================================================
// Presence
// =============================================================================

/// Validates that a business-required field carries content.
///
/// ## Rules
/// - Insert: the field must be present, non-NULL, and not blank text
/// - Update: only checked when the field is part of the update set
pub fn require(record: &Record, field: &str, mode: RuleMode) -> ValidationResult<()> {
    let missing = match (record.get(field), mode) {
        (Some(value), _) => value.is_blank(),
        (None, RuleMode::Insert) => true,
        (None, RuleMode::Update) => false,
    };

    if missing {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Format Validators
// =============================================================================

/// Validates an email address when one is given.
///
/// ## Rules
/// - Blank or absent: OK (email is optional)
/// - Otherwise: must contain `@`
pub fn validate_email(record: &Record, field: &str) -> ValidationResult<()> {
    let Some(value) = supplied(record, field) else {
        return Ok(());
    };
    if value.is_blank() {
        return Ok(());
    }

    match value.as_text() {
        Some(email) if email.contains('@') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain '@'".to_string(),
        }),
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Validates a `YYYY-MM-DD` date when one is given.
///
/// ## Example
/// ```rust
/// use repairdesk_core::types::{record, Value};
/// use repairdesk_core::validation::validate_date;
///
/// assert!(validate_date(&record([("SaleDate", Value::from("2025-08-10"))]), "SaleDate").is_ok());
/// assert!(validate_date(&record([("SaleDate", Value::from("10/08/2025"))]), "SaleDate").is_err());
/// ```
pub fn validate_date(record: &Record, field: &str) -> ValidationResult<()> {
    let Some(value) = supplied(record, field) else {
        return Ok(());
    };
    if value.is_blank() {
        return Ok(());
    }

    match value.as_text().and_then(parse_date) {
        Some(_) => Ok(()),
        None => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be in YYYY-MM-DD format".to_string(),
        }),
    }
}

/// Validates enumeration membership (exact, case-sensitive) when a value is given.
pub fn validate_one_of(record: &Record, field: &str, allowed: &[&str]) -> ValidationResult<()> {
    let Some(value) = supplied(record, field) else {
        return Ok(());
    };

    match value.as_text() {
        Some(text) if allowed.contains(&text) => Ok(()),
        _ => Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Numeric view of a supplied field; non-numeric values are an error.
fn number(record: &Record, field: &str) -> ValidationResult<Option<f64>> {
    match supplied(record, field) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| ValidationError::NotANumber {
                field: field.to_string(),
            }),
    }
}

/// Validates a value is > 0 when given.
pub fn validate_positive(record: &Record, field: &str) -> ValidationResult<()> {
    match number(record, field)? {
        Some(n) if n <= 0.0 => Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a value is >= 0 when given.
pub fn validate_non_negative(record: &Record, field: &str) -> ValidationResult<()> {
    match number(record, field)? {
        Some(n) if n < 0.0 => Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validates a value is >= `min` when given.
pub fn validate_at_least(record: &Record, field: &str, min: i64) -> ValidationResult<()> {
    match number(record, field)? {
        Some(n) if n < min as f64 => Err(ValidationError::TooSmall {
            field: field.to_string(),
            min,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a table or column name before it is spliced into SQL.
///
/// ## Rules
/// - ASCII letters, digits and underscores only
/// - Must not start with a digit
/// - At most 64 characters
pub fn validate_identifier(name: &str) -> ValidationResult<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > 64 {
        return Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record;

    #[test]
    fn test_require_by_mode() {
        let rec = record([("Name", Value::from("  ")), ("Contact", Value::from("x"))]);

        assert!(require(&rec, "Contact", RuleMode::Insert).is_ok());
        assert!(require(&rec, "Name", RuleMode::Insert).is_err());
        assert!(require(&rec, "Address", RuleMode::Insert).is_err());

        // Update: absent is fine, present-but-blank is not
        assert!(require(&rec, "Address", RuleMode::Update).is_ok());
        assert!(require(&rec, "Name", RuleMode::Update).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(&record([("Email", Value::from("a@b.com"))]), "Email").is_ok());
        assert!(validate_email(&record([("Email", Value::from(""))]), "Email").is_ok());
        assert!(validate_email(&record::<[(&str, Value); 0], &str>([]), "Email").is_ok());
        assert!(validate_email(&record([("Email", Value::from("nobody"))]), "Email").is_err());
    }

    #[test]
    fn test_validate_date() {
        let ok = record([("D", Value::from("2025-02-28"))]);
        assert!(validate_date(&ok, "D").is_ok());

        for bad in ["2025-02-30", "2025/02/01", "yesterday"] {
            let rec = record([("D", Value::from(bad))]);
            assert!(validate_date(&rec, "D").is_err(), "{bad} should be rejected");
        }

        let numeric = record([("D", Value::Integer(20250801))]);
        assert!(validate_date(&numeric, "D").is_err());
    }

    #[test]
    fn test_validate_one_of_is_exact() {
        let allowed = ["Car", "Computer"];
        assert!(validate_one_of(&record([("T", Value::from("Car"))]), "T", &allowed).is_ok());
        assert!(validate_one_of(&record([("T", Value::from("car"))]), "T", &allowed).is_err());
        assert!(validate_one_of(&record([("T", Value::from("Boat"))]), "T", &allowed).is_err());
        assert!(validate_one_of(&record::<[(&str, Value); 0], &str>([]), "T", &allowed).is_ok());
    }

    #[test]
    fn test_numeric_validators() {
        let rec = record([
            ("Zero", Value::Integer(0)),
            ("Neg", Value::Real(-0.5)),
            ("Pos", Value::Real(50.0)),
            ("Text", Value::from("ten")),
        ]);

        assert!(validate_positive(&rec, "Pos").is_ok());
        assert!(validate_positive(&rec, "Zero").is_err());
        assert!(validate_non_negative(&rec, "Zero").is_ok());
        assert!(validate_non_negative(&rec, "Neg").is_err());
        assert!(validate_positive(&rec, "Absent").is_ok());
        assert_eq!(
            validate_positive(&rec, "Text").unwrap_err(),
            ValidationError::NotANumber {
                field: "Text".to_string()
            }
        );
    }

    #[test]
    fn test_validate_at_least() {
        assert!(validate_at_least(&record([("Year", Value::Integer(1900))]), "Year", 1900).is_ok());
        assert!(validate_at_least(&record([("Year", Value::Integer(1899))]), "Year", 1900).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("RepairItems").is_ok());
        assert!(validate_identifier("_tmp1").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("Parts; DROP TABLE Parts").is_err());
        assert!(validate_identifier("a\"b").is_err());
    }
}
