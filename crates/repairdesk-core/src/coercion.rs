//! # Type Coercion
//!
//! Converts loosely-typed input into the declared type of each column.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw Record ("StockQTY" → "12")                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  coerce_record(columns, raw) ← THIS MODULE                              │
//! │       │                                                                 │
//! │       ├── INTEGER column → parse i64   ("12"   → 12)                    │
//! │       ├── REAL column    → parse f64   ("49.5" → 49.5)                  │
//! │       └── TEXT column    → stringify   (7      → "7")                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  typed Record → table rules (numeric and date checks see real types)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Columns missing from the input stay missing: defaults belong to the store.
//! NULL stays NULL. Keys that name no known column pass through untouched.

use crate::error::CoercionError;
use crate::types::{find_column, ColumnDef, DeclaredType, Record, Value};

/// Result type for coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Coerces every known, non-NULL column of `raw` to its declared type.
///
/// Returns a new record with the same keys.
///
/// ## Example
/// ```rust
/// use repairdesk_core::coercion::coerce_record;
/// use repairdesk_core::types::{record, ColumnDef, DeclaredType, Value};
///
/// let columns = vec![ColumnDef {
///     name: "StockQTY".into(),
///     declared_type: DeclaredType::Integer,
///     required: true,
///     default_value: Some("0".into()),
///     is_primary_key: false,
/// }];
/// let typed = coerce_record(&columns, &record([("StockQTY", Value::from("12"))])).unwrap();
/// assert_eq!(typed["StockQTY"], Value::Integer(12));
/// ```
pub fn coerce_record(columns: &[ColumnDef], raw: &Record) -> CoercionResult<Record> {
    raw.iter()
        .map(|(name, value)| {
            let coerced = match find_column(columns, name) {
                Some(column) => coerce_value(column, value)?,
                None => value.clone(),
            };
            Ok((name.clone(), coerced))
        })
        .collect()
}

/// `i64::MIN` is exact as f64; `i64::MAX as f64` rounds up to 2^63, so the
/// upper bound is exclusive.
const I64_MIN_F: f64 = i64::MIN as f64;
const I64_MAX_F: f64 = i64::MAX as f64;

/// Coerces a single value to the column's declared type.
pub fn coerce_value(column: &ColumnDef, value: &Value) -> CoercionResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let fail = || CoercionError {
        column: column.name.clone(),
        expected: column.declared_type,
    };

    match column.declared_type {
        DeclaredType::Integer => match value {
            Value::Integer(i) => Ok(Value::Integer(*i)),
            // Whole floats inside i64 range are accepted; 2.5 is not an integer.
            Value::Real(f) if f.fract() == 0.0 && (I64_MIN_F..I64_MAX_F).contains(f) => {
                Ok(Value::Integer(*f as i64))
            }
            Value::Text(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| fail()),
            _ => Err(fail()),
        },
        DeclaredType::Real => match value {
            Value::Integer(i) => Ok(Value::Real(*i as f64)),
            Value::Real(f) => Ok(Value::Real(*f)),
            Value::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Real(f)),
                _ => Err(fail()),
            },
            _ => Err(fail()),
        },
        DeclaredType::Text => Ok(match value {
            Value::Text(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record;

    fn col(name: &str, declared_type: DeclaredType) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            declared_type,
            required: false,
            default_value: None,
            is_primary_key: false,
        }
    }

    fn parts_columns() -> Vec<ColumnDef> {
        vec![
            col("PartID", DeclaredType::Integer),
            col("Name", DeclaredType::Text),
            col("StockQTY", DeclaredType::Integer),
            col("Price", DeclaredType::Real),
        ]
    }

    #[test]
    fn test_coerces_each_declared_type() {
        let raw = record([
            ("Name", Value::Integer(42)),
            ("StockQTY", Value::from(" 12 ")),
            ("Price", Value::from("49.5")),
        ]);
        let typed = coerce_record(&parts_columns(), &raw).unwrap();

        assert_eq!(typed["Name"], Value::from("42"));
        assert_eq!(typed["StockQTY"], Value::Integer(12));
        assert_eq!(typed["Price"], Value::Real(49.5));
    }

    #[test]
    fn test_malformed_integer_names_column() {
        let raw = record([("StockQTY", Value::from("twelve"))]);
        let err = coerce_record(&parts_columns(), &raw).unwrap_err();
        assert_eq!(err.to_string(), "StockQTY must be of type INTEGER");
    }

    #[test]
    fn test_malformed_real_names_column() {
        let raw = record([("Price", Value::from("cheap"))]);
        let err = coerce_record(&parts_columns(), &raw).unwrap_err();
        assert_eq!(err.to_string(), "Price must be of type REAL");

        let raw = record([("Price", Value::from("inf"))]);
        assert!(coerce_record(&parts_columns(), &raw).is_err());
    }

    #[test]
    fn test_blank_text_is_not_a_number() {
        let raw = record([("StockQTY", Value::from(""))]);
        assert!(coerce_record(&parts_columns(), &raw).is_err());
    }

    #[test]
    fn test_integer_column_accepts_whole_floats_only() {
        let c = col("Year", DeclaredType::Integer);
        assert_eq!(coerce_value(&c, &Value::Real(2004.0)).unwrap(), Value::Integer(2004));
        assert!(coerce_value(&c, &Value::Real(2004.5)).is_err());
    }

    #[test]
    fn test_integer_column_rejects_out_of_range_floats() {
        let c = col("StockQTY", DeclaredType::Integer);
        assert!(coerce_value(&c, &Value::Real(1e20)).is_err());
        assert!(coerce_value(&c, &Value::Real(-1e20)).is_err());
        assert!(coerce_value(&c, &Value::Real(9_223_372_036_854_775_807.0)).is_err());
        assert!(coerce_value(&c, &Value::Real(f64::INFINITY)).is_err());
        assert!(coerce_value(&c, &Value::Real(f64::NAN)).is_err());
        assert_eq!(
            coerce_value(&c, &Value::Real(-9_223_372_036_854_775_808.0)).unwrap(),
            Value::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_null_and_unknown_columns_pass_through() {
        let raw = record([
            ("StockQTY", Value::Null),
            ("Mystery", Value::from("kept")),
        ]);
        let typed = coerce_record(&parts_columns(), &raw).unwrap();
        assert_eq!(typed["StockQTY"], Value::Null);
        assert_eq!(typed["Mystery"], Value::from("kept"));
    }

    #[test]
    fn test_absent_columns_are_not_defaulted() {
        let raw = record([("Name", Value::from("Bolt"))]);
        let typed = coerce_record(&parts_columns(), &raw).unwrap();
        assert_eq!(typed.len(), 1);
        assert!(!typed.contains_key("StockQTY"));
    }
}
