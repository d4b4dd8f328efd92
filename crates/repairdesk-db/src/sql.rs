//! # Statement Building
//!
//! Identifier quoting, value binding, and the three write statements.
//!
//! ```text
//!   identifiers ──► validate_identifier ──► "Quoted"
//!   values      ──► ? placeholders ──► bind_values (never interpolated)
//! ```

use repairdesk_core::coercion::coerce_value;
use repairdesk_core::validation::{validate_identifier, ValidationResult};
use repairdesk_core::{find_column, ColumnDef, Condition, Operator, Record, ValidationError, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::error::DbResult;

/// A runtime-checked SQLite statement.
pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Validates an identifier and wraps it in double quotes.
pub fn quote_ident(name: &str) -> ValidationResult<String> {
    validate_identifier(name)?;
    Ok(format!("\"{name}\""))
}

/// Binds values in placeholder order.
pub(crate) fn bind_values<'q>(mut query: SqliteQuery<'q>, values: &[Value]) -> SqliteQuery<'q> {
    for value in values {
        query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Integer(i) => query.bind(*i),
            Value::Real(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

/// A rendered statement and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub values: Vec<Value>,
}

// =============================================================================
// WHERE
// =============================================================================

/// Renders a condition as `"Col" op ? AND ...`.
///
/// Every predicate column must exist and every value is coerced to the
/// column's declared type. `= NULL` / `!= NULL` become `IS [NOT] NULL`.
pub(crate) fn where_clause(
    table: &str,
    columns: &[ColumnDef],
    condition: &Condition,
) -> DbResult<Statement> {
    if condition.is_empty() {
        return Err(ValidationError::EmptyCondition.into());
    }

    let mut parts = Vec::with_capacity(condition.predicates.len());
    let mut values = Vec::new();

    for predicate in &condition.predicates {
        let column = find_column(columns, &predicate.column).ok_or_else(|| {
            ValidationError::UnknownColumn {
                table: table.to_string(),
                column: predicate.column.clone(),
            }
        })?;
        let ident = quote_ident(&column.name)?;

        match (&predicate.value, predicate.op) {
            (Value::Null, Operator::Eq) => parts.push(format!("{ident} IS NULL")),
            (Value::Null, Operator::Ne) => parts.push(format!("{ident} IS NOT NULL")),
            (value, op) => {
                parts.push(format!("{ident} {} ?", op.as_sql()));
                values.push(coerce_value(column, value)?);
            }
        }
    }

    Ok(Statement {
        sql: parts.join(" AND "),
        values,
    })
}

// =============================================================================
// INSERT / UPDATE / DELETE
// =============================================================================

/// `INSERT INTO "t" (...) VALUES (...)`.
///
/// NULL values are left out so the store's DEFAULT applies.
pub(crate) fn insert_statement(table: &str, record: &Record) -> DbResult<Statement> {
    let table_ident = quote_ident(table)?;
    let mut idents = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len());

    for (column, value) in record.iter().filter(|(_, v)| !v.is_null()) {
        idents.push(quote_ident(column)?);
        values.push(value.clone());
    }

    let sql = if idents.is_empty() {
        format!("INSERT INTO {table_ident} DEFAULT VALUES")
    } else {
        let placeholders = vec!["?"; idents.len()].join(", ");
        format!(
            "INSERT INTO {table_ident} ({}) VALUES ({placeholders})",
            idents.join(", ")
        )
    };

    Ok(Statement { sql, values })
}

/// `UPDATE "t" SET "a" = ?, ... WHERE ...`. SET values come first.
pub(crate) fn update_statement(
    table: &str,
    record: &Record,
    filter: Statement,
) -> DbResult<Statement> {
    let table_ident = quote_ident(table)?;
    let mut assignments = Vec::with_capacity(record.len());
    let mut values = Vec::with_capacity(record.len() + filter.values.len());

    for (column, value) in record {
        assignments.push(format!("{} = ?", quote_ident(column)?));
        values.push(value.clone());
    }
    values.extend(filter.values);

    Ok(Statement {
        sql: format!(
            "UPDATE {table_ident} SET {} WHERE {}",
            assignments.join(", "),
            filter.sql
        ),
        values,
    })
}

/// `DELETE FROM "t" WHERE ...`.
pub(crate) fn delete_statement(table: &str, filter: Statement) -> DbResult<Statement> {
    Ok(Statement {
        sql: format!("DELETE FROM {} WHERE {}", quote_ident(table)?, filter.sql),
        values: filter.values,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
