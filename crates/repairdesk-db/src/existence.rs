//! # Existence Probes
//!
//! Bounded `SELECT 1 ... LIMIT 1` checks used to validate references before
//! a dependent row is written.

use repairdesk_core::Value;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use crate::sql::{bind_values, quote_ident, Statement};

/// True if `table` has a row whose `column` equals `value`.
///
/// NULL never matches and is answered without touching the store.
pub async fn exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    value: &Value,
) -> DbResult<bool> {
    exists_matching(conn, table, &[(column, value.clone())]).await
}

/// True if one row satisfies every `(column, value)` pair.
pub async fn exists_matching(
    conn: &mut SqliteConnection,
    table: &str,
    criteria: &[(&str, Value)],
) -> DbResult<bool> {
    if criteria.is_empty() || criteria.iter().any(|(_, v)| v.is_null()) {
        return Ok(false);
    }

    let mut predicates = Vec::with_capacity(criteria.len());
    for (column, _) in criteria {
        predicates.push(format!("{} = ?", quote_ident(column)?));
    }
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} LIMIT 1",
        quote_ident(table)?,
        predicates.join(" AND ")
    );

    let values: Vec<Value> = criteria.iter().map(|(_, v)| v.clone()).collect();
    let found = bind_values(sqlx::query(&sql), &values)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();

    debug!(table = %table, found, "Existence probe");
    Ok(found)
}

/// True if `child` has a row whose `child_key` points at a `parent` row
/// matched by `filter`.
pub(crate) async fn exists_under(
    conn: &mut SqliteConnection,
    child: &str,
    child_key: &str,
    parent: &str,
    parent_key: &str,
    filter: &Statement,
) -> DbResult<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} IN (SELECT {} FROM {} WHERE {}) LIMIT 1",
        quote_ident(child)?,
        quote_ident(child_key)?,
        quote_ident(parent_key)?,
        quote_ident(parent)?,
        filter.sql
    );

    let found = bind_values(sqlx::query(&sql), &filter.values)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();

    debug!(table = %child, parent = %parent, found, "Dependent probe");
    Ok(found)
}

// =============================================================================
// Unit Tests
// =============================================================================
