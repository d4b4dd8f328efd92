//! # Schema Introspection
//!
//! Reads table and column metadata from the store.
//!
//! ```text
//!   resolve_table("parts") ──► sqlite_master ──► "Parts"   (canonical name)
//!   columns("Parts")       ──► pragma_table_info ──► Vec<ColumnDef>
//! ```
//!
//! Everything here takes `&mut SqliteConnection` so it can run on the same
//! transaction as the write it serves.

use repairdesk_core::{ColumnDef, DeclaredType};
use sqlx::{Row as _, SqliteConnection};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Returns the stored spelling of a table name (lookup is case-insensitive,
/// like SQLite itself).
///
/// ## Errors
/// `SchemaNotFound` when no such user table exists.
pub async fn resolve_table(conn: &mut SqliteConnection, table: &str) -> DbResult<String> {
    let name: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
    )
    .bind(table)
    .fetch_optional(&mut *conn)
    .await?;

    name.ok_or_else(|| DbError::SchemaNotFound {
        table: table.to_string(),
    })
}

/// True if a table with this name exists.
pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> DbResult<bool> {
    match resolve_table(conn, table).await {
        Ok(_) => Ok(true),
        Err(DbError::SchemaNotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Column descriptors in declaration order.
///
/// ## Mapping
/// ```text
/// type       → DeclaredType::from_declaration (INTEGER… / REAL… / else TEXT)
/// notnull    → required
/// dflt_value → default_value (expression text)
/// pk > 0     → is_primary_key (composite keys number their columns 1..n)
/// ```
pub async fn columns(conn: &mut SqliteConnection, table: &str) -> DbResult<Vec<ColumnDef>> {
    let rows = sqlx::query(
        r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    if rows.is_empty() {
        return Err(DbError::SchemaNotFound {
            table: table.to_string(),
        });
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let declared: String = row.try_get("type")?;
        let not_null: i64 = row.try_get("notnull")?;
        let pk: i64 = row.try_get("pk")?;

        columns.push(ColumnDef {
            name: row.try_get("name")?,
            declared_type: DeclaredType::from_declaration(&declared),
            required: not_null != 0,
            default_value: row.try_get("dflt_value")?,
            is_primary_key: pk > 0,
        });
    }

    debug!(table = %table, columns = columns.len(), "Introspected table");
    Ok(columns)
}

/// User tables, sorted by name. Store-internal and migration bookkeeping
/// tables are excluded.
pub async fn list_tables(conn: &mut SqliteConnection) -> DbResult<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
          AND name NOT LIKE '\_sqlx\_%' ESCAPE '\'
        ORDER BY name
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(names)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use repairdesk_core::{find_column, Table};

    #[tokio::test]
    async fn test_columns_for_parts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let cols = columns(&mut conn, "Parts").await.unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["PartID", "Name", "Description", "StockQTY"]);

        let id = find_column(&cols, "PartID").unwrap();
        assert!(id.is_primary_key);
        assert_eq!(id.declared_type, DeclaredType::Integer);

        let stock = find_column(&cols, "StockQTY").unwrap();
        assert!(stock.required);
        assert_eq!(stock.default_value.as_deref(), Some("0"));

        let name = find_column(&cols, "Name").unwrap();
        assert_eq!(name.declared_type, DeclaredType::Text);
    }

    #[tokio::test]
    async fn test_date_and_real_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let cols = columns(&mut conn, "RepairJobs").await.unwrap();
        assert_eq!(
            find_column(&cols, "DateReceived").unwrap().declared_type,
            DeclaredType::Text
        );
        assert_eq!(
            find_column(&cols, "Price").unwrap().declared_type,
            DeclaredType::Real
        );
    }

    #[tokio::test]
    async fn test_composite_key_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let cols = columns(&mut conn, "SoldItems").await.unwrap();
        let keys: Vec<&str> = cols
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(keys, ["SaleID", "ProductID"]);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let err = columns(&mut conn, "Boats").await.unwrap_err();
        assert!(matches!(err, DbError::SchemaNotFound { .. }));
        assert!(!table_exists(&mut conn, "Boats").await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(resolve_table(&mut conn, "parts").await.unwrap(), "Parts");
    }

    #[tokio::test]
    async fn test_list_tables_excludes_bookkeeping() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let tables = list_tables(&mut conn).await.unwrap();
        assert_eq!(tables.len(), Table::ALL.len());
        for table in Table::ALL {
            assert!(tables.iter().any(|t| t == table.name()));
        }
        assert!(!tables.iter().any(|t| t.starts_with("_sqlx")));
    }
}
