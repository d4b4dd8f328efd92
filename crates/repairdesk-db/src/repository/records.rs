//! # Record Repository
//!
//! Validated writes and plain reads over any table.
//!
//! ## Write Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    insert / update / delete                             │
//! │                                                                         │
//! │  BEGIN IMMEDIATE ────────────────────────────────────────────┐          │
//! │    │                                                         │          │
//! │    ▼  Received   resolve table, introspect columns           │  one     │
//! │    ▼             reject unknown / server-assigned columns    │  store   │
//! │    ▼  Coerced    coerce_record (TEXT → INTEGER/REAL)         │  tx      │
//! │    ▼  Validated  rules + existence probes (same tx)          │          │
//! │    ▼  Applied    parameterized statement                     │          │
//! │    ▼  Committed  COMMIT                                      │          │
//! │  ────────────────────────────────────────────────────────────┘          │
//! │                                                                         │
//! │  Any failure drops the transaction (rollback): nothing is written.      │
//! │  foreign_keys = ON is the backstop if a parent vanishes concurrently.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads (`query`, `find`, `list`, `count`, `get`) skip validation.

use std::fmt;
use std::future::Future;

use repairdesk_core::coercion::coerce_record;
use repairdesk_core::validation::validate_identifier;
use repairdesk_core::{find_column, ColumnDef, Condition, Record, RuleMode, Table, ValidationError, Value};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Connection, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::WriteSettings;
use crate::row::Row;
use crate::schema;
use crate::sql::{
    bind_values, delete_statement, insert_statement, quote_ident, update_statement, where_clause,
};
use crate::validator::{check_kind_change, validate};

// =============================================================================
// Outcome Types
// =============================================================================

/// Progress of one write; the last stage reached decides the error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteStage {
    Received,
    Coerced,
    Validated,
    Applied,
    Committed,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteStage::Received => "received",
            WriteStage::Coerced => "coerced",
            WriteStage::Validated => "validated",
            WriteStage::Applied => "applied",
            WriteStage::Committed => "committed",
        };
        f.write_str(s)
    }
}

/// Result of [`RecordRepository::create_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateOutcome {
    Created,
    Replaced,
    /// The table was already there and `replace` was false; its data is untouched.
    AlreadyExists,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for validated record writes and untyped reads.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
    settings: WriteSettings,
}

impl RecordRepository {
    /// Creates a new RecordRepository.
    pub fn new(pool: SqlitePool, settings: WriteSettings) -> Self {
        RecordRepository { pool, settings }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Inserts one record and returns the new row id.
    ///
    /// ## Errors
    /// - `SchemaNotFound`: unknown table
    /// - `Validation`: empty record, unknown column, server-assigned key,
    ///   or a business rule
    /// - `TypeCoercion`: a value doesn't parse as its column type
    /// - `ForeignKeyNotFound`: a referenced parent row is missing
    /// - `ConstraintViolation`: the store refused the row
    ///
    /// ## Example
    /// ```rust,ignore
    /// let id = db.records().insert("Parts", &record([
    ///     ("Name", Value::from("Brake pad")),
    ///     ("StockQTY", Value::from("12")),
    /// ])).await?;
    /// ```
    pub async fn insert(&self, table: &str, raw: &Record) -> DbResult<i64> {
        self.bounded(self.insert_in_tx(table, raw))
            .await
            .inspect_err(|e| warn!(table = %table, code = e.code(), error = %e, "Insert rejected"))
    }

    /// Updates every row matching `condition` and returns the affected count.
    ///
    /// Only the columns in `updates` are validated (see [`RuleMode::Update`]).
    pub async fn update(&self, table: &str, updates: &Record, condition: &Condition) -> DbResult<u64> {
        self.bounded(self.update_in_tx(table, updates, condition))
            .await
            .inspect_err(|e| warn!(table = %table, code = e.code(), error = %e, "Update rejected"))
    }

    /// Deletes every row matching `condition` and returns the affected count.
    ///
    /// ## Errors
    /// - `DependencyViolation`: other rows still reference a target row
    pub async fn delete(&self, table: &str, condition: &Condition) -> DbResult<u64> {
        self.bounded(self.delete_in_tx(table, condition))
            .await
            .inspect_err(|e| warn!(table = %table, code = e.code(), error = %e, "Delete rejected"))
    }

    /// Creates a table from `(column, definition)` pairs.
    ///
    /// Column names are validated; definitions are taken as DDL as given.
    /// With `replace = false` an existing table is left as it is.
    pub async fn create_table(
        &self,
        name: &str,
        columns: &[(String, String)],
        replace: bool,
    ) -> DbResult<CreateOutcome> {
        validate_identifier(name)?;
        if columns.is_empty() {
            return Err(ValidationError::EmptyRecord {
                table: name.to_string(),
            }
            .into());
        }

        let mut definitions = Vec::with_capacity(columns.len());
        for (column, definition) in columns {
            if definition.contains(';') {
                return Err(ValidationError::InvalidFormat {
                    field: column.clone(),
                    reason: "column definition must be a single clause".to_string(),
                }
                .into());
            }
            definitions.push(format!("{} {}", quote_ident(column)?, definition.trim()));
        }

        let mut tx = self.begin_write().await?;
        let existed = schema::table_exists(&mut *tx, name).await?;

        if existed && !replace {
            info!(table = %name, "Table already exists");
            return Ok(CreateOutcome::AlreadyExists);
        }

        let table_ident = quote_ident(name)?;
        if existed {
            sqlx::query(&format!("DROP TABLE {table_ident}"))
                .execute(&mut *tx)
                .await
                .map_err(|e| dependency_or(name, e.into()))?;
        }

        sqlx::query(&format!(
            "CREATE TABLE {table_ident} ({})",
            definitions.join(", ")
        ))
        .execute(&mut *tx)
        .await?;

        commit(tx).await?;

        let outcome = if existed {
            CreateOutcome::Replaced
        } else {
            CreateOutcome::Created
        };
        info!(table = %name, outcome = ?outcome, "Table created");
        Ok(outcome)
    }

    async fn insert_in_tx(&self, table: &str, raw: &Record) -> DbResult<i64> {
        debug!(table = %table, stage = %WriteStage::Received, fields = raw.len(), "Insert");
        let mut tx = self.begin_write().await?;

        let table = schema::resolve_table(&mut *tx, table).await?;
        let columns = schema::columns(&mut *tx, &table).await?;

        if raw.is_empty() {
            return Err(ValidationError::EmptyRecord { table }.into());
        }
        check_known_columns(&table, &columns, raw)?;
        check_server_assigned(&table, raw)?;

        let record = coerce_record(&columns, raw)?;
        debug!(table = %table, stage = %WriteStage::Coerced, "Insert");

        validate(
            &mut *tx,
            &table,
            &record,
            RuleMode::Insert,
            self.settings.enforce_subtype_match,
        )
        .await?;
        debug!(table = %table, stage = %WriteStage::Validated, "Insert");

        let stmt = insert_statement(&table, &record)?;
        let id = bind_values(sqlx::query(&stmt.sql), &stmt.values)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        debug!(table = %table, stage = %WriteStage::Applied, id, "Insert");

        commit(tx).await?;
        info!(table = %table, id, stage = %WriteStage::Committed, "Record inserted");
        Ok(id)
    }

    async fn update_in_tx(&self, table: &str, updates: &Record, condition: &Condition) -> DbResult<u64> {
        debug!(table = %table, stage = %WriteStage::Received, condition = %condition, "Update");
        let mut tx = self.begin_write().await?;

        let table = schema::resolve_table(&mut *tx, table).await?;
        let columns = schema::columns(&mut *tx, &table).await?;

        if updates.is_empty() {
            return Err(ValidationError::EmptyRecord { table }.into());
        }
        check_known_columns(&table, &columns, updates)?;
        check_server_assigned(&table, updates)?;
        let filter = where_clause(&table, &columns, condition)?;

        let record = coerce_record(&columns, updates)?;
        debug!(table = %table, stage = %WriteStage::Coerced, "Update");

        validate(
            &mut *tx,
            &table,
            &record,
            RuleMode::Update,
            self.settings.enforce_subtype_match,
        )
        .await?;
        if self.settings.enforce_subtype_match {
            check_kind_change(&mut *tx, &table, &record, &filter).await?;
        }
        debug!(table = %table, stage = %WriteStage::Validated, "Update");

        let stmt = update_statement(&table, &record, filter)?;
        let rows = bind_values(sqlx::query(&stmt.sql), &stmt.values)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!(table = %table, stage = %WriteStage::Applied, rows, "Update");

        commit(tx).await?;
        info!(table = %table, rows, stage = %WriteStage::Committed, "Records updated");
        Ok(rows)
    }

    async fn delete_in_tx(&self, table: &str, condition: &Condition) -> DbResult<u64> {
        debug!(table = %table, stage = %WriteStage::Received, condition = %condition, "Delete");
        let mut tx = self.begin_write().await?;

        let table = schema::resolve_table(&mut *tx, table).await?;
        let columns = schema::columns(&mut *tx, &table).await?;
        let filter = where_clause(&table, &columns, condition)?;
        debug!(table = %table, stage = %WriteStage::Validated, "Delete");

        let stmt = delete_statement(&table, filter)?;
        let rows = bind_values(sqlx::query(&stmt.sql), &stmt.values)
            .execute(&mut *tx)
            .await
            .map_err(|e| dependency_or(&table, e.into()))?
            .rows_affected();
        debug!(table = %table, stage = %WriteStage::Applied, rows, "Delete");

        commit(tx).await?;
        info!(table = %table, rows, stage = %WriteStage::Committed, "Records deleted");
        Ok(rows)
    }

    /// Opens a write transaction holding the store's write lock from the start,
    /// so probes and the mutation see one snapshot and the busy timeout applies.
    async fn begin_write(&self) -> DbResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Applies the configured write timeout. A timed-out write is dropped
    /// with its transaction, which rolls it back.
    async fn bounded<T, F>(&self, write: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        match self.settings.write_timeout {
            Some(limit) => tokio::time::timeout(limit, write)
                .await
                .map_err(|_| DbError::Timeout(limit))?,
            None => write.await,
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Runs a caller-supplied statement with bound parameters.
    ///
    /// The connection is switched to `query_only` and the statement runs in a
    /// transaction that is always rolled back, so this path can't write.
    pub async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        debug!(params = params.len(), "Running query");
        if sql.to_ascii_lowercase().contains("query_only") {
            return Err(ValidationError::InvalidFormat {
                field: "sql".to_string(),
                reason: "query may not change query_only".to_string(),
            }
            .into());
        }

        let mut conn = self.pool.acquire().await?;
        sqlx::query("PRAGMA query_only = ON").execute(&mut *conn).await?;
        let result = fetch_rolled_back(&mut conn, sql, params).await;
        sqlx::query("PRAGMA query_only = OFF").execute(&mut *conn).await?;

        let rows = result?
            .iter()
            .map(Row::from_sqlite)
            .collect::<DbResult<Vec<_>>>()?;
        debug!(rows = rows.len(), "Query returned rows");
        Ok(rows)
    }

    /// Rows matching `condition`; an empty condition returns every row.
    pub async fn find(&self, table: &str, condition: &Condition) -> DbResult<Vec<Row>> {
        let mut conn = self.pool.acquire().await?;
        let table = schema::resolve_table(&mut conn, table).await?;

        let (sql, values) = if condition.is_empty() {
            (format!("SELECT * FROM {}", quote_ident(&table)?), Vec::new())
        } else {
            let columns = schema::columns(&mut conn, &table).await?;
            let filter = where_clause(&table, &columns, condition)?;
            (
                format!("SELECT * FROM {} WHERE {}", quote_ident(&table)?, filter.sql),
                filter.values,
            )
        };

        let rows = bind_values(sqlx::query(&sql), &values)
            .fetch_all(&mut *conn)
            .await?;
        rows.iter().map(Row::from_sqlite).collect()
    }

    /// Every row of a table.
    pub async fn list(&self, table: &str) -> DbResult<Vec<Row>> {
        self.find(table, &Condition::default()).await
    }

    /// Number of rows in a table.
    pub async fn count(&self, table: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let table = schema::resolve_table(&mut conn, table).await?;

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(&table)?))
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// One row by its single-column primary key.
    ///
    /// Junction tables have composite keys; use [`find`](Self::find) for those.
    pub async fn get(&self, table: &str, key: impl Into<Value>) -> DbResult<Option<Row>> {
        let key = key.into();
        let columns = {
            let mut conn = self.pool.acquire().await?;
            let resolved = schema::resolve_table(&mut conn, table).await?;
            schema::columns(&mut conn, &resolved).await?
        };

        let mut keys = columns.iter().filter(|c| c.is_primary_key);
        let (Some(pk), None) = (keys.next(), keys.next()) else {
            return Err(ValidationError::InvalidFormat {
                field: table.to_string(),
                reason: "lookup by key needs a single-column primary key".to_string(),
            }
            .into());
        };

        let rows = self.find(table, &Condition::eq(pk.name.clone(), key)).await?;
        Ok(rows.into_iter().next())
    }

    /// User tables in the store.
    pub async fn list_tables(&self) -> DbResult<Vec<String>> {
        let mut conn = self.pool.acquire().await?;
        schema::list_tables(&mut conn).await
    }

    /// Column descriptors for a table.
    pub async fn columns(&self, table: &str) -> DbResult<Vec<ColumnDef>> {
        let mut conn = self.pool.acquire().await?;
        let table = schema::resolve_table(&mut conn, table).await?;
        schema::columns(&mut conn, &table).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn check_known_columns(table: &str, columns: &[ColumnDef], record: &Record) -> DbResult<()> {
    match record.keys().find(|key| find_column(columns, key).is_none()) {
        Some(column) => Err(ValidationError::UnknownColumn {
            table: table.to_string(),
            column: column.clone(),
        }
        .into()),
        None => Ok(()),
    }
}

fn check_server_assigned(table: &str, record: &Record) -> DbResult<()> {
    match Table::from_name(table).and_then(|t| t.server_assigned_key()) {
        Some(key) if record.contains_key(key) => Err(ValidationError::ServerAssignedKey {
            column: key.to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

/// A store-level foreign-key refusal while removing rows means dependents exist.
fn dependency_or(table: &str, err: DbError) -> DbError {
    if err.is_foreign_key_violation() {
        DbError::DependencyViolation {
            table: table.to_string(),
        }
    } else {
        err
    }
}

async fn fetch_rolled_back(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<SqliteRow>> {
    let mut tx = conn.begin().await?;
    let rows = bind_values(sqlx::query(sql), params)
        .fetch_all(&mut *tx)
        .await?;
    tx.rollback()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(rows)
}

async fn commit(tx: Transaction<'_, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
