//! # Result Rows
//!
//! Dynamically typed rows for the raw query path and reports.

use repairdesk_core::{Record, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::error::{DbError, DbResult};

/// One result row: columns in select order, addressable by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Value of the first column with this name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in select order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Converts to a record. Duplicate column names keep the last value.
    pub fn into_record(self) -> Record {
        self.columns.into_iter().zip(self.values).collect()
    }

    /// Decodes a store row using each value's runtime storage class.
    ///
    /// ## Mapping
    /// ```text
    /// NULL    → Value::Null
    /// INTEGER → Value::Integer
    /// REAL    → Value::Real
    /// TEXT    → Value::Text
    /// BLOB    → QueryFailed (no blob columns in this schema)
    /// ```
    pub(crate) fn from_sqlite(row: &SqliteRow) -> DbResult<Self> {
        let mut columns = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());

        for column in row.columns() {
            let index = column.ordinal();
            columns.push(column.name().to_string());
            values.push(decode_value(row, index, column.name())?);
        }

        Ok(Row { columns, values })
    }
}

fn decode_value(row: &SqliteRow, index: usize, name: &str) -> DbResult<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let storage_class = raw.type_info().name().to_string();
    match storage_class.as_str() {
        "INTEGER" => Ok(Value::Integer(row.try_get_unchecked::<i64, _>(index)?)),
        "REAL" => Ok(Value::Real(row.try_get_unchecked::<f64, _>(index)?)),
        "TEXT" => Ok(Value::Text(row.try_get_unchecked::<String, _>(index)?)),
        other => Err(DbError::QueryFailed(format!(
            "column {name} has unsupported storage class {other}"
        ))),
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl From<Vec<(String, Value)>> for Row {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        let (columns, values) = pairs.into_iter().unzip();
        Row { columns, values }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_decodes_storage_classes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let row = sqlx::query("SELECT 1 AS a, 2.5 AS b, 'x' AS c, NULL AS d")
            .fetch_one(db.pool())
            .await
            .unwrap();

        let row = Row::from_sqlite(&row).unwrap();
        assert_eq!(row.columns(), ["a", "b", "c", "d"]);
        assert_eq!(row.get("a"), Some(&Value::Integer(1)));
        assert_eq!(row.get("b"), Some(&Value::Real(2.5)));
        assert_eq!(row.get("c"), Some(&Value::Text("x".to_string())));
        assert_eq!(row.get("d"), Some(&Value::Null));
        assert_eq!(row.get("e"), None);
    }

    #[tokio::test]
    async fn test_blob_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let row = sqlx::query("SELECT x'00ff' AS payload")
            .fetch_one(db.pool())
            .await
            .unwrap();

        let err = Row::from_sqlite(&row).unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }

    #[test]
    fn test_serializes_as_object() {
        let row = Row::from(vec![
            ("PartID".to_string(), Value::Integer(1)),
            ("Name".to_string(), Value::from("Brake pad")),
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"PartID":1,"Name":"Brake pad"}"#);
    }
}
