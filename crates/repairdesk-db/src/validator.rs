//! # Table Rule Validator
//!
//! Runs a table's rules against a coerced record, probing the store for
//! every reference the record makes.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. required fields     ┐                                               │
//! │  2. format / enums      ├─ repairdesk_core::rules::check_local (pure)   │
//! │  3. numeric ranges      ┘                                               │
//! │  4. foreign keys        ── existence::exists, one probe per reference   │
//! │  5. cross-field         ── rules.check_cross_fields                     │
//! │  6. subtype parent kind ── existence::exists_matching (if enabled)      │
//! │  7. parent kind change  ── check_kind_change, updates only (if enabled) │
//! │                                                                         │
//! │  First failure wins. Unknown tables have no rules and always pass.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use repairdesk_core::rules::{check_local, rules_for, rules_for_name};
use repairdesk_core::{Record, RuleMode, Table, ValidationError, Value};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::existence::{exists, exists_matching, exists_under};
use crate::sql::Statement;

/// Validates `record` for a write to `table`.
///
/// In [`RuleMode::Update`] only the columns present in `record` are checked
/// and only present reference columns are probed.
pub async fn validate(
    conn: &mut SqliteConnection,
    table: &str,
    record: &Record,
    mode: RuleMode,
    enforce_subtype_match: bool,
) -> DbResult<()> {
    let Some(rules) = rules_for_name(table) else {
        debug!(table = %table, "No rules for table");
        return Ok(());
    };

    check_local(rules, record, mode)?;

    for fk in rules.foreign_keys() {
        let Some(value) = record.get(fk.column) else {
            continue;
        };
        let parent = fk.references.name();
        if !exists(conn, parent, fk.referenced_column, value).await? {
            return Err(DbError::foreign_key(parent, fk.column, value));
        }
    }

    rules.check_cross_fields(record, mode)?;

    if enforce_subtype_match {
        if let Some(link) = rules.subtype() {
            if let Some(key) = record.get(link.key) {
                let criteria = [
                    (link.parent_key, key.clone()),
                    (link.discriminator, Value::from(link.expected)),
                ];
                if !exists_matching(conn, link.parent.name(), &criteria).await? {
                    return Err(ValidationError::SubtypeMismatch {
                        key: link.key.to_string(),
                        value: key.to_string(),
                        expected: link.expected.to_string(),
                    }
                    .into());
                }
            }
        }
    }

    Ok(())
}

/// Refuses an update that changes a parent's kind out from under subtype rows.
///
/// For every subtype table whose discriminator lives in `table` and is being
/// set to something other than the subtype's kind, no child row may hang off
/// a parent row matched by `filter`.
pub(crate) async fn check_kind_change(
    conn: &mut SqliteConnection,
    table: &str,
    record: &Record,
    filter: &Statement,
) -> DbResult<()> {
    for child in Table::ALL {
        let Some(link) = rules_for(child).subtype() else {
            continue;
        };
        if link.parent.name() != table {
            continue;
        }
        match record.get(link.discriminator) {
            Some(Value::Text(kind)) if kind == link.expected => continue,
            None => continue,
            Some(_) => {}
        }

        if exists_under(conn, child.name(), link.key, table, link.parent_key, filter).await? {
            return Err(ValidationError::SubtypeInUse {
                field: link.discriminator.to_string(),
                table: child.name().to_string(),
                expected: link.expected.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use repairdesk_core::record;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for sql in [
            "INSERT INTO Customers (FirstName, LastName, Address) VALUES ('Ada', 'Smith', '1 Road')",
            "INSERT INTO RepairItems (RepairType, CustomerID, Name) VALUES ('Car', 1, 'Civic')",
            "INSERT INTO RepairItems (RepairType, CustomerID, Name) VALUES ('Computer', 1, 'ThinkPad')",
        ] {
            sqlx::query(sql).execute(db.pool()).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_missing_reference() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let job = record([("RepairItemID", Value::Integer(42))]);
        let err = validate(&mut conn, "RepairJobs", &job, RuleMode::Insert, true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "RepairItemID 42 does not exist in RepairItems");
    }

    #[tokio::test]
    async fn test_local_rules_run_before_probes() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        // Bad price and bad reference: the range check reports first.
        let job = record([
            ("RepairItemID", Value::Integer(42)),
            ("Price", Value::Real(-1.0)),
        ]);
        let err = validate(&mut conn, "RepairJobs", &job, RuleMode::Insert, true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[tokio::test]
    async fn test_probes_run_before_cross_fields() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let job = record([
            ("RepairItemID", Value::Integer(42)),
            ("DateReceived", Value::from("2025-08-10")),
            ("DateCompleted", Value::from("2025-08-05")),
        ]);
        let err = validate(&mut conn, "RepairJobs", &job, RuleMode::Insert, true)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FOREIGN_KEY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_subtype_mismatch() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        // Item 2 is a computer.
        let car = record([
            ("ItemID", Value::Integer(2)),
            ("Make", Value::from("Honda")),
            ("Model", Value::from("Civic")),
        ]);
        let err = validate(&mut conn, "CarDetails", &car, RuleMode::Insert, true)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: ItemID 2 is not a Car repair item"
        );

        validate(&mut conn, "CarDetails", &car, RuleMode::Insert, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_skips_absent_references() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let change = record([("Status", Value::from("Completed"))]);
        validate(&mut conn, "RepairJobs", &change, RuleMode::Update, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_table_has_no_rules() {
        let db = seeded().await;
        let mut conn = db.pool().acquire().await.unwrap();

        validate(&mut conn, "Notes", &Record::new(), RuleMode::Insert, true)
            .await
            .unwrap();
    }
}
