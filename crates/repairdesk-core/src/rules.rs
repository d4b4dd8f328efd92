//! # Table Rules
//!
//! One rule value per table, looked up by table identity.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate(table, record)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. required()        Name / Contact / Address non-blank ...    (pure)  │
//! │  2. check_format()    email '@', YYYY-MM-DD, enumerations       (pure)  │
//! │  3. check_ranges()    quantity >= 0, price > 0, year >= 1900    (pure)  │
//! │  4. foreign_keys()    declared here, probed in repairdesk-db    (I/O)   │
//! │  5. check_cross_fields()  DateCompleted >= DateReceived         (pure)  │
//! │     subtype()         parent RepairType matches             (I/O, opt)  │
//! │                                                                         │
//! │  First failure wins.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps 1–3 are bundled in [`check_local`]. The database layer runs them,
//! then the foreign-key probes, then step 5.

use crate::error::ValidationError;
use crate::types::{Record, Table};
use crate::validation::{
    parse_date, require, validate_at_least, validate_date, validate_email,
    validate_non_negative, validate_one_of, validate_positive, ValidationResult,
};

// =============================================================================
// Rule Vocabulary
// =============================================================================

/// Allowed `RepairItems.RepairType` values.
pub const REPAIR_TYPES: [&str; 2] = ["Car", "Computer"];

/// Allowed `RepairJobs.Status` values.
pub const JOB_STATUSES: [&str; 4] = ["Pending", "In Progress", "Completed", "Archived"];

/// Allowed `Products.Category` values.
pub const PRODUCT_CATEGORIES: [&str; 3] = ["Laptop", "Desktop", "Other"];

/// Which write the record is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    /// Full record: every required field must be there.
    Insert,
    /// Partial record: only the columns being set are checked.
    Update,
}

/// A reference column and the parent row it must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: Table,
    pub referenced_column: &'static str,
}

const fn fk(column: &'static str, references: Table, referenced_column: &'static str) -> ForeignKey {
    ForeignKey {
        column,
        references,
        referenced_column,
    }
}

/// A subtype table's link to its parent discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtypeLink {
    /// Key column shared with the parent.
    pub key: &'static str,
    pub parent: Table,
    pub parent_key: &'static str,
    pub discriminator: &'static str,
    pub expected: &'static str,
}

/// The "check-this-record" capability every table variant implements.
pub trait TableRules: Send + Sync {
    fn table(&self) -> Table;

    /// Business-required fields (step 1).
    fn required(&self) -> &'static [&'static str];

    /// Format and enumeration checks (step 2).
    fn check_format(&self, _record: &Record) -> ValidationResult<()> {
        Ok(())
    }

    /// Numeric range and sign checks (step 3).
    fn check_ranges(&self, _record: &Record) -> ValidationResult<()> {
        Ok(())
    }

    /// Reference columns to probe (step 4), in probe order.
    fn foreign_keys(&self) -> &'static [ForeignKey] {
        &[]
    }

    /// Cross-field checks (step 5).
    fn check_cross_fields(&self, _record: &Record, _mode: RuleMode) -> ValidationResult<()> {
        Ok(())
    }

    /// Parent discriminator for subtype tables.
    fn subtype(&self) -> Option<SubtypeLink> {
        None
    }
}

/// Runs steps 1–3 for `rules` against `record`.
pub fn check_local(rules: &dyn TableRules, record: &Record, mode: RuleMode) -> ValidationResult<()> {
    for field in rules.required() {
        require(record, field, mode)?;
    }
    rules.check_format(record)?;
    rules.check_ranges(record)
}

// =============================================================================
// Registry
// =============================================================================

/// Returns the rule value for a table.
pub fn rules_for(table: Table) -> &'static dyn TableRules {
    match table {
        Table::Suppliers => &SupplierRules,
        Table::Parts => &PartRules,
        Table::PartSuppliers => &PartSupplierRules,
        Table::Customers => &CustomerRules,
        Table::RepairItems => &RepairItemRules,
        Table::CarDetails => &CarDetailRules,
        Table::ComputerDetails => &ComputerDetailRules,
        Table::RepairJobs => &RepairJobRules,
        Table::RepairItemParts => &RepairItemPartRules,
        Table::Products => &ProductRules,
        Table::Sales => &SaleRules,
        Table::SoldItems => &SoldItemRules,
    }
}

/// Looks up rules by store table name. Unknown tables have none.
pub fn rules_for_name(name: &str) -> Option<&'static dyn TableRules> {
    Table::from_name(name).map(rules_for)
}

// =============================================================================
// Suppliers / Parts / PartSuppliers
// =============================================================================

pub struct SupplierRules;

impl TableRules for SupplierRules {
    fn table(&self) -> Table {
        Table::Suppliers
    }

    fn required(&self) -> &'static [&'static str] {
        &["Name", "Contact", "Address"]
    }
}

pub struct PartRules;

impl TableRules for PartRules {
    fn table(&self) -> Table {
        Table::Parts
    }

    fn required(&self) -> &'static [&'static str] {
        &["Name"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_non_negative(record, "StockQTY")
    }
}

pub struct PartSupplierRules;

impl TableRules for PartSupplierRules {
    fn table(&self) -> Table {
        Table::PartSuppliers
    }

    fn required(&self) -> &'static [&'static str] {
        &["PartID", "SupplierID", "PurchasePrice"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_positive(record, "PurchasePrice")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 2] = [
            fk("PartID", Table::Parts, "PartID"),
            fk("SupplierID", Table::Suppliers, "SupplierID"),
        ];
        &KEYS
    }
}

// =============================================================================
// Customers / Repair Items and their subtypes
// =============================================================================

pub struct CustomerRules;

impl TableRules for CustomerRules {
    fn table(&self) -> Table {
        Table::Customers
    }

    fn required(&self) -> &'static [&'static str] {
        &["FirstName", "LastName", "Address"]
    }

    fn check_format(&self, record: &Record) -> ValidationResult<()> {
        validate_email(record, "Email")
    }
}

pub struct RepairItemRules;

impl TableRules for RepairItemRules {
    fn table(&self) -> Table {
        Table::RepairItems
    }

    fn required(&self) -> &'static [&'static str] {
        &["RepairType", "CustomerID", "Name"]
    }

    fn check_format(&self, record: &Record) -> ValidationResult<()> {
        validate_one_of(record, "RepairType", &REPAIR_TYPES)
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 1] = [fk("CustomerID", Table::Customers, "CustomerID")];
        &KEYS
    }
}

pub struct CarDetailRules;

impl TableRules for CarDetailRules {
    fn table(&self) -> Table {
        Table::CarDetails
    }

    fn required(&self) -> &'static [&'static str] {
        &["ItemID", "Make", "Model"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_at_least(record, "Year", 1900)?;
        validate_positive(record, "EngineSize")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 1] = [fk("ItemID", Table::RepairItems, "ItemID")];
        &KEYS
    }

    fn subtype(&self) -> Option<SubtypeLink> {
        Some(SubtypeLink {
            key: "ItemID",
            parent: Table::RepairItems,
            parent_key: "ItemID",
            discriminator: "RepairType",
            expected: "Car",
        })
    }
}

pub struct ComputerDetailRules;

impl TableRules for ComputerDetailRules {
    fn table(&self) -> Table {
        Table::ComputerDetails
    }

    fn required(&self) -> &'static [&'static str] {
        &["ItemID", "Brand", "CPU"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_non_negative(record, "RAM")?;
        validate_non_negative(record, "Storage")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 1] = [fk("ItemID", Table::RepairItems, "ItemID")];
        &KEYS
    }

    fn subtype(&self) -> Option<SubtypeLink> {
        Some(SubtypeLink {
            key: "ItemID",
            parent: Table::RepairItems,
            parent_key: "ItemID",
            discriminator: "RepairType",
            expected: "Computer",
        })
    }
}

// =============================================================================
// Repair Jobs / Repair Item Parts
// =============================================================================

pub struct RepairJobRules;

impl TableRules for RepairJobRules {
    fn table(&self) -> Table {
        Table::RepairJobs
    }

    fn required(&self) -> &'static [&'static str] {
        &["RepairItemID"]
    }

    fn check_format(&self, record: &Record) -> ValidationResult<()> {
        validate_date(record, "DateReceived")?;
        validate_date(record, "DateCompleted")?;
        validate_one_of(record, "Status", &JOB_STATUSES)
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_non_negative(record, "Price")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 1] = [fk("RepairItemID", Table::RepairItems, "ItemID")];
        &KEYS
    }

    fn check_cross_fields(&self, record: &Record, _mode: RuleMode) -> ValidationResult<()> {
        let date = |field: &str| {
            record
                .get(field)
                .and_then(|v| v.as_text())
                .and_then(parse_date)
        };

        // Only when both ends are known; formats were checked in step 2.
        if let (Some(received), Some(completed)) = (date("DateReceived"), date("DateCompleted")) {
            if completed < received {
                return Err(ValidationError::DateOrder {
                    earlier: "DateReceived".to_string(),
                    later: "DateCompleted".to_string(),
                });
            }
        }

        Ok(())
    }
}

pub struct RepairItemPartRules;

impl TableRules for RepairItemPartRules {
    fn table(&self) -> Table {
        Table::RepairItemParts
    }

    fn required(&self) -> &'static [&'static str] {
        &["ItemID", "PartID", "Quantity"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_positive(record, "Quantity")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 2] = [
            fk("ItemID", Table::RepairItems, "ItemID"),
            fk("PartID", Table::Parts, "PartID"),
        ];
        &KEYS
    }
}

// =============================================================================
// Products / Sales / Sold Items
// =============================================================================

pub struct ProductRules;

impl TableRules for ProductRules {
    fn table(&self) -> Table {
        Table::Products
    }

    fn required(&self) -> &'static [&'static str] {
        &["Name", "Category", "Price"]
    }

    fn check_format(&self, record: &Record) -> ValidationResult<()> {
        validate_one_of(record, "Category", &PRODUCT_CATEGORIES)
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_positive(record, "Price")?;
        validate_non_negative(record, "Quantity")
    }
}

pub struct SaleRules;

impl TableRules for SaleRules {
    fn table(&self) -> Table {
        Table::Sales
    }

    fn required(&self) -> &'static [&'static str] {
        &["CustomerID"]
    }

    fn check_format(&self, record: &Record) -> ValidationResult<()> {
        validate_date(record, "SaleDate")
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_positive(record, "SaleAmount")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 1] = [fk("CustomerID", Table::Customers, "CustomerID")];
        &KEYS
    }
}

pub struct SoldItemRules;

impl TableRules for SoldItemRules {
    fn table(&self) -> Table {
        Table::SoldItems
    }

    fn required(&self) -> &'static [&'static str] {
        &["ProductID", "SaleID", "Quantity", "UnitPrice"]
    }

    fn check_ranges(&self, record: &Record) -> ValidationResult<()> {
        validate_positive(record, "Quantity")?;
        validate_positive(record, "UnitPrice")
    }

    fn foreign_keys(&self) -> &'static [ForeignKey] {
        const KEYS: [ForeignKey; 2] = [
            fk("ProductID", Table::Products, "ProductID"),
            fk("SaleID", Table::Sales, "SaleID"),
        ];
        &KEYS
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{record, Value};

    fn local(table: Table, rec: &Record) -> ValidationResult<()> {
        check_local(rules_for(table), rec, RuleMode::Insert)
    }

    #[test]
    fn test_registry_covers_every_table() {
        for table in Table::ALL {
            assert_eq!(rules_for(table).table(), table);
        }
        assert!(rules_for_name("students").is_none());
    }

    #[test]
    fn test_every_table_rejects_empty_record() {
        for table in Table::ALL {
            let err = local(table, &Record::new()).unwrap_err();
            assert!(
                matches!(err, ValidationError::Required { .. }),
                "{table} should require a field, got {err:?}"
            );
        }
    }

    #[test]
    fn test_supplier_requires_all_three() {
        let rec = record([
            ("Name", Value::from("Acme")),
            ("Contact", Value::from("")),
            ("Address", Value::from("1 Road")),
        ]);
        assert_eq!(
            local(Table::Suppliers, &rec).unwrap_err(),
            ValidationError::Required {
                field: "Contact".to_string()
            }
        );
    }

    #[test]
    fn test_part_stock_must_not_be_negative() {
        let ok = record([("Name", Value::from("Bolt")), ("StockQTY", Value::Integer(0))]);
        assert!(local(Table::Parts, &ok).is_ok());

        let bad = record([("Name", Value::from("Bolt")), ("StockQTY", Value::Integer(-1))]);
        assert!(local(Table::Parts, &bad).is_err());
    }

    #[test]
    fn test_purchase_price_must_be_positive() {
        let mut rec = record([
            ("PartID", Value::Integer(1)),
            ("SupplierID", Value::Integer(1)),
            ("PurchasePrice", Value::Real(0.0)),
        ]);
        assert_eq!(
            local(Table::PartSuppliers, &rec).unwrap_err(),
            ValidationError::MustBePositive {
                field: "PurchasePrice".to_string()
            }
        );

        rec.insert("PurchasePrice".to_string(), Value::Real(50.0));
        assert!(local(Table::PartSuppliers, &rec).is_ok());
    }

    #[test]
    fn test_customer_email_format() {
        let mut rec = record([
            ("FirstName", Value::from("Ada")),
            ("LastName", Value::from("Smith")),
            ("Address", Value::from("2 Lane")),
            ("Email", Value::from("ada.example.com")),
        ]);
        assert!(matches!(
            local(Table::Customers, &rec),
            Err(ValidationError::InvalidFormat { .. })
        ));

        rec.insert("Email".to_string(), Value::from("ada@example.com"));
        assert!(local(Table::Customers, &rec).is_ok());
    }

    #[test]
    fn test_repair_type_enumeration() {
        let mut rec = record([
            ("RepairType", Value::from("Boat")),
            ("CustomerID", Value::Integer(1)),
            ("Name", Value::from("Dinghy")),
        ]);
        assert!(matches!(
            local(Table::RepairItems, &rec),
            Err(ValidationError::NotAllowed { .. })
        ));

        rec.insert("RepairType".to_string(), Value::from("Car"));
        assert!(local(Table::RepairItems, &rec).is_ok());
    }

    #[test]
    fn test_car_detail_ranges() {
        let base = record([
            ("ItemID", Value::Integer(1)),
            ("Make", Value::from("Ford")),
            ("Model", Value::from("Focus")),
        ]);
        assert!(local(Table::CarDetails, &base).is_ok());

        let mut old = base.clone();
        old.insert("Year".to_string(), Value::Integer(1899));
        assert!(matches!(
            local(Table::CarDetails, &old),
            Err(ValidationError::TooSmall { min: 1900, .. })
        ));

        let mut engine = base;
        engine.insert("EngineSize".to_string(), Value::Real(0.0));
        assert!(local(Table::CarDetails, &engine).is_err());
    }

    #[test]
    fn test_computer_detail_ranges() {
        let mut rec = record([
            ("ItemID", Value::Integer(1)),
            ("Brand", Value::from("Dell")),
            ("CPU", Value::from("i5")),
            ("RAM", Value::Integer(0)),
        ]);
        assert!(local(Table::ComputerDetails, &rec).is_ok());

        rec.insert("Storage".to_string(), Value::Integer(-256));
        assert!(local(Table::ComputerDetails, &rec).is_err());
    }

    #[test]
    fn test_repair_job_status_and_dates() {
        let mut rec = record([
            ("RepairItemID", Value::Integer(1)),
            ("Status", Value::from("In Progress")),
            ("DateReceived", Value::from("2025-08-10")),
        ]);
        assert!(local(Table::RepairJobs, &rec).is_ok());

        rec.insert("Status".to_string(), Value::from("Done"));
        assert!(matches!(
            local(Table::RepairJobs, &rec),
            Err(ValidationError::NotAllowed { .. })
        ));

        rec.insert("Status".to_string(), Value::from("Pending"));
        rec.insert("DateCompleted".to_string(), Value::from("08/12/2025"));
        assert!(matches!(
            local(Table::RepairJobs, &rec),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_repair_job_date_ordering() {
        let rules = rules_for(Table::RepairJobs);
        let mut rec = record([
            ("DateReceived", Value::from("2025-08-10")),
            ("DateCompleted", Value::from("2025-08-05")),
        ]);
        assert!(matches!(
            rules.check_cross_fields(&rec, RuleMode::Insert),
            Err(ValidationError::DateOrder { .. })
        ));

        rec.insert("DateCompleted".to_string(), Value::from("2025-08-12"));
        assert!(rules.check_cross_fields(&rec, RuleMode::Insert).is_ok());

        // One side missing: nothing to compare
        rec.remove("DateReceived");
        assert!(rules.check_cross_fields(&rec, RuleMode::Insert).is_ok());
    }

    #[test]
    fn test_product_rules() {
        let mut rec = record([
            ("Name", Value::from("ThinkPad")),
            ("Category", Value::from("Laptop")),
            ("Price", Value::Real(899.0)),
            ("Quantity", Value::Integer(3)),
        ]);
        assert!(local(Table::Products, &rec).is_ok());

        rec.insert("Category".to_string(), Value::from("Tablet"));
        assert!(local(Table::Products, &rec).is_err());

        rec.insert("Category".to_string(), Value::from("Other"));
        rec.insert("Price".to_string(), Value::Real(0.0));
        assert!(local(Table::Products, &rec).is_err());
    }

    #[test]
    fn test_sale_and_sold_item_rules() {
        let sale = record([
            ("CustomerID", Value::Integer(1)),
            ("SaleDate", Value::from("2025-13-01")),
        ]);
        assert!(local(Table::Sales, &sale).is_err());

        let item = record([
            ("ProductID", Value::Integer(1)),
            ("SaleID", Value::Integer(1)),
            ("Quantity", Value::Integer(2)),
            ("UnitPrice", Value::Real(-1.0)),
        ]);
        assert_eq!(
            local(Table::SoldItems, &item).unwrap_err(),
            ValidationError::MustBePositive {
                field: "UnitPrice".to_string()
            }
        );
    }

    #[test]
    fn test_update_mode_checks_present_columns_only() {
        let rules = rules_for(Table::Products);
        let partial = record([("Quantity", Value::Integer(10))]);
        assert!(check_local(rules, &partial, RuleMode::Update).is_ok());

        let blank_name = record([("Name", Value::from(""))]);
        assert!(check_local(rules, &blank_name, RuleMode::Update).is_err());
    }

    #[test]
    fn test_foreign_key_declarations() {
        let keys = rules_for(Table::SoldItems).foreign_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].references, Table::Products);
        assert_eq!(keys[1].referenced_column, "SaleID");

        assert!(rules_for(Table::Suppliers).foreign_keys().is_empty());
        assert_eq!(
            rules_for(Table::RepairJobs).foreign_keys()[0].referenced_column,
            "ItemID"
        );
    }

    #[test]
    fn test_subtype_links() {
        assert_eq!(rules_for(Table::CarDetails).subtype().unwrap().expected, "Car");
        assert_eq!(
            rules_for(Table::ComputerDetails).subtype().unwrap().expected,
            "Computer"
        );
        assert!(rules_for(Table::RepairItems).subtype().is_none());
    }
}
