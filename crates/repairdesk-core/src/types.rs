//! # Domain Types
//!
//! Loosely-typed record values, column descriptors and the identity of the
//! twelve RepairDesk tables.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Value       │   │   ColumnDef     │   │     Table       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Null           │   │  name           │   │  Suppliers      │       │
//! │  │  Integer(i64)   │   │  declared_type  │   │  Parts          │       │
//! │  │  Real(f64)      │   │  required       │   │  ...            │       │
//! │  │  Text(String)   │   │  default_value  │   │  SoldItems      │       │
//! │  └─────────────────┘   │  is_primary_key │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  Record = BTreeMap<column name, Value>                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Value
// =============================================================================

/// A single column value as it travels between callers and the store.
///
/// Caller input usually arrives as [`Value::Text`]; the coercion step turns it
/// into the column's declared type before any rule looks at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Double-precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true when the value carries no business content:
    /// NULL, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the value. Integers widen to `f64`; text is not parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of the value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Text view of the value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Storage class name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// Record
// =============================================================================

/// A mapping of column name to value, as supplied to insert/update.
pub type Record = BTreeMap<String, Value>;

/// Builds a [`Record`] from `(column, value)` pairs.
///
/// ## Example
/// ```rust
/// use repairdesk_core::types::{record, Value};
///
/// let rec = record([("Name", Value::from("Acme")), ("StockQTY", Value::from("4"))]);
/// assert_eq!(rec.len(), 2);
/// ```
pub fn record<I, K>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

// =============================================================================
// Column Descriptors
// =============================================================================

/// The type vocabulary the engine understands.
///
/// Derived from the store's declared column type by prefix:
/// `INTEGER…` → Integer, `REAL…` → Real, anything else → Text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeclaredType {
    Integer,
    Real,
    Text,
}

impl DeclaredType {
    /// Classifies a declared type string such as `"INTEGER"` or `"real(10)"`.
    pub fn from_declaration(decl: &str) -> Self {
        let upper = decl.trim().to_ascii_uppercase();
        if upper.starts_with("INTEGER") {
            DeclaredType::Integer
        } else if upper.starts_with("REAL") {
            DeclaredType::Real
        } else {
            DeclaredType::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredType::Integer => "INTEGER",
            DeclaredType::Real => "REAL",
            DeclaredType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a table as reported by the store's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub name: String,
    pub declared_type: DeclaredType,
    /// NOT NULL at the store level (not the same as a business-required field).
    pub required: bool,
    /// The DEFAULT expression text, if any.
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// Finds a column descriptor by name.
pub fn find_column<'a>(columns: &'a [ColumnDef], name: &str) -> Option<&'a ColumnDef> {
    columns.iter().find(|c| c.name == name)
}

// =============================================================================
// Table Identity
// =============================================================================

/// The twelve tables with hand-written rules.
///
/// ```text
///   Suppliers ◄── PartSuppliers ──► Parts ◄── RepairItemParts
///                                                  │
///   Customers ◄── RepairItems ◄────────────────────┘
///       ▲             ▲  ▲  ▲
///       │             │  │  └── RepairJobs
///     Sales           │  └───── ComputerDetails (shares ItemID)
///       ▲             └──────── CarDetails      (shares ItemID)
///       │
///   SoldItems ──► Products
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Table {
    Suppliers,
    Parts,
    PartSuppliers,
    Customers,
    RepairItems,
    CarDetails,
    ComputerDetails,
    RepairJobs,
    RepairItemParts,
    Products,
    Sales,
    SoldItems,
}

impl Table {
    /// All tables, parents before dependents.
    pub const ALL: [Table; 12] = [
        Table::Suppliers,
        Table::Parts,
        Table::PartSuppliers,
        Table::Customers,
        Table::RepairItems,
        Table::CarDetails,
        Table::ComputerDetails,
        Table::RepairJobs,
        Table::RepairItemParts,
        Table::Products,
        Table::Sales,
        Table::SoldItems,
    ];

    /// The table's name in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Suppliers => "Suppliers",
            Table::Parts => "Parts",
            Table::PartSuppliers => "PartSuppliers",
            Table::Customers => "Customers",
            Table::RepairItems => "RepairItems",
            Table::CarDetails => "CarDetails",
            Table::ComputerDetails => "ComputerDetails",
            Table::RepairJobs => "RepairJobs",
            Table::RepairItemParts => "RepairItemParts",
            Table::Products => "Products",
            Table::Sales => "Sales",
            Table::SoldItems => "SoldItems",
        }
    }

    /// Exact-match lookup. Unknown tables have no rules.
    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// The surrogate key the store assigns on insert, if this table has one.
    ///
    /// Subtype and junction tables return `None`: their keys are supplied by
    /// the caller and reference parent rows.
    pub fn server_assigned_key(&self) -> Option<&'static str> {
        match self {
            Table::Suppliers => Some("SupplierID"),
            Table::Parts => Some("PartID"),
            Table::Customers => Some("CustomerID"),
            Table::RepairItems => Some("ItemID"),
            Table::RepairJobs => Some("RepairID"),
            Table::Products => Some("ProductID"),
            Table::Sales => Some("SaleID"),
            Table::PartSuppliers
            | Table::CarDetails
            | Table::ComputerDetails
            | Table::RepairItemParts
            | Table::SoldItems => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::from_name(s).ok_or_else(|| format!("unknown table: {s}"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
