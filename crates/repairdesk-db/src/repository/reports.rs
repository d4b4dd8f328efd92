//! # Report Repository
//!
//! Read-only business reports over the twelve tables. Every report goes
//! through [`RecordRepository::query`], so parameters are bound and nothing
//! can be written.

use repairdesk_core::{Table, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::records::RecordRepository;
use crate::row::Row;

/// A canned report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    /// All suppliers, A→Z.
    SuppliersByName,
    /// Customers whose last name starts with a prefix.
    CustomersByLastNamePrefix { prefix: String },
    /// The most expensive products.
    TopProductsByPrice { limit: i64 },
    /// Repair jobs not yet completed.
    OpenRepairJobs,
    /// Computer repairs received in the last `days` days.
    RecentComputerRepairs { days: i64 },
    /// Each part with the name of each supplier.
    PartsWithSuppliers,
    /// Jobs with the customer and the item being repaired.
    RepairJobsWithCustomers,
    /// Sold items with the sale date and customer.
    SoldItemsWithCustomers,
    /// Cars with make, model and job status.
    CarRepairsWithStatus,
    /// Number of repair jobs per customer (zero included).
    JobCountPerCustomer,
    /// Total quantity of each part used in repairs.
    PartUsageTotals,
    /// Revenue from sold items.
    SalesRevenue,
    /// Customers whose sales add up to more than `threshold`.
    CustomersSpendingOver { threshold: f64 },
    /// Average job price per repair type.
    AverageRepairPriceByType,
    /// Row count of every table.
    TableRowCounts,
}

impl Report {
    /// Short human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Report::SuppliersByName => "Suppliers sorted by name",
            Report::CustomersByLastNamePrefix { .. } => "Customers by last-name prefix",
            Report::TopProductsByPrice { .. } => "Most expensive products",
            Report::OpenRepairJobs => "Repair jobs not completed",
            Report::RecentComputerRepairs { .. } => "Recent computer repairs",
            Report::PartsWithSuppliers => "Parts with supplier names",
            Report::RepairJobsWithCustomers => "Repair jobs with customer and item",
            Report::SoldItemsWithCustomers => "Products sold with sale date and customer",
            Report::CarRepairsWithStatus => "Car repairs with job status",
            Report::JobCountPerCustomer => "Repair jobs per customer",
            Report::PartUsageTotals => "Part usage in repairs",
            Report::SalesRevenue => "Total sales revenue",
            Report::CustomersSpendingOver { .. } => "Customers over a spending threshold",
            Report::AverageRepairPriceByType => "Average repair price by type",
            Report::TableRowCounts => "Rows per table",
        }
    }

    /// The statement text. Parameters use `?` and come from [`params`](Self::params).
    pub fn sql(&self) -> String {
        let sql = match self {
            Report::SuppliersByName => "SELECT * FROM Suppliers ORDER BY Name ASC",
            Report::CustomersByLastNamePrefix { .. } => {
                r"SELECT * FROM Customers WHERE LastName LIKE ? ESCAPE '\' ORDER BY LastName, FirstName"
            }
            Report::TopProductsByPrice { .. } => {
                "SELECT * FROM Products ORDER BY Price DESC LIMIT ?"
            }
            Report::OpenRepairJobs => {
                "SELECT * FROM RepairJobs WHERE Status IS NULL OR Status != 'Completed'"
            }
            Report::RecentComputerRepairs { .. } => {
                "SELECT r.ItemID, r.Name, j.RepairID, j.DateReceived, j.Status \
                 FROM RepairItems r JOIN RepairJobs j ON r.ItemID = j.RepairItemID \
                 WHERE r.RepairType = 'Computer' AND j.DateReceived >= date('now', ?)"
            }
            Report::PartsWithSuppliers => {
                "SELECT p.Name AS PartName, s.Name AS SupplierName, ps.PurchasePrice \
                 FROM Parts p \
                 JOIN PartSuppliers ps ON p.PartID = ps.PartID \
                 JOIN Suppliers s ON ps.SupplierID = s.SupplierID"
            }
            Report::RepairJobsWithCustomers => {
                "SELECT j.RepairID, c.FirstName, c.LastName, r.Name AS ItemName, r.Description \
                 FROM RepairJobs j \
                 JOIN RepairItems r ON j.RepairItemID = r.ItemID \
                 JOIN Customers c ON r.CustomerID = c.CustomerID"
            }
            Report::SoldItemsWithCustomers => {
                "SELECT si.SaleID, si.ProductID, p.Name AS ProductName, s.SaleDate, c.FirstName, c.LastName \
                 FROM SoldItems si \
                 JOIN Products p ON si.ProductID = p.ProductID \
                 JOIN Sales s ON si.SaleID = s.SaleID \
                 JOIN Customers c ON s.CustomerID = c.CustomerID"
            }
            Report::CarRepairsWithStatus => {
                "SELECT r.Name AS CarName, c.Make, c.Model, j.Status \
                 FROM CarDetails c \
                 JOIN RepairItems r ON c.ItemID = r.ItemID \
                 JOIN RepairJobs j ON r.ItemID = j.RepairItemID"
            }
            Report::JobCountPerCustomer => {
                "SELECT c.CustomerID, c.FirstName, c.LastName, COUNT(j.RepairID) AS JobCount \
                 FROM Customers c \
                 LEFT JOIN RepairItems r ON c.CustomerID = r.CustomerID \
                 LEFT JOIN RepairJobs j ON r.ItemID = j.RepairItemID \
                 GROUP BY c.CustomerID"
            }
            Report::PartUsageTotals => {
                "SELECT p.PartID, p.Name, SUM(rip.Quantity) AS TotalUsed \
                 FROM Parts p JOIN RepairItemParts rip ON p.PartID = rip.PartID \
                 GROUP BY p.PartID"
            }
            Report::SalesRevenue => {
                "SELECT COALESCE(SUM(UnitPrice * Quantity), 0.0) AS TotalRevenue FROM SoldItems"
            }
            Report::CustomersSpendingOver { .. } => {
                "SELECT c.CustomerID, c.FirstName, c.LastName, SUM(s.SaleAmount) AS TotalSpent \
                 FROM Customers c JOIN Sales s ON c.CustomerID = s.CustomerID \
                 GROUP BY c.CustomerID HAVING TotalSpent > ?"
            }
            Report::AverageRepairPriceByType => {
                "SELECT r.RepairType, AVG(j.Price) AS AveragePrice \
                 FROM RepairJobs j JOIN RepairItems r ON j.RepairItemID = r.ItemID \
                 GROUP BY r.RepairType ORDER BY r.RepairType"
            }
            Report::TableRowCounts => return table_row_counts_sql(),
        };
        sql.to_string()
    }

    /// Bound parameters, in placeholder order.
    pub fn params(&self) -> Vec<Value> {
        match self {
            Report::CustomersByLastNamePrefix { prefix } => {
                vec![Value::Text(format!("{}%", escape_like(prefix)))]
            }
            Report::TopProductsByPrice { limit } => vec![Value::Integer(*limit)],
            Report::RecentComputerRepairs { days } => vec![Value::Text(format!("-{days} days"))],
            Report::CustomersSpendingOver { threshold } => vec![Value::Real(*threshold)],
            _ => Vec::new(),
        }
    }
}

fn table_row_counts_sql() -> String {
    Table::ALL
        .iter()
        .map(|t| format!("SELECT '{0}' AS TableName, COUNT(*) AS RowCount FROM \"{0}\"", t.name()))
        .collect::<Vec<_>>()
        .join(" UNION ALL ")
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for canned reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    records: RecordRepository,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(records: RecordRepository) -> Self {
        ReportRepository { records }
    }

    /// Runs a report.
    pub async fn run(&self, report: &Report) -> DbResult<Vec<Row>> {
        debug!(report = report.title(), "Running report");
        self.records.query(&report.sql(), &report.params()).await
    }
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
        let repo = db.records();

        for (first, last) in [("Ada", "Smith"), ("Alan", "Turing"), ("Grace", "Stone")] {
            repo.insert(
                "Customers",
                &record([
                    ("FirstName", Value::from(first)),
                    ("LastName", Value::from(last)),
                    ("Address", Value::from("1 High St")),
                ]),
            )
            .await
            .unwrap();
        }
        for (name, price) in [("ThinkPad", "1200"), ("Mini", "300"), ("Mouse", "20")] {
            let category = if name == "Mouse" { "Other" } else { "Laptop" };
            repo.insert(
                "Products",
                &record([
                    ("Name", Value::from(name)),
                    ("Category", Value::from(category)),
                    ("Price", Value::from(price)),
                ]),
            )
            .await
            .unwrap();
        }
        let sale = repo
            .insert(
                "Sales",
                &record([
                    ("CustomerID", Value::from(1)),
                    ("SaleDate", Value::from("2025-08-01")),
                    ("SaleAmount", Value::from(1240.0)),
                ]),
            )
            .await
            .unwrap();
        for (product, qty, price) in [(1, 1, 1200.0), (3, 2, 20.0)] {
            repo.insert(
                "SoldItems",
                &record([
                    ("SaleID", Value::from(sale)),
                    ("ProductID", Value::from(product)),
                    ("Quantity", Value::from(qty)),
                    ("UnitPrice", Value::from(price)),
                ]),
            )
            .await
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_last_name_prefix() {
        let db = seeded().await;
        let rows = db
            .reports()
            .run(&Report::CustomersByLastNamePrefix {
                prefix: "S".to_string(),
            })
            .await
            .unwrap();

        let names: Vec<&Value> = rows.iter().filter_map(|r| r.get("LastName")).collect();
        assert_eq!(names, [&Value::from("Smith"), &Value::from("Stone")]);
    }

    #[tokio::test]
    async fn test_top_products_and_revenue() {
        let db = seeded().await;
        let reports = db.reports();

        let top = reports.run(&Report::TopProductsByPrice { limit: 2 }).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].get("Name"), Some(&Value::from("ThinkPad")));

        let revenue = reports.run(&Report::SalesRevenue).await.unwrap();
        assert_eq!(revenue[0].get("TotalRevenue"), Some(&Value::Real(1240.0)));
    }

    #[tokio::test]
    async fn test_spending_threshold() {
        let db = seeded().await;
        let reports = db.reports();

        let over = reports
            .run(&Report::CustomersSpendingOver { threshold: 100.0 })
            .await
            .unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].get("FirstName"), Some(&Value::from("Ada")));

        let none = reports
            .run(&Report::CustomersSpendingOver { threshold: 5000.0 })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_job_count_includes_customers_without_jobs() {
        let db = seeded().await;
        let rows = db.reports().run(&Report::JobCountPerCustomer).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.get("JobCount") == Some(&Value::Integer(0))));
    }

    #[tokio::test]
    async fn test_table_row_counts() {
        let db = seeded().await;
        let rows = db.reports().run(&Report::TableRowCounts).await.unwrap();
        assert_eq!(rows.len(), Table::ALL.len());

        let sold = rows
            .iter()
            .find(|r| r.get("TableName") == Some(&Value::from("SoldItems")))
            .unwrap();
        assert_eq!(sold.get("RowCount"), Some(&Value::Integer(2)));
    }

    #[tokio::test]
    async fn test_every_report_runs() {
        let db = seeded().await;
        let reports = db.reports();
        let all = [
            Report::SuppliersByName,
            Report::OpenRepairJobs,
            Report::RecentComputerRepairs { days: 7 },
            Report::PartsWithSuppliers,
            Report::RepairJobsWithCustomers,
            Report::SoldItemsWithCustomers,
            Report::CarRepairsWithStatus,
            Report::PartUsageTotals,
            Report::AverageRepairPriceByType,
        ];
        for report in &all {
            reports.run(report).await.unwrap();
        }
    }

    #[test]
    fn test_like_prefix_is_escaped() {
        let report = Report::CustomersByLastNamePrefix {
            prefix: "O_%".to_string(),
        };
        assert_eq!(report.params(), vec![Value::Text(r"O\_\%%".to_string())]);
    }
}
