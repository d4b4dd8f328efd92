//! # Repository Module
//!
//! Database repositories for RepairDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  admin-cli / caller                                                     │
//! │       │                                                                 │
//! │       │  db.records().insert("Parts", &record)                          │
//! │       │  db.reports().run(&Report::OpenRepairJobs)                      │
//! │       ▼                                                                 │
//! │  RecordRepository                    ReportRepository                   │
//! │  ├── insert / update / delete        └── run(report)                    │
//! │  ├── create_table                          │                            │
//! │  └── query / find / list / count / get ◄───┘                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`RecordRepository`](records::RecordRepository) - validated writes, raw reads
//! - [`ReportRepository`](reports::ReportRepository) - canned reports

pub mod records;
pub mod reports;
