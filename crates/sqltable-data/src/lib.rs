//! # sqltable-data
//!
//! Tabular data plumbing for sqltable: read spreadsheets and CSV files,
//! import them into SQLite, run queries and turn result rows into
//! `sqltable-ast` Table nodes.
//!
//! ## Features
//!
//! - **Sheet importer**: one table per worksheet, column names from a header
//!   row, bound-parameter inserts, one transaction per sheet
//! - **Sources**: Excel/ODS via `calamine`, CSV/TSV via `csv`
//! - **AST integration**: convert query rows to Table nodes
//!
//! ## Example
//!
//! ```rust,ignore
//! use sqltable_data::{load_workbook, query_rows, ConvertOptions, TableConverter};
//!
//! let conn = load_workbook("data.xlsx", None)?;
//! let result = query_rows(&conn, "SELECT name, age FROM People")?;
//! let table = TableConverter::convert(result.rows, ConvertOptions::with_header(["Name", "Age"]))?;
//! ```

pub mod converter;
pub mod error;
pub mod importer;
pub mod query;
pub mod sources;
pub mod workbook;

// Re-exports
pub use converter::{ConvertOptions, TableConverter};
pub use error::{DataError, IdentifierKind, ImportError, ImportResult, Result};
pub use importer::{
    coerce, load_workbook, BookSchema, ColumnDescriptor, ColumnType, ColumnTypeGuesser,
    EventLevel, ImportEvent, ImportLog, ImportOptions, LoadReport, PlaceholderGuesser,
    SheetImporter, SheetSchema, SheetSummary, Verbosity,
};
pub use query::{query_rows, QueryRows};
pub use sources::{CsvOptions, CsvSource, ExcelSource};
pub use workbook::{CellValue, Workbook, WorkbookRef, Worksheet};

/// Re-exported so callers can hand in or receive a store
pub use rusqlite::Connection;
