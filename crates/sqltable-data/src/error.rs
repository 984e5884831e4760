//! Error types for data sources and the sheet importer.

use std::fmt;

use thiserror::Error;

/// Result type for data source operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Result type for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Errors that can occur while reading tabular data sources
#[derive(Debug, Error)]
pub enum DataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Failed to open workbook
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    /// Sheet not found in workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(String),

    /// Query failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Rows cannot be laid out as the requested table
    #[error("Invalid table layout: {0}")]
    TableLayout(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calamine error
    #[error("Excel error: {0}")]
    Calamine(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<calamine::Error> for DataError {
    fn from(err: calamine::Error) -> Self {
        DataError::Calamine(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// Which kind of SQL identifier failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Column,
    Type,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentifierKind::Table => "table",
            IdentifierKind::Column => "column",
            IdentifierKind::Type => "column type",
        };
        f.write_str(name)
    }
}

/// Errors raised by the sheet importer.
///
/// Row and column fields are zero-based offsets into the worksheet.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Empty or unusable header row, reported before any table is created
    #[error("Schema error in sheet '{sheet}': {reason}")]
    Schema { sheet: String, reason: String },

    /// A table with the sheet's name already exists in the store.
    /// `created` lists the tables created before the conflict was hit.
    #[error("Table already exists: {table}")]
    StoreConflict { table: String, created: Vec<String> },

    /// `CREATE TABLE` failed for any other reason.
    /// `created` lists the tables created before the failure.
    #[error("Cannot create table {table}: {source}")]
    CreateTable {
        table: String,
        created: Vec<String>,
        source: rusqlite::Error,
    },

    /// A cell could not be converted to its column's declared type
    #[error(
        "Cannot convert {value:?} to {target} in sheet '{sheet}' (row offset {row}, column offset {column})"
    )]
    Coercion {
        sheet: String,
        row: usize,
        column: usize,
        value: String,
        target: String,
    },

    /// A sheet, column or type name that cannot be used as an SQL identifier
    #[error("Invalid {kind} name: {name:?}")]
    InvalidIdentifier { kind: IdentifierKind, name: String },

    /// Workbook could not be opened or parsed
    #[error("Workbook error: {0}")]
    Workbook(#[from] DataError),

    /// Any other store failure
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_message_has_context() {
        let err = ImportError::Coercion {
            sheet: "People".to_string(),
            row: 4,
            column: 1,
            value: "forty".to_string(),
            target: "real".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("People"));
        assert!(msg.contains("row offset 4"));
        assert!(msg.contains("\"forty\""));
    }

    #[test]
    fn test_identifier_kind_display() {
        let err = ImportError::InvalidIdentifier {
            kind: IdentifierKind::Column,
            name: "a;b".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid column name: \"a;b\"");
    }

    #[test]
    fn test_workbook_error_from_data_error() {
        let err: ImportError = DataError::FileNotFound("x.xlsx".to_string()).into();
        assert!(matches!(err, ImportError::Workbook(DataError::FileNotFound(_))));
    }
}
