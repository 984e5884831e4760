//! Sheet importer: copies worksheets into tables of a SQLite store.
//!
//! Each worksheet becomes one table named after the sheet. Column names come
//! from a header row (row 0 unless configured otherwise) and every following
//! row is inserted with bound parameters.
//!
//! # Example
//!
//! ```
//! use sqltable_data::{CellValue, SheetImporter, Workbook, Worksheet};
//!
//! let workbook = Workbook::new().with_sheet(
//!     Worksheet::new("People")
//!         .row(["name", "age"])
//!         .row(vec![CellValue::from("Ann"), CellValue::Int(30)]),
//! );
//!
//! let mut importer = SheetImporter::in_memory().unwrap();
//! importer.load(&workbook, None).unwrap();
//!
//! let count: i64 = importer
//!     .connection()
//!     .query_row("SELECT count(*) FROM People", [], |r| r.get(0))
//!     .unwrap();
//! assert_eq!(count, 1);
//! ```
//!
//! # Failure behaviour
//!
//! - Schemas are validated for every sheet before the first `CREATE TABLE`.
//! - Tables are created one at a time and committed as they go. A name
//!   clash stops the run with [`ImportError::StoreConflict`], any other
//!   `CREATE TABLE` failure with [`ImportError::CreateTable`]. Both list the
//!   tables already created.
//! - Every worksheet needs a header row. One blank worksheet (an untouched
//!   `Sheet2`, say) fails the whole load with [`ImportError::Schema`]; pass
//!   explicit metadata without that sheet to import the rest.
//! - Rows of one sheet are inserted in a single transaction. A cell that
//!   cannot be coerced rolls back that sheet only; sheets loaded before it
//!   keep their rows.

pub mod coerce;
pub mod log;
pub mod schema;

use rusqlite::{params_from_iter, Connection, Transaction};

use crate::error::{DataError, ImportError, ImportResult};
use crate::workbook::{Workbook, WorkbookRef, Worksheet};

pub use coerce::{coerce, CoerceError};
pub use log::{EventLevel, ImportEvent, ImportLog, Verbosity};
pub use schema::{
    BookSchema, ColumnDescriptor, ColumnType, ColumnTypeGuesser, PlaceholderGuesser, SheetSchema,
};

/// Importer settings
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Zero-based row holding the column names
    pub header_row: usize,
}

/// Rows loaded for one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub sheet: String,
    pub rows: usize,
}

/// Outcome of a successful [`SheetImporter::load`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub sheets: Vec<SheetSummary>,
}

impl LoadReport {
    /// Rows loaded into `sheet`, if it was loaded
    pub fn rows_for(&self, sheet: &str) -> Option<usize> {
        self.sheets.iter().find(|s| s.sheet == sheet).map(|s| s.rows)
    }

    /// Total rows across all sheets
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows).sum()
    }
}

/// Loads workbooks into a SQLite connection
pub struct SheetImporter {
    conn: Connection,
    options: ImportOptions,
    log: ImportLog,
    guesser: Box<dyn ColumnTypeGuesser>,
}

impl SheetImporter {
    /// Wrap the given connection, or a fresh in-memory database when `None`
    pub fn new(conn: Option<Connection>) -> ImportResult<Self> {
        match conn {
            Some(conn) => Ok(Self::with_connection(conn)),
            None => Self::in_memory(),
        }
    }

    /// Importer over a new in-memory database
    pub fn in_memory() -> ImportResult<Self> {
        Ok(Self::with_connection(Connection::open_in_memory()?))
    }

    /// Importer over an existing connection
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            options: ImportOptions::default(),
            log: ImportLog::default(),
            guesser: Box::new(PlaceholderGuesser),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_log(mut self, log: ImportLog) -> Self {
        self.log = log;
        self
    }

    /// Replace the column type guesser
    pub fn with_guesser(mut self, guesser: impl ColumnTypeGuesser + 'static) -> Self {
        self.guesser = Box::new(guesser);
        self
    }

    /// The store
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Give the store back to the caller
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    pub fn log(&self) -> &ImportLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ImportLog {
        &mut self.log
    }

    /// Infer the schema of one worksheet from its header row (zero-based)
    pub fn infer_sheet_schema(&self, sheet: &Worksheet, header_row: usize) -> SheetSchema {
        SheetSchema::infer(sheet, header_row, self.guesser.as_ref())
    }

    /// Infer schemas for every sheet, using the configured header row
    pub fn infer_book_schema(&self, workbook: &Workbook) -> BookSchema {
        workbook
            .sheets()
            .iter()
            .map(|sheet| self.infer_sheet_schema(sheet, self.options.header_row))
            .collect()
    }

    /// Create one table per schema and return the created table names.
    ///
    /// Nothing is created unless every schema validates. Each table is
    /// committed as soon as it is created.
    pub fn create_tables(&mut self, schema: &BookSchema) -> ImportResult<Vec<String>> {
        for sheet in schema {
            sheet.validate()?;
        }

        let mut created = Vec::with_capacity(schema.len());
        for sheet in schema {
            if table_exists(&self.conn, &sheet.table)? {
                self.log.warn(Some(sheet.table.as_str()), "table already exists");
                return Err(ImportError::StoreConflict {
                    table: sheet.table.clone(),
                    created,
                });
            }

            let sql = sheet.create_statement();
            self.log.debug(Some(sheet.table.as_str()), sql.clone());
            if let Err(source) = self.conn.execute(&sql, []) {
                self.log
                    .warn(Some(sheet.table.as_str()), format!("create failed: {}", source));
                return Err(ImportError::CreateTable {
                    table: sheet.table.clone(),
                    created,
                    source,
                });
            }
            self.log.info(
                Some(sheet.table.as_str()),
                format!("created table with {} columns", sheet.columns.len()),
            );
            created.push(sheet.table.clone());
        }

        Ok(created)
    }

    /// Import a workbook.
    ///
    /// `workbook` is a path (opened and released here) or a borrowed
    /// in-memory workbook. When `metadata` is `None` the schema is inferred.
    pub fn load<'a>(
        &mut self,
        workbook: impl Into<WorkbookRef<'a>>,
        metadata: Option<&BookSchema>,
    ) -> ImportResult<LoadReport> {
        let source = workbook.into();
        let workbook = source.resolve()?;

        let inferred;
        let schema = match metadata {
            Some(schema) => schema,
            None => {
                inferred = self.infer_book_schema(&workbook);
                &inferred
            }
        };

        // Every schema must name a sheet we can read rows from
        for sheet in schema {
            if workbook.sheet(&sheet.table).is_none() {
                return Err(DataError::SheetNotFound(sheet.table.clone()).into());
            }
        }

        self.create_tables(schema)?;

        let mut report = LoadReport::default();
        for sheet_schema in schema {
            let Some(sheet) = workbook.sheet(&sheet_schema.table) else {
                continue;
            };

            let rows = self.load_sheet(sheet, sheet_schema)?;
            report.sheets.push(SheetSummary {
                sheet: sheet_schema.table.clone(),
                rows,
            });
        }

        Ok(report)
    }

    /// Insert all data rows of one sheet inside a single transaction
    fn load_sheet(&mut self, sheet: &Worksheet, schema: &SheetSchema) -> ImportResult<usize> {
        let sql = schema.insert_statement();
        self.log.debug(Some(sheet.name()), sql.clone());

        let tx = self.conn.transaction()?;
        match insert_rows(&tx, &sql, sheet, schema) {
            Ok(rows) => {
                tx.commit()?;
                self.log
                    .info(Some(sheet.name()), format!("loaded {} rows", rows));
                Ok(rows)
            }
            Err(e) => {
                // Dropping the transaction rolls the sheet back
                drop(tx);
                self.log
                    .warn(Some(sheet.name()), format!("rolled back: {}", e));
                Err(e)
            }
        }
    }
}

/// Import a workbook into `conn` (a new in-memory database when `None`) and
/// return the populated store.
pub fn load_workbook<'a>(
    workbook: impl Into<WorkbookRef<'a>>,
    conn: Option<Connection>,
) -> ImportResult<Connection> {
    let mut importer = SheetImporter::new(conn)?;
    importer.load(workbook, None)?;
    Ok(importer.into_connection())
}

fn insert_rows(
    tx: &Transaction<'_>,
    sql: &str,
    sheet: &Worksheet,
    schema: &SheetSchema,
) -> ImportResult<usize> {
    let mut stmt = tx.prepare(sql)?;
    let mut count = 0;

    for row in schema.start_row..sheet.max_row() {
        let values = schema
            .columns
            .iter()
            .map(|column| {
                coerce(sheet.cell(row, column.offset), &column.kind).map_err(|e| {
                    ImportError::Coercion {
                        sheet: sheet.name().to_string(),
                        row,
                        column: column.offset,
                        value: e.value,
                        target: e.target,
                    }
                })
            })
            .collect::<ImportResult<Vec<_>>>()?;

        stmt.execute(params_from_iter(values.iter()))?;
        count += 1;
    }

    Ok(count)
}

fn table_exists(conn: &Connection, name: &str) -> ImportResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
