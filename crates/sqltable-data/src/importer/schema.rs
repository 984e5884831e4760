//! Table schemas inferred from worksheet header rows.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{IdentifierKind, ImportError, ImportResult};
use crate::workbook::Worksheet;

/// Names usable as table, column or type identifiers
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_ ]*$").expect("identifier pattern is valid")
});

/// Declared storage type of a column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnType {
    /// Stored as text
    #[default]
    Text,
    /// Parsed as a floating point number
    Real,
    /// Any other declared type; values are stored in their plain string form
    Other(String),
}

impl ColumnType {
    /// Parse a declared type name, case-insensitively
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "varchar" | "string" => ColumnType::Text,
            "real" | "float" | "double" | "numeric" => ColumnType::Real,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Type name used in `CREATE TABLE`
    pub fn as_sql(&self) -> &str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Real => "real",
            ColumnType::Other(name) => name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Picks the storage type of a column.
///
/// This is the extension point for real type inference. The importer ships
/// with [`PlaceholderGuesser`], which always answers [`ColumnType::Text`].
pub trait ColumnTypeGuesser {
    /// Guess the type of `column`, whose header sits at `header_row`
    fn guess(&self, sheet: &Worksheet, header_row: usize, column: usize) -> ColumnType;
}

/// Always guesses `Text`; SQLite stores whatever it is given anyway
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderGuesser;

impl ColumnTypeGuesser for PlaceholderGuesser {
    fn guess(&self, _sheet: &Worksheet, _header_row: usize, _column: usize) -> ColumnType {
        ColumnType::Text
    }
}

/// One column of a sheet schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Lower-cased header text
    pub name: String,
    /// Zero-based column offset in the worksheet
    pub offset: usize,
    /// Declared storage type
    pub kind: ColumnType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, offset: usize, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            offset,
            kind,
        }
    }
}

/// Schema of the table created for one worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSchema {
    /// Table name, equal to the worksheet name
    pub table: String,
    /// Zero-based row of the first data row (header row + 1)
    pub start_row: usize,
    /// Columns in header left-to-right order
    pub columns: Vec<ColumnDescriptor>,
}

impl SheetSchema {
    /// Infer a schema from the header cells at `header_row` (zero-based).
    ///
    /// Empty header cells are skipped but keep their offsets, so the
    /// resulting columns may be sparse. An empty header row produces a
    /// schema with no columns, which [`SheetSchema::validate`] rejects.
    pub fn infer(sheet: &Worksheet, header_row: usize, guesser: &dyn ColumnTypeGuesser) -> Self {
        let columns = sheet
            .row_cells(header_row)
            .iter()
            .enumerate()
            .filter_map(|(offset, cell)| {
                let name = cell.to_string().trim().to_lowercase();
                if name.is_empty() {
                    return None;
                }
                let kind = guesser.guess(sheet, header_row, offset);
                Some(ColumnDescriptor::new(name, offset, kind))
            })
            .collect();

        Self {
            table: sheet.name().to_string(),
            start_row: header_row + 1,
            columns,
        }
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check that a table can be created from this schema
    pub fn validate(&self) -> ImportResult<()> {
        validate_identifier(IdentifierKind::Table, &self.table)?;

        if self.columns.is_empty() {
            return Err(ImportError::Schema {
                sheet: self.table.clone(),
                reason: format!(
                    "header row (offset {}) is empty",
                    self.start_row.saturating_sub(1)
                ),
            });
        }

        let mut names = HashSet::new();
        let mut offsets = HashSet::new();
        for column in &self.columns {
            validate_identifier(IdentifierKind::Column, &column.name)?;
            validate_identifier(IdentifierKind::Type, column.kind.as_sql())?;

            if !names.insert(column.name.as_str()) {
                return Err(ImportError::Schema {
                    sheet: self.table.clone(),
                    reason: format!("duplicate column name '{}'", column.name),
                });
            }
            if !offsets.insert(column.offset) {
                return Err(ImportError::Schema {
                    sheet: self.table.clone(),
                    reason: format!("column offset {} used twice", column.offset),
                });
            }
        }

        Ok(())
    }

    /// `CREATE TABLE` statement; call [`SheetSchema::validate`] first
    pub fn create_statement(&self) -> String {
        let fields: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.kind.as_sql()))
            .collect();

        format!(
            "CREATE TABLE {} ({})",
            quote_identifier(&self.table),
            fields.join(", ")
        )
    }

    /// Parameterized `INSERT` statement with one placeholder per column
    pub fn insert_statement(&self) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| quote_identifier(&c.name)).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table),
            names.join(", "),
            placeholders.join(", ")
        )
    }
}

/// Schemas for every sheet of a workbook, in workbook order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookSchema {
    sheets: Vec<SheetSchema>,
}

impl BookSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a schema, replacing any schema for the same table
    pub fn insert(&mut self, schema: SheetSchema) {
        match self.sheets.iter_mut().find(|s| s.table == schema.table) {
            Some(existing) => *existing = schema,
            None => self.sheets.push(schema),
        }
    }

    /// Look up the schema for a sheet
    pub fn get(&self, sheet: &str) -> Option<&SheetSchema> {
        self.sheets.iter().find(|s| s.table == sheet)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SheetSchema> {
        self.sheets.iter()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<'a> IntoIterator for &'a BookSchema {
    type Item = &'a SheetSchema;
    type IntoIter = std::slice::Iter<'a, SheetSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}

impl FromIterator<SheetSchema> for BookSchema {
    fn from_iter<I: IntoIterator<Item = SheetSchema>>(iter: I) -> Self {
        let mut book = BookSchema::new();
        for schema in iter {
            book.insert(schema);
        }
        book
    }
}

/// Table name prefix SQLite keeps for its own objects
const RESERVED_TABLE_PREFIX: &str = "sqlite_";

/// Reject names that would need more than double quotes to be safe in DDL,
/// and table names in SQLite's reserved namespace
pub fn validate_identifier(kind: IdentifierKind, name: &str) -> ImportResult<()> {
    let reserved = kind == IdentifierKind::Table
        && name
            .get(..RESERVED_TABLE_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(RESERVED_TABLE_PREFIX));

    if IDENTIFIER.is_match(name) && !reserved {
        Ok(())
    } else {
        Err(ImportError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

/// Double-quote a validated identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}
