//! In-memory workbook model used by the sheet importer.
//!
//! A [`Workbook`] is an ordered list of named [`Worksheet`]s, each a dense
//! grid of [`CellValue`]s addressed by zero-based `(row, column)`. Workbooks
//! can be built by hand, read from any calamine-supported spreadsheet, or
//! read from a CSV file.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sources::{CsvOptions, CsvSource, ExcelSource};

static EMPTY: CellValue = CellValue::Empty;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date/time or duration, kept in its textual form
    DateTime(String),
    /// Spreadsheet error value such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// True for missing cells and for empty text
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => {
                // Whole numbers print without a trailing ".0"
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.0}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// A named grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Create a worksheet from rows of cells
    pub fn with_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Append a row
    pub fn push_row<I, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`Worksheet::push_row`]
    pub fn row<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.push_row(row);
        self
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows, counting from row 0 to the last populated row
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn max_column(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cells of one row; rows past the end are empty
    pub fn row_cells(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A single cell; anything outside the grid reads as `Empty`
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }
}

/// An ordered collection of worksheets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a spreadsheet file (xlsx, xlsm, xlsb, xls or ods)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        ExcelSource::new(path)?.read_workbook()
    }

    /// Read a CSV file as a single-sheet workbook named after the file stem
    pub fn from_csv(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        CsvSource::with_options(path, options)?.read_workbook()
    }

    /// Append a worksheet
    pub fn push(&mut self, sheet: Worksheet) {
        self.sheets.push(sheet);
    }

    /// Builder form of [`Workbook::push`]
    pub fn with_sheet(mut self, sheet: Worksheet) -> Self {
        self.push(sheet);
        self
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    /// Look up a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// All worksheets in order
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// A workbook passed to the importer: either a path the importer opens and
/// owns, or a caller-owned workbook that is only read.
#[derive(Debug, Clone)]
pub enum WorkbookRef<'a> {
    Path(PathBuf),
    Borrowed(&'a Workbook),
}

impl WorkbookRef<'_> {
    /// Resolve to a workbook, opening the file when given a path
    pub fn resolve(&self) -> Result<Cow<'_, Workbook>> {
        match self {
            WorkbookRef::Path(path) => Workbook::open(path).map(Cow::Owned),
            WorkbookRef::Borrowed(wb) => Ok(Cow::Borrowed(*wb)),
        }
    }
}

impl<'a> From<&'a Workbook> for WorkbookRef<'a> {
    fn from(wb: &'a Workbook) -> Self {
        WorkbookRef::Borrowed(wb)
    }
}

impl From<&Path> for WorkbookRef<'_> {
    fn from(path: &Path) -> Self {
        WorkbookRef::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for WorkbookRef<'_> {
    fn from(path: PathBuf) -> Self {
        WorkbookRef::Path(path)
    }
}

impl From<&str> for WorkbookRef<'_> {
    fn from(path: &str) -> Self {
        WorkbookRef::Path(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Text("hello".into()).to_string(), "hello");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(3.14).to_string(), "3.14");
        assert_eq!(CellValue::Float(10.0).to_string(), "10");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_cell_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Int(0).is_empty());
        assert_eq!(CellValue::from(""), CellValue::Empty);
    }

    #[test]
    fn test_worksheet_dimensions() {
        let sheet = Worksheet::new("S")
            .row(["a", "b", "c"])
            .row(["x"]);
        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.max_column(), 3);
        assert_eq!(sheet.cell(1, 0), &CellValue::Text("x".into()));
        assert_eq!(sheet.cell(1, 2), &CellValue::Empty);
        assert_eq!(sheet.cell(99, 99), &CellValue::Empty);
        assert!(sheet.row_cells(5).is_empty());
    }

    #[test]
    fn test_workbook_sheet_order() {
        let wb = Workbook::new()
            .with_sheet(Worksheet::new("First"))
            .with_sheet(Worksheet::new("Second"));
        assert_eq!(wb.sheet_names(), vec!["First", "Second"]);
        assert!(wb.sheet("Second").is_some());
        assert!(wb.sheet("Third").is_none());
    }

    #[test]
    fn test_workbook_ref_borrowed_resolves_without_copy() {
        let wb = Workbook::new().with_sheet(Worksheet::new("S"));
        let wref = WorkbookRef::from(&wb);
        let resolved = wref.resolve().unwrap();
        assert!(matches!(resolved, Cow::Borrowed(_)));
    }

    #[test]
    fn test_workbook_ref_missing_path() {
        let wref = WorkbookRef::from("/nonexistent/book.xlsx");
        assert!(wref.resolve().is_err());
    }
}
