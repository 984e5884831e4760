//! Spreadsheet data source using calamine.
//!
//! Handles every format `calamine::open_workbook_auto` understands
//! (xlsx, xlsm, xlsb, xls, ods).

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::workbook::{CellValue, Workbook, Worksheet};

/// Spreadsheet file data source
pub struct ExcelSource {
    /// Path to the spreadsheet file
    path: PathBuf,
    /// Sheet names cache
    sheet_names: Vec<String>,
}

impl ExcelSource {
    /// Create a new source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        let workbook = open_workbook_auto(&path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path.display(), e)))?;

        let sheet_names = workbook.sheet_names().to_vec();

        Ok(Self { path, sheet_names })
    }

    /// Read every sheet into an in-memory [`Workbook`].
    ///
    /// Cell positions are absolute: a sheet whose used range starts at C3
    /// still has its first value at `(2, 2)`.
    pub fn read_workbook(&self) -> Result<Workbook> {
        let mut reader = open_workbook_auto(&self.path)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", self.path.display(), e)))?;

        let mut workbook = Workbook::new();
        for name in &self.sheet_names {
            let range = reader
                .worksheet_range(name)
                .map_err(|e| DataError::SheetNotFound(format!("{}: {}", name, e)))?;

            let rows = Self::range_to_rows(&range);
            debug!(sheet = %name, rows = rows.len(), "read worksheet");
            workbook.push(Worksheet::with_rows(name.clone(), rows));
        }

        Ok(workbook)
    }

    /// Convert a calamine cell to a workbook cell
    pub(crate) fn cell_value(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::from(s.as_str()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::DateTime(dt) => CellValue::DateTime(format!("{}", dt)),
            Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
            Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        }
    }

    /// Expand a calamine range into absolute-position rows
    fn range_to_rows(range: &Range<Data>) -> Vec<Vec<CellValue>> {
        let Some((end_row, end_col)) = range.end() else {
            return Vec::new();
        };

        (0..=end_row)
            .map(|r| {
                (0..=end_col)
                    .map(|c| {
                        range
                            .get_value((r, c))
                            .map(Self::cell_value)
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}
