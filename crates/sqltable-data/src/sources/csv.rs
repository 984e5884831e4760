//! CSV data source.
//!
//! A CSV file is a single-sheet workbook. The sheet is named after the file
//! stem so that it can be addressed as a table once imported.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{DataError, Result};
use crate::workbook::{CellValue, Workbook, Worksheet};

/// Reader settings
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// Strip whitespace around every field
    pub trim: bool,
    /// Accept records with differing field counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: false,
        }
    }
}

impl CsvOptions {
    /// Tab-separated values
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }
}

/// A CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }
        Ok(Self { path, options })
    }

    /// The file stem with characters outside `[A-Za-z0-9_ ]` replaced by
    /// `_`, prefixed with `_` when it would not start with a letter
    pub fn sheet_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let name: String = stem
            .chars()
            .map(|c| match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | ' ' => c,
                _ => '_',
            })
            .collect();

        if name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
            name
        } else {
            format!("_{name}")
        }
    }

    /// Visit records in file order, returning how many were read
    fn for_each_record(&self, mut visit: impl FnMut(&StringRecord)) -> Result<usize> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            // the header row is the importer's business
            .has_headers(false)
            .trim(if self.options.trim { Trim::All } else { Trim::None })
            .flexible(self.options.flexible)
            .from_reader(BufReader::new(file));

        let mut record = StringRecord::new();
        let mut seen = 0;
        while reader.read_record(&mut record)? {
            seen += 1;
            visit(&record);
        }
        Ok(seen)
    }

    /// The file as a one-sheet workbook; empty fields become empty cells
    pub fn read_workbook(&self) -> Result<Workbook> {
        let mut sheet = Worksheet::new(self.sheet_name());
        let count = self.for_each_record(|record| {
            sheet.push_row(record.iter().map(CellValue::from));
        })?;
        debug!(path = %self.path.display(), rows = count, "read csv");
        Ok(Workbook::new().with_sheet(sheet))
    }
}
