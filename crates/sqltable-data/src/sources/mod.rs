//! Spreadsheet and CSV readers.
//!
//! Both readers load a whole file as a [`Workbook`](crate::workbook::Workbook)
//! for the importer.

pub mod csv;
pub mod excel;

pub use csv::{CsvOptions, CsvSource};
pub use excel::ExcelSource;
