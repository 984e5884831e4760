//! Table converter - assembles query rows into AST Table nodes.

use sqltable_ast::{Alignment, ColumnSpec, Inline, Table, TableCell, TableRow};

use crate::error::{DataError, Result};

/// Options for table conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Header labels; `None` produces a table without a header row
    pub header: Option<Vec<String>>,

    /// Relative column widths; must match the column count when given
    pub widths: Option<Vec<u32>>,

    /// Number of leading stub (row header) columns
    pub stub_columns: usize,

    /// Default column alignment
    pub default_alignment: Option<Alignment>,

    /// Table caption
    pub caption: Option<String>,

    /// Classes attached to the table
    pub roles: Vec<String>,
}

impl ConvertOptions {
    /// Create options with the given header labels
    pub fn with_header<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: Some(labels.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }
}

/// Converts raw tabular data to AST Table nodes
pub struct TableConverter;

impl TableConverter {
    /// Convert rows of text into a Table.
    ///
    /// The column count is the width of the widest row, header included.
    /// Short rows are padded with empty cells. Fails when there is no data
    /// at all, when `widths` does not match the column count, or when the
    /// stub columns would leave nothing for the body.
    pub fn convert(data: Vec<Vec<String>>, options: ConvertOptions) -> Result<Table> {
        let header_cols = options.header.as_ref().map(Vec::len).unwrap_or(0);
        let num_cols = data
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(header_cols);

        if num_cols == 0 {
            return Err(DataError::TableLayout(
                "no table data: the query returned no rows and no header was given".to_string(),
            ));
        }

        if options.stub_columns >= num_cols && !data.is_empty() {
            return Err(DataError::TableLayout(format!(
                "{} stub column(s) leave no data columns (table has {})",
                options.stub_columns, num_cols
            )));
        }

        let columns = Self::column_specs(num_cols, &options)?;

        let mut rows = Vec::with_capacity(data.len() + 1);
        if let Some(header) = options.header {
            rows.push(Self::create_row(header, num_cols, true));
        }
        for row_data in data {
            rows.push(Self::create_row(row_data, num_cols, false));
        }

        Ok(Table {
            rows,
            caption: options.caption.map(|c| vec![Inline::Text(c)]),
            columns,
            stub_columns: options.stub_columns,
            roles: options.roles,
        })
    }

    fn column_specs(num_cols: usize, options: &ConvertOptions) -> Result<Vec<ColumnSpec>> {
        let widths = match &options.widths {
            Some(widths) if widths.len() != num_cols => {
                return Err(DataError::TableLayout(format!(
                    "{} column widths given for {} columns",
                    widths.len(),
                    num_cols
                )));
            }
            Some(widths) => widths.clone(),
            None => vec![1; num_cols],
        };

        Ok(widths
            .into_iter()
            .map(|width| ColumnSpec {
                width: Some(width),
                align: options.default_alignment.clone(),
            })
            .collect())
    }

    /// Create a table row from raw data, padded to `num_cols`
    fn create_row(data: Vec<String>, num_cols: usize, is_header: bool) -> TableRow {
        let mut cells: Vec<TableCell> = data
            .iter()
            .take(num_cols)
            .map(|value| TableCell::text(value))
            .collect();

        while cells.len() < num_cols {
            cells.push(TableCell::text(""));
        }

        TableRow { cells, is_header }
    }
}
