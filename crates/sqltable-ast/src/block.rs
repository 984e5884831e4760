//! Block-level elements
//!
//! A rendered `sql-table` directive produces either a `Table` block or, when
//! something goes wrong, a `Literal` block echoing the directive source next
//! to the reported diagnostic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::inline::Inline;

/// Block-level content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A literal block
    Literal(LiteralBlock),
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Inline content within the paragraph
    pub inlines: Vec<Inline>,
    /// Additional attributes (AsciiDoc roles, etc.)
    pub attributes: HashMap<String, String>,
}

impl Paragraph {
    /// Create a paragraph from (possibly multi-line) text
    pub fn from_text(text: &str) -> Self {
        Self {
            inlines: Inline::lines(text),
            attributes: HashMap::new(),
        }
    }
}

/// A table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Table rows, header rows first
    pub rows: Vec<TableRow>,
    /// Table caption (the directive title)
    pub caption: Option<Vec<Inline>>,
    /// Column specifications, one per column
    pub columns: Vec<ColumnSpec>,
    /// Number of leading columns rendered as row headers
    pub stub_columns: usize,
    /// Extra classes/roles attached to the table
    pub roles: Vec<String>,
}

impl Table {
    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Iterate over the header rows
    pub fn header_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| r.is_header)
    }

    /// Iterate over the body rows
    pub fn body_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| !r.is_header)
    }
}

/// A table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
    /// Whether this is a header row
    pub is_header: bool,
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content (blocks)
    pub content: Vec<Block>,
    /// Column span
    pub colspan: u32,
    /// Row span
    pub rowspan: u32,
    /// Horizontal alignment
    pub align: Option<Alignment>,
}

impl TableCell {
    /// Create a cell holding the given text; empty text gives an empty cell
    pub fn text(value: &str) -> Self {
        let content = if value.is_empty() {
            Vec::new()
        } else {
            vec![Block::Paragraph(Paragraph::from_text(value))]
        };

        Self {
            content,
            colspan: 1,
            rowspan: 1,
            align: None,
        }
    }

    /// Plain text of the cell, paragraphs joined with newlines
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(Inline::plain_text(&p.inlines)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Column specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Relative width (e.g., 1, 2, 3 for proportional sizing)
    pub width: Option<u32>,
    /// Default alignment for this column
    pub align: Option<Alignment>,
}

/// Text alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// A literal block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralBlock {
    /// The literal content
    pub content: String,
    /// Optional title/caption
    pub title: Option<String>,
}
