//! AsciiDoc generator
//!
//! Renders the blocks a directive expands to as AsciiDoc text.
//!
//! # Example
//!
//! ```
//! use sqltable_ast::{Table, TableCell, TableRow};
//! use sqltable_core::generate_table;
//!
//! let table = Table {
//!     rows: vec![TableRow {
//!         cells: vec![TableCell::text("Ann"), TableCell::text("30")],
//!         is_header: false,
//!     }],
//!     ..Default::default()
//! };
//!
//! let asciidoc = generate_table(&table);
//! assert!(asciidoc.contains("|===\n| Ann\n| 30\n"));
//! ```

use std::fmt::{self, Display, Formatter, Write};

use sqltable_ast::{Alignment, Block, Inline, LiteralBlock, Paragraph, Table, TableCell};

/// Blocks formatted as AsciiDoc, separated by blank lines
pub struct AsciiDoc<'a>(pub &'a [Block]);

impl Display for AsciiDoc<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, block) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_block(f, block)?;
        }
        Ok(())
    }
}

/// Render blocks as AsciiDoc
pub fn generate(blocks: &[Block]) -> String {
    AsciiDoc(blocks).to_string()
}

/// Render one table as AsciiDoc
pub fn generate_table(table: &Table) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_table(&mut out, table);
    out
}

fn write_block(f: &mut impl Write, block: &Block) -> fmt::Result {
    match block {
        Block::Paragraph(p) => write_paragraph(f, p),
        Block::Table(t) => write_table(f, t),
        Block::Literal(l) => write_literal(f, l),
    }
}

fn write_paragraph(f: &mut impl Write, paragraph: &Paragraph) -> fmt::Result {
    write_inlines(f, &paragraph.inlines)?;
    writeln!(f)
}

fn write_inlines(f: &mut impl Write, inlines: &[Inline]) -> fmt::Result {
    for inline in inlines {
        match inline {
            Inline::Text(text) => f.write_str(text)?,
            Inline::Break => f.write_str(" +\n")?,
        }
    }
    Ok(())
}

fn write_table(f: &mut impl Write, table: &Table) -> fmt::Result {
    let widest_row = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    let col_count = table.column_count().max(widest_row);
    if col_count == 0 {
        return Ok(());
    }

    if let Some(ref caption) = table.caption {
        f.write_char('.')?;
        write_inlines(f, caption)?;
        writeln!(f)?;
    }

    write!(f, "[cols=\"{}\"", column_specs(table, col_count))?;
    if table.rows.first().is_some_and(|r| r.is_header) {
        write!(f, ",options=\"header\"")?;
    }
    if !table.roles.is_empty() {
        write!(f, ",role=\"{}\"", table.roles.join(" "))?;
    }
    writeln!(f, "]")?;

    writeln!(f, "|===")?;
    for (i, row) in table.rows.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        for cell in &row.cells {
            f.write_str("| ")?;
            write_cell(f, cell)?;
            writeln!(f)?;
        }
    }
    writeln!(f, "|===")
}

/// `cols` attribute: alignment, relative width and `h` for stub columns
fn column_specs(table: &Table, col_count: usize) -> String {
    (0..col_count)
        .map(|i| {
            let spec = table.columns.get(i);
            let align = match spec.and_then(|c| c.align.as_ref()) {
                Some(Alignment::Left) => "<",
                Some(Alignment::Center) => "^",
                Some(Alignment::Right) => ">",
                None => "",
            };
            let width = spec.and_then(|c| c.width).unwrap_or(1);
            let style = if i < table.stub_columns { "h" } else { "" };
            format!("{align}{width}{style}")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn write_cell(f: &mut impl Write, cell: &TableCell) -> fmt::Result {
    for (i, block) in cell.content.iter().enumerate() {
        if i > 0 {
            f.write_str(" +\n")?;
        }
        if let Block::Paragraph(p) = block {
            for inline in &p.inlines {
                match inline {
                    // a bare `|` would start a new cell
                    Inline::Text(text) => f.write_str(&text.replace('|', "\\|"))?,
                    Inline::Break => f.write_str(" +\n")?,
                }
            }
        }
    }
    Ok(())
}

fn write_literal(f: &mut impl Write, literal: &LiteralBlock) -> fmt::Result {
    if let Some(ref title) = literal.title {
        writeln!(f, ".{}", title.replace('\n', " "))?;
    }
    writeln!(f, "....")?;
    writeln!(f, "{}", literal.content)?;
    writeln!(f, "....")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqltable_ast::{ColumnSpec, TableRow};

    fn row(cells: &[&str], is_header: bool) -> TableRow {
        TableRow {
            cells: cells.iter().map(|c| TableCell::text(c)).collect(),
            is_header,
        }
    }

    fn people() -> Table {
        Table {
            rows: vec![
                row(&["Name", "Age"], true),
                row(&["Ann", "30"], false),
                row(&["Bo", "41"], false),
            ],
            caption: Some(vec![Inline::Text("People".to_string())]),
            columns: vec![
                ColumnSpec {
                    width: Some(2),
                    align: None,
                },
                ColumnSpec {
                    width: Some(1),
                    align: Some(Alignment::Right),
                },
            ],
            stub_columns: 0,
            roles: vec![],
        }
    }

    #[test]
    fn test_generate_table_with_header() {
        let expected = "\
.People
[cols=\"2,>1\",options=\"header\"]
|===
| Name
| Age

| Ann
| 30

| Bo
| 41
|===
";
        assert_eq!(generate_table(&people()), expected);
    }

    #[test]
    fn test_stub_columns_and_roles() {
        let mut table = people();
        table.rows.remove(0);
        table.caption = None;
        table.stub_columns = 1;
        table.roles = vec!["compact".to_string(), "striped".to_string()];

        let out = generate_table(&table);
        assert!(out.starts_with("[cols=\"2h,>1\",role=\"compact striped\"]\n|===\n"));
        assert!(!out.contains("options=\"header\""));
    }

    #[test]
    fn test_cell_escaping_and_breaks() {
        let table = Table {
            rows: vec![row(&["a|b", "line 1\nline 2"], false)],
            ..Default::default()
        };
        let out = generate_table(&table);
        assert!(out.contains("| a\\|b\n"));
        assert!(out.contains("| line 1 +\nline 2\n"));
        // missing column specs default to width 1
        assert!(out.starts_with("[cols=\"1,1\"]"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert_eq!(generate_table(&Table::default()), "");
    }

    #[test]
    fn test_generate_literal_and_paragraph() {
        let blocks = vec![
            Block::Paragraph(Paragraph::from_text("Before")),
            Block::Literal(LiteralBlock {
                content: ".. sql-table::\n   :sql: SELECT".to_string(),
                title: Some("Error with data\nin directive".to_string()),
            }),
        ];
        let out = generate(&blocks);
        assert_eq!(
            out,
            "Before\n\n.Error with data in directive\n....\n.. sql-table::\n   :sql: SELECT\n....\n"
        );
    }
}
