//! Whole-document rendering
//!
//! Every `sql-table` directive in a document is replaced by the AsciiDoc
//! its expansion generates. All other lines pass through unchanged.

use std::path::Path;

use tracing::info;

use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::directive::find_directives;
use crate::generator::generate;
use crate::sql_table::SqlTableRunner;

/// A rendered document
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Diagnostics,
    /// Number of directives found, failed ones included
    pub directives: usize,
}

/// Expand the directives of a document living in `doc_dir`
pub fn render_document(text: &str, doc_dir: &Path, settings: &Settings) -> Rendered {
    let text = text.replace("\r\n", "\n");
    let lines: Vec<&str> = text.lines().collect();
    let blocks = find_directives(&text);
    let runner = SqlTableRunner::new(doc_dir, settings);

    let mut out = String::with_capacity(text.len());
    let mut diagnostics = Diagnostics::new();
    let mut next = 0;

    for block in &blocks {
        for line in &lines[next..block.start] {
            out.push_str(line);
            out.push('\n');
        }
        let expansion = runner.expand(block);
        out.push_str(&generate(&expansion.blocks));
        diagnostics.extend(expansion.diagnostics);
        next = block.end;
    }
    for line in &lines[next..] {
        out.push_str(line);
        out.push('\n');
    }
    if !text.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }

    info!(
        directives = blocks.len(),
        errors = diagnostics.error_count(),
        "rendered document"
    );

    Rendered {
        text: out,
        diagnostics,
        directives: blocks.len(),
    }
}
