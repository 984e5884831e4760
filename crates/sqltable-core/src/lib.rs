//! sqltable-core - tables from SQL queries in plain text documents
//!
//! Finds `sql-table` directives in a document, runs each query against a
//! spreadsheet, CSV file or SQLite database and replaces the directive with
//! an AsciiDoc table.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use sqltable_core::{render_document, Settings};
//!
//! let text = "\
//! .. sql-table:: People
//!    :source: people.xlsx
//!    :header: Name, Age
//!    :sql: SELECT name, age FROM People
//! ";
//! let rendered = render_document(text, Path::new("docs"), &Settings::default());
//! for diag in rendered.diagnostics.iter() {
//!     eprintln!("{diag}");
//! }
//! println!("{}", rendered.text);
//! ```

pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod error;
pub mod generator;
pub mod render;
pub mod sql_table;

pub use config::{EncodingPolicy, Settings};
pub use diagnostics::{Diagnostic, Diagnostics, Severity, Span};
pub use directive::{find_directives, DirectiveBlock, Driver, SqlTableDirective};
pub use error::{DirectiveError, Result};
pub use generator::{generate, generate_table, AsciiDoc};
pub use render::{render_document, Rendered};
pub use sql_table::{Expansion, SqlTableRunner};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
