//! sqltable CLI - command-line interface library
//!
//! - Import: load a workbook or CSV file into SQLite
//! - Query: run one query against a source and print an AsciiDoc table
//! - Render: expand every `sql-table` directive in a document
//!
//! # Binary Usage
//!
//! ```bash
//! # Import every sheet into a database file
//! sqltable import book.xlsx --db book.sqlite
//!
//! # Print one table
//! sqltable query book.xlsx --sql "SELECT name, age FROM People" --header "Name, Age"
//!
//! # Expand directives
//! sqltable render report.adoc --output report.out.adoc
//! ```

pub mod app;

pub use app::{
    import_command, init_logging, load_settings, query_command, render_command, run_cli,
    OutputFormat, QueryArgs,
};
