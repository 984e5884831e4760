//! Running a `sql-table` directive
//!
//! [`SqlTableRunner`] opens the directive's source with its driver, runs
//! the query and lays the rows out as a [`Table`]. [`SqlTableRunner::expand`]
//! never fails: a directive that cannot be run becomes a literal block
//! echoing its source, titled with the error, plus an error diagnostic.

use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;
use sqltable_ast::{Block, LiteralBlock, Table};
use sqltable_data::{
    query_rows, ConvertOptions, Connection, DataError, ImportLog, SheetImporter, TableConverter,
    Workbook,
};
use tracing::{debug, warn};

use crate::config::{EncodingPolicy, Settings};
use crate::diagnostics::{Diagnostic, Span, CODE_DATA, CODE_IGNORED, CODE_PARSE};
use crate::directive::{DirectiveBlock, Driver, SqlTableDirective, DIRECTIVE_NAME};
use crate::error::{DirectiveError, Result};

/// Encodings the readers understand
const UTF8_NAMES: &[&str] = &["utf-8", "utf8", "utf-8-sig", "ascii", "us-ascii"];

/// The blocks a directive expands to, and what went wrong along the way
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub blocks: Vec<Block>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs directives for documents in one directory
#[derive(Debug, Clone)]
pub struct SqlTableRunner<'a> {
    base_dir: PathBuf,
    settings: &'a Settings,
}

impl<'a> SqlTableRunner<'a> {
    /// Runner for a document living in `doc_dir`
    pub fn new(doc_dir: impl AsRef<Path>, settings: &'a Settings) -> Self {
        Self {
            base_dir: settings.directive.resolve_base_dir(doc_dir.as_ref()),
            settings,
        }
    }

    /// Directory sources are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute or base-relative path of the directive's source
    pub fn source_path(&self, directive: &SqlTableDirective) -> PathBuf {
        let source = directive
            .source
            .as_deref()
            .unwrap_or(&self.settings.directive.source);
        self.base_dir.join(source)
    }

    /// Driver the directive runs with
    pub fn driver(&self, directive: &SqlTableDirective) -> Driver {
        directive.driver.unwrap_or(self.settings.directive.driver)
    }

    /// Run the directive and build its table
    pub fn run(&self, directive: &SqlTableDirective) -> Result<Table> {
        self.check_encoding(directive)?;

        let driver = self.driver(directive);
        let path = self.source_path(directive);
        debug!(%driver, source = %path.display(), "running sql-table directive");

        let conn = self.open_store(driver, &path)?;
        let result = query_rows(&conn, &directive.sql)?;
        debug!(rows = result.rows.len(), max_cols = result.max_cols(), "query returned");

        let options = ConvertOptions {
            header: directive.header.clone(),
            widths: directive.widths.clone(),
            stub_columns: directive.stub_columns,
            default_alignment: None,
            caption: directive.title.clone(),
            roles: directive.classes.clone(),
        };
        Ok(TableConverter::convert(result.rows, options)?)
    }

    /// Parse and run one directive block from a document
    pub fn expand(&self, block: &DirectiveBlock) -> Expansion {
        let span = Span::lines(block.first_line(), block.last_line());

        let directive = match SqlTableDirective::parse(&block.text) {
            Ok(directive) => directive,
            Err(err) => return self.failure(&block.text, span, &err),
        };

        let mut diagnostics = Vec::new();
        if let Some(encoding) = self.ignored_encoding(&directive) {
            diagnostics.push(
                Diagnostic::warning(format!("Encoding {encoding:?} ignored; source read as UTF-8"))
                    .with_code(CODE_IGNORED)
                    .with_span(span),
            );
        }

        match self.run(&directive) {
            Ok(table) => Expansion {
                blocks: vec![Block::Table(table)],
                diagnostics,
            },
            Err(err) => {
                let mut failed = self.failure(&directive.block_text, span, &err);
                diagnostics.append(&mut failed.diagnostics);
                failed.diagnostics = diagnostics;
                failed
            }
        }
    }

    fn failure(&self, block_text: &str, span: Span, err: &DirectiveError) -> Expansion {
        warn!(line = span.start_line, error = %err, "sql-table directive failed");

        let message = format!("Error with data in \"{DIRECTIVE_NAME}\" directive: {err}");
        let code = if err.is_parse_error() { CODE_PARSE } else { CODE_DATA };
        let mut diagnostic = Diagnostic::error(message.clone())
            .with_code(code)
            .with_span(span);
        if let Some(help) = help_for(err) {
            diagnostic = diagnostic.with_help(help);
        }

        Expansion {
            blocks: vec![Block::Literal(LiteralBlock {
                content: block_text.to_string(),
                title: Some(message),
            })],
            diagnostics: vec![diagnostic],
        }
    }

    fn check_encoding(&self, directive: &SqlTableDirective) -> Result<()> {
        match &directive.encoding {
            Some(encoding)
                if !is_utf8(encoding)
                    && self.settings.directive.encoding == EncodingPolicy::Strict =>
            {
                Err(DirectiveError::UnsupportedEncoding(encoding.clone()))
            }
            _ => Ok(()),
        }
    }

    fn ignored_encoding<'d>(&self, directive: &'d SqlTableDirective) -> Option<&'d str> {
        directive
            .encoding
            .as_deref()
            .filter(|e| !is_utf8(e) && self.settings.directive.encoding == EncodingPolicy::Warn)
    }

    fn open_store(&self, driver: Driver, path: &Path) -> Result<Connection> {
        match driver {
            Driver::Xlsx => {
                let workbook = Workbook::open(path)?;
                self.import(&workbook)
            }
            Driver::Csv => {
                let options = self
                    .settings
                    .csv
                    .to_options()
                    .map_err(|e| DataError::Csv(e.to_string()))?;
                let workbook = Workbook::from_csv(path, options)?;
                self.import(&workbook)
            }
            Driver::Sqlite => open_read_only(path),
        }
    }

    fn import(&self, workbook: &Workbook) -> Result<Connection> {
        let mut importer = SheetImporter::in_memory()?
            .with_options(self.settings.import.to_options())
            .with_log(ImportLog::new(self.settings.import.verbosity));
        importer.load(workbook, None)?;
        Ok(importer.into_connection())
    }
}

fn is_utf8(encoding: &str) -> bool {
    UTF8_NAMES.contains(&encoding.to_ascii_lowercase().as_str())
}

fn help_for(err: &DirectiveError) -> Option<&'static str> {
    match err {
        DirectiveError::MissingOption(_) => {
            Some("Add a :sql: option or write the query as the directive body")
        }
        DirectiveError::UnknownDriver(_) => Some("Use one of xlsx, csv, sqlite"),
        DirectiveError::UnsupportedEncoding(_) => {
            Some("Convert the source to UTF-8 or set [directive] encoding = \"warn\"")
        }
        DirectiveError::Data(DataError::FileNotFound(_)) => {
            Some("Sources are resolved relative to the document's directory")
        }
        _ => None,
    }
}

/// Open an existing database without write access
fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(DataError::FileNotFound(path.display().to_string()).into());
    }
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(DataError::from)?;
    Ok(conn)
}
