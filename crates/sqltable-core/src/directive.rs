//! `sql-table` directive parsing
//!
//! A directive is an explicit markup block in reStructuredText style:
//!
//! ```text
//! .. sql-table:: People over thirty
//!    :source: data.xlsx
//!    :header: Name, Age
//!    :widths: 2 1
//!
//!    SELECT name, age FROM People
//!    WHERE age > 30
//! ```
//!
//! The field list directly under the marker holds the options. A value may
//! continue on further lines indented past the option name. Everything
//! after the first blank line is the directive body and is appended to the
//! `:sql:` option, so long queries need not fit on one line.
//!
//! [`find_directives`] locates directive blocks in a document; each block
//! is parsed with [`SqlTableDirective::parse`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DirectiveError, Result};

/// Directive name as written after `..`
pub const DIRECTIVE_NAME: &str = "sql-table";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)\.\.[ \t]+sql-table::(?:[ \t]+(.*?))?[ \t]*$")
        .expect("marker pattern is valid")
});

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:([A-Za-z][A-Za-z0-9_-]*):(?:[ \t]+(.*?))?[ \t]*$")
        .expect("option pattern is valid")
});

/// How the directive's source is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Spreadsheet imported into an in-memory store
    #[default]
    Xlsx,
    /// CSV file imported as one table named after the file stem
    Csv,
    /// Existing SQLite database, opened read-only
    Sqlite,
}

impl FromStr for Driver {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "xls" | "excel" => Ok(Driver::Xlsx),
            "csv" => Ok(Driver::Csv),
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            _ => Err(DirectiveError::UnknownDriver(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Driver::Xlsx => "xlsx",
            Driver::Csv => "csv",
            Driver::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

/// A parsed `sql-table` directive.
///
/// Options left out of the directive stay `None` so that configuration
/// defaults can fill them in when the directive runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlTableDirective {
    /// Directive argument, used as the table caption
    pub title: Option<String>,
    /// Data source path, relative to the document's directory
    pub source: Option<String>,
    pub driver: Option<Driver>,
    /// Header labels; absent means the table has no header row
    pub header: Option<Vec<String>>,
    /// Relative column widths
    pub widths: Option<Vec<u32>>,
    /// Declared source encoding, lower-cased
    pub encoding: Option<String>,
    pub stub_columns: usize,
    /// Class names attached to the table
    pub classes: Vec<String>,
    /// Query text, option value followed by the directive body
    pub sql: String,
    /// The directive exactly as written
    pub block_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BodyState {
    /// Reading the field list under the marker
    Options,
    /// Past the first blank line, collecting query text
    Content,
}

impl SqlTableDirective {
    /// Parse one directive block, marker line first
    pub fn parse(block: &str) -> Result<Self> {
        let block = block.replace("\r\n", "\n");
        let mut lines = block.lines();

        let marker = lines.next().ok_or(DirectiveError::NotADirective)?;
        let caps = MARKER
            .captures(marker)
            .ok_or(DirectiveError::NotADirective)?;

        let mut directive = SqlTableDirective {
            title: caps
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty()),
            block_text: block.trim_end().to_string(),
            ..Default::default()
        };

        let body: Vec<&str> = lines.collect();
        let indent = common_indent(&body);

        let mut state = BodyState::Options;
        let mut options: Vec<(String, String)> = Vec::new();
        let mut content: Vec<&str> = Vec::new();

        for &line in &body {
            let line = if line.trim().is_empty() {
                ""
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start())
            };

            match state {
                BodyState::Options if line.is_empty() => {
                    state = BodyState::Content;
                }
                BodyState::Options => {
                    if let Some(caps) = OPTION.captures(line) {
                        let value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                        options.push((caps[1].to_ascii_lowercase(), value.to_string()));
                    } else if line.starts_with(char::is_whitespace) && !options.is_empty() {
                        if let Some((_, value)) = options.last_mut() {
                            if !value.is_empty() {
                                value.push(' ');
                            }
                            value.push_str(line.trim());
                        }
                    } else {
                        // no field list: the body starts right under the marker
                        state = BodyState::Content;
                        content.push(line);
                    }
                }
                BodyState::Content => content.push(line),
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for (name, value) in &options {
            if seen.contains(&name.as_str()) {
                return Err(DirectiveError::DuplicateOption(name.clone()));
            }
            seen.push(name);
            directive.set_option(name, value.trim())?;
        }

        while content.last().is_some_and(|l| l.trim().is_empty()) {
            content.pop();
        }
        while content.first().is_some_and(|l| l.trim().is_empty()) {
            content.remove(0);
        }
        if !content.is_empty() {
            let body = content.join("\n");
            if directive.sql.is_empty() {
                directive.sql = body;
            } else {
                directive.sql = format!("{}\n{}", directive.sql, body);
            }
        }

        if directive.sql.trim().is_empty() {
            return Err(DirectiveError::MissingOption("sql"));
        }

        Ok(directive)
    }

    /// Set one option by name, validating its value as the parser does
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "header" => {
                if value.is_empty() {
                    return Err(DirectiveError::invalid(
                        name,
                        value,
                        "expected comma-separated column labels",
                    ));
                }
                self.header = Some(value.split(',').map(|l| l.trim().to_string()).collect());
            }
            "widths" => self.widths = Some(parse_widths(value)?),
            "encoding" => {
                if value.is_empty() {
                    return Err(DirectiveError::invalid(name, value, "expected an encoding name"));
                }
                self.encoding = Some(value.to_ascii_lowercase());
            }
            "stub-columns" => {
                self.stub_columns = value.parse().map_err(|_| {
                    DirectiveError::invalid(name, value, "expected a non-negative integer")
                })?;
            }
            "class" => self.classes = parse_classes(value)?,
            "driver" => self.driver = Some(value.parse()?),
            "source" => {
                if value.is_empty() {
                    return Err(DirectiveError::invalid(name, value, "expected a path"));
                }
                self.source = Some(value.to_string());
            }
            "sql" => self.sql = value.to_string(),
            _ => return Err(DirectiveError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

/// Location of a directive inside a document
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveBlock {
    /// Zero-based index of the marker line
    pub start: usize,
    /// Zero-based index one past the last line of the block
    pub end: usize,
    /// Lines `start..end` joined with newlines
    pub text: String,
}

impl DirectiveBlock {
    /// 1-indexed line of the marker
    pub fn first_line(&self) -> usize {
        self.start + 1
    }

    /// 1-indexed last line of the block
    pub fn last_line(&self) -> usize {
        self.end
    }
}

/// Find every `sql-table` directive in `text`.
///
/// A block runs from its marker line through every following line that is
/// blank or indented deeper than the marker. Trailing blank lines are not
/// part of the block.
pub fn find_directives(text: &str) -> Vec<DirectiveBlock> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = MARKER.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let marker_indent = caps.get(1).map_or(0, |m| m.as_str().len());

        let start = i;
        let mut end = i + 1;
        let mut j = i + 1;
        while j < lines.len() {
            let line = lines[j];
            if line.trim().is_empty() {
                j += 1;
                continue;
            }
            if leading_whitespace(line) <= marker_indent {
                break;
            }
            j += 1;
            end = j;
        }

        blocks.push(DirectiveBlock {
            start,
            end,
            text: lines[start..end].join("\n"),
        });
        i = end;
    }

    blocks
}

fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn common_indent(lines: &[&str]) -> usize {
    lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| leading_whitespace(l))
        .min()
        .unwrap_or(0)
}

/// Positive integers separated by commas and/or whitespace
fn parse_widths(value: &str) -> Result<Vec<u32>> {
    let widths = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| w.parse::<u32>().ok().filter(|&n| n > 0))
        .collect::<Option<Vec<u32>>>();

    match widths {
        Some(widths) if !widths.is_empty() => Ok(widths),
        _ => Err(DirectiveError::invalid(
            "widths",
            value,
            "expected a list of positive integers",
        )),
    }
}

/// Whitespace separated class names, normalized to lower-case identifiers
fn parse_classes(value: &str) -> Result<Vec<String>> {
    let mut classes = Vec::new();
    for word in value.split_whitespace() {
        let class: String = word
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let class = class.trim_matches('-').to_string();
        if class.is_empty() || !class.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(DirectiveError::invalid("class", value, "not a valid class name"));
        }
        classes.push(class);
    }
    if classes.is_empty() {
        return Err(DirectiveError::invalid("class", value, "expected class names"));
    }
    Ok(classes)
}
