//! Diagnostics reported while expanding `sql-table` directives
//!
//! A directive that cannot be expanded never aborts rendering. It is
//! replaced by an error block and leaves a [`Diagnostic`] behind for the
//! caller to print.

use serde::{Deserialize, Serialize};

/// Directive could not be parsed
pub const CODE_PARSE: &str = "SQLT001";
/// Directive parsed but its data could not be produced
pub const CODE_DATA: &str = "SQLT002";
/// Option accepted but ignored
pub const CODE_IGNORED: &str = "SQLT003";

/// A diagnostic message
///
/// # Example
///
/// ```
/// use sqltable_core::diagnostics::{Diagnostic, Span};
///
/// let diag = Diagnostic::error("Missing required option :sql:")
///     .with_code("SQLT001")
///     .with_span(Span::lines(3, 6))
///     .with_help("Add a :sql: option or write the query as the directive body");
/// assert!(diag.is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    pub message: String,

    /// Stable code such as "SQLT001"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Lines of the directive the diagnostic is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,

    /// Document the directive came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A range of source lines, 1-indexed and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            span: None,
            file: None,
            help: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl Span {
    /// Span covering `start_line..=end_line`
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line: end_line.max(start_line),
        }
    }

    /// Span covering one line
    pub fn line(line: usize) -> Self {
        Self::lines(line, line)
    }

    /// Number of lines covered
    pub fn len(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        match (&self.file, &self.span) {
            (Some(file), Some(span)) => write!(f, "\n  --> {}:{}", file, span.start_line)?,
            (Some(file), None) => write!(f, "\n  --> {}", file)?,
            (None, Some(span)) => write!(f, "\n  --> line {}", span.start_line)?,
            (None, None) => {}
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        Ok(())
    }
}

/// A collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Attach `file` to every diagnostic that has none yet
    pub fn set_file(&mut self, file: &str) {
        for diag in &mut self.diagnostics {
            if diag.file.is_none() {
                diag.file = Some(file.to_string());
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.diagnostics.extend(iter);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder() {
        let diag = Diagnostic::error("Unknown driver: oracle")
            .with_code(CODE_PARSE)
            .with_span(Span::lines(4, 8))
            .with_file("report.adoc")
            .with_help("Use one of xlsx, csv, sqlite");

        assert!(diag.is_error());
        assert_eq!(diag.code.as_deref(), Some("SQLT001"));
        assert_eq!(diag.file.as_deref(), Some("report.adoc"));
        assert_eq!(diag.span.map(|s| s.len()), Some(5));
    }

    #[test]
    fn test_span() {
        let span = Span::lines(3, 5);
        assert!(span.contains(3));
        assert!(span.contains(5));
        assert!(!span.contains(6));
        assert_eq!(Span::line(7).len(), 1);
        assert_eq!(Span::lines(9, 2), Span::line(9));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::error("first"));
        diags.push(Diagnostic::warning("second"));
        diags.push(Diagnostic::error("third").with_file("other.adoc"));
        diags.set_file("doc.adoc");

        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.warning_count(), 1);
        let files: Vec<_> = diags.iter().filter_map(|d| d.file.as_deref()).collect();
        assert_eq!(files, vec!["doc.adoc", "doc.adoc", "other.adoc"]);
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("Query failed: no such table: people")
            .with_code(CODE_DATA)
            .with_file("report.adoc")
            .with_span(Span::lines(12, 15))
            .with_help("Check the sheet name");

        let display = diag.to_string();
        assert!(display.starts_with("error[SQLT002]: Query failed"));
        assert!(display.contains("report.adoc:12"));
        assert!(display.contains("help: Check the sheet name"));
    }

    #[test]
    fn test_diagnostic_serialize() {
        let diag = Diagnostic::warning("encoding ignored").with_code(CODE_IGNORED);

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"SQLT003\""));
        assert!(!json.contains("span"));

        let restored: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, diag);
    }
}
