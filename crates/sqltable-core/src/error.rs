//! Error types for directive parsing and execution

use sqltable_data::{DataError, ImportError};
use thiserror::Error;

/// Result type for directive operations
pub type Result<T> = std::result::Result<T, DirectiveError>;

/// Errors raised while parsing or running a `sql-table` directive
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// Text does not start with a `sql-table` marker
    #[error("Not a sql-table directive")]
    NotADirective,

    #[error("Missing required option :{0}:")]
    MissingOption(&'static str),

    #[error("Unknown option :{0}:")]
    UnknownOption(String),

    #[error("Option :{0}: given more than once")]
    DuplicateOption(String),

    #[error("Invalid value {value:?} for option :{option}: ({reason})")]
    InvalidOption {
        option: String,
        value: String,
        reason: String,
    },

    #[error("Unknown driver: {0} (expected xlsx, csv or sqlite)")]
    UnknownDriver(String),

    /// Only UTF-8 sources can be read
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Reading the source, running the query or laying out the table failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Importing a workbook into the in-memory store failed
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl DirectiveError {
    pub(crate) fn invalid(option: &str, value: &str, reason: impl Into<String>) -> Self {
        DirectiveError::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the directive text itself is at fault, as opposed to its data
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, DirectiveError::Data(_) | DirectiveError::Import(_))
    }
}
