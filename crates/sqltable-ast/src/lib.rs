//! sqltable-ast - Document node definitions
//!
//! This crate provides the node types that sqltable hands to the host
//! document pipeline: tables built from query results, plus the handful of
//! block and inline elements a table cell or a diagnostic can contain.

pub mod block;
pub mod inline;

pub use block::{Alignment, Block, ColumnSpec, LiteralBlock, Paragraph, Table, TableCell, TableRow};
pub use inline::Inline;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
