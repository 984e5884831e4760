//! Running a query and turning the result set into rows of text.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use crate::error::{DataError, Result};

/// A fully fetched result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRows {
    /// Result column names
    pub columns: Vec<String>,
    /// Row values rendered as text
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    /// Width of the widest row
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Execute `sql` and fetch every row.
///
/// `NULL` renders as an empty string, reals without a fractional part
/// render as integers and blobs as `<n bytes>`.
pub fn query_rows(conn: &Connection, sql: &str) -> Result<QueryRows> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(DataError::Query("no SQL statement given".to_string()));
    }

    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(value_to_text(row.get_ref(i)?));
        }
        rows.push(values);
    }

    debug!(rows = rows.len(), columns = width, "query finished");
    Ok(QueryRows { columns, rows })
}

/// Render one SQL value as cell text
pub fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (a text, b real, c blob);
             INSERT INTO t VALUES ('x', 42.0, NULL);
             INSERT INTO t VALUES (NULL, 2.5, x'0102');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_query_rows() {
        let result = query_rows(&conn(), "SELECT a, b, c FROM t ORDER BY b DESC").unwrap();

        assert_eq!(result.columns, vec!["a", "b", "c"]);
        assert_eq!(result.rows[0], vec!["x", "42", ""]);
        assert_eq!(result.rows[1], vec!["", "2.5", "<2 bytes>"]);
        assert_eq!(result.max_cols(), 3);
    }

    #[test]
    fn test_query_no_rows() {
        let result = query_rows(&conn(), "SELECT a FROM t WHERE 0").unwrap();
        assert_eq!(result.columns, vec!["a"]);
        assert!(result.rows.is_empty());
        assert_eq!(result.max_cols(), 0);
    }

    #[test]
    fn test_query_errors() {
        assert!(matches!(query_rows(&conn(), "  "), Err(DataError::Query(_))));
        assert!(matches!(
            query_rows(&conn(), "SELECT * FROM missing"),
            Err(DataError::Sqlite(_))
        ));
    }
}
