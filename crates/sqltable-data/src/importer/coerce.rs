//! Cell to SQL value coercion.

use rusqlite::types::Value;
use thiserror::Error;

use crate::importer::schema::ColumnType;
use crate::workbook::CellValue;

/// A cell value that does not fit its column type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value:?} to {target}")]
pub struct CoerceError {
    /// The cell in its plain string form
    pub value: String,
    /// Target type name
    pub target: String,
}

/// Convert a cell into a value bound to an `INSERT` parameter.
///
/// Empty cells become `NULL` whatever the column type. `Text` columns get
/// the cell's string form, `Real` columns a finite `f64`, and any other
/// declared type the plain string form.
pub fn coerce(value: &CellValue, kind: &ColumnType) -> Result<Value, CoerceError> {
    if value.is_empty() {
        return Ok(Value::Null);
    }

    match kind {
        ColumnType::Text | ColumnType::Other(_) => Ok(Value::Text(value.to_string())),
        ColumnType::Real => to_real(value).map(Value::Real).ok_or_else(|| CoerceError {
            value: value.to_string(),
            target: kind.to_string(),
        }),
    }
}

fn to_real(value: &CellValue) -> Option<f64> {
    let number = match value {
        CellValue::Int(i) => *i as f64,
        CellValue::Float(f) => *f,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_null_for_every_type() {
        for kind in [
            ColumnType::Text,
            ColumnType::Real,
            ColumnType::Other("date".to_string()),
        ] {
            assert_eq!(coerce(&CellValue::Empty, &kind).unwrap(), Value::Null);
            assert_eq!(coerce(&CellValue::Text(String::new()), &kind).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_text_keeps_quotes_verbatim() {
        let value = CellValue::Text("O'Brien \"Bob\"".to_string());
        assert_eq!(
            coerce(&value, &ColumnType::Text).unwrap(),
            Value::Text("O'Brien \"Bob\"".to_string())
        );
    }

    #[test]
    fn test_text_from_numbers() {
        assert_eq!(
            coerce(&CellValue::Int(30), &ColumnType::Text).unwrap(),
            Value::Text("30".to_string())
        );
        assert_eq!(
            coerce(&CellValue::Float(41.0), &ColumnType::Text).unwrap(),
            Value::Text("41".to_string())
        );
    }

    #[test]
    fn test_real_parses_text() {
        assert_eq!(
            coerce(&CellValue::Text("42".to_string()), &ColumnType::Real).unwrap(),
            Value::Real(42.0)
        );
        assert_eq!(
            coerce(&CellValue::Text(" 2.5 ".to_string()), &ColumnType::Real).unwrap(),
            Value::Real(2.5)
        );
        assert_eq!(
            coerce(&CellValue::Int(7), &ColumnType::Real).unwrap(),
            Value::Real(7.0)
        );
    }

    #[test]
    fn test_real_rejects_non_numbers() {
        let err = coerce(&CellValue::Text("forty".to_string()), &ColumnType::Real).unwrap_err();
        assert_eq!(err.value, "forty");
        assert_eq!(err.target, "real");

        assert!(coerce(&CellValue::Text("nan".to_string()), &ColumnType::Real).is_err());
        assert!(coerce(&CellValue::Bool(true), &ColumnType::Real).is_err());
        assert!(coerce(&CellValue::DateTime("2024-01-01".to_string()), &ColumnType::Real).is_err());
    }

    #[test]
    fn test_other_types_use_string_form() {
        let kind = ColumnType::Other("date".to_string());
        assert_eq!(
            coerce(&CellValue::DateTime("2024-01-01".to_string()), &kind).unwrap(),
            Value::Text("2024-01-01".to_string())
        );
        assert_eq!(
            coerce(&CellValue::Bool(false), &kind).unwrap(),
            Value::Text("false".to_string())
        );
    }
}
