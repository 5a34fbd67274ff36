//! Bridging between domain values and the PostgreSQL wire protocol.
//!
//! The record table has no compile-time row type, so rows are decoded by
//! inspecting each column's runtime `Type`, and parameters are bound through
//! a tagged-value wrapper. Field names are validated against the registry
//! before any of this runs; this module assumes identifiers are already
//! known-good.

use bytes::BytesMut;
use postgres_types::{to_sql_checked, IsNull, ToSql, Type};
use staffdir_core::{FieldValue, Record};
use tokio_postgres::Row;

// ============================================================================
// PARAMETER BINDING
// ============================================================================

/// Newtype binding a [`FieldValue`] as a SQL statement parameter.
#[derive(Debug, Clone)]
pub struct SqlValue(pub FieldValue);

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            FieldValue::Null => Ok(IsNull::Yes),
            FieldValue::Bool(b) => b.to_sql(ty, out),
            // Integer columns may be INT4 or INT8 depending on how the
            // column was declared; narrow when the wire type demands it.
            FieldValue::Int(i) => {
                if *ty == Type::INT4 {
                    let narrow = i32::try_from(*i)?;
                    narrow.to_sql(ty, out)
                } else if *ty == Type::INT2 {
                    let narrow = i16::try_from(*i)?;
                    narrow.to_sql(ty, out)
                } else {
                    i.to_sql(ty, out)
                }
            }
            FieldValue::Float(f) => {
                if *ty == Type::FLOAT4 {
                    (*f as f32).to_sql(ty, out)
                } else {
                    f.to_sql(ty, out)
                }
            }
            FieldValue::Text(s) => s.to_sql(ty, out),
            FieldValue::Date(d) => d.to_sql(ty, out),
            FieldValue::Timestamp(ts) => ts.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Values are coerced against the registry's declared type before
        // binding; a residual mismatch surfaces from to_sql instead.
        true
    }

    to_sql_checked!();
}

// ============================================================================
// ROW DECODING
// ============================================================================

/// Decode one value from a row by the column's runtime type.
fn decode_cell(row: &Row, idx: usize, ty: &Type) -> FieldValue {
    let value = match ty {
        t if *t == Type::BOOL => row.get::<_, Option<bool>>(idx).map(FieldValue::Bool),
        t if *t == Type::INT2 => row
            .get::<_, Option<i16>>(idx)
            .map(|v| FieldValue::Int(i64::from(v))),
        t if *t == Type::INT4 => row
            .get::<_, Option<i32>>(idx)
            .map(|v| FieldValue::Int(i64::from(v))),
        t if *t == Type::INT8 => row.get::<_, Option<i64>>(idx).map(FieldValue::Int),
        t if *t == Type::FLOAT4 => row
            .get::<_, Option<f32>>(idx)
            .map(|v| FieldValue::Float(f64::from(v))),
        t if *t == Type::FLOAT8 => row.get::<_, Option<f64>>(idx).map(FieldValue::Float),
        t if *t == Type::VARCHAR
            || *t == Type::TEXT
            || *t == Type::BPCHAR
            || *t == Type::NAME =>
        {
            row.get::<_, Option<String>>(idx).map(FieldValue::Text)
        }
        t if *t == Type::DATE => row
            .get::<_, Option<chrono::NaiveDate>>(idx)
            .map(FieldValue::Date),
        t if *t == Type::TIMESTAMPTZ => row
            .get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .map(FieldValue::Timestamp),
        t if *t == Type::TIMESTAMP => row
            .get::<_, Option<chrono::NaiveDateTime>>(idx)
            .map(|v| FieldValue::Timestamp(v.and_utc())),
        other => {
            tracing::debug!(column_type = %other, "Unsupported column type, returning null");
            None
        }
    };
    value.unwrap_or(FieldValue::Null)
}

/// Convert a full row into a [`Record`], preserving column order.
pub fn row_to_record(row: &Row) -> Record {
    let mut record = Record::new();
    for (idx, col) in row.columns().iter().enumerate() {
        record.push(col.name(), decode_cell(row, idx, col.type_()));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_binds_as_null() {
        let mut buf = BytesMut::new();
        let result = SqlValue(FieldValue::Null).to_sql(&Type::TEXT, &mut buf).unwrap();
        assert!(matches!(result, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_int_narrows_for_int4() {
        let mut buf = BytesMut::new();
        SqlValue(FieldValue::Int(7)).to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        SqlValue(FieldValue::Int(7)).to_sql(&Type::INT8, &mut buf).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_int_overflow_for_int4_errors() {
        let mut buf = BytesMut::new();
        let result = SqlValue(FieldValue::Int(i64::MAX)).to_sql(&Type::INT4, &mut buf);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_binds_utf8() {
        let mut buf = BytesMut::new();
        SqlValue(FieldValue::Text("jane".to_string()))
            .to_sql(&Type::VARCHAR, &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"jane");
    }

    #[test]
    fn test_accepts_everything() {
        assert!(SqlValue::accepts(&Type::TEXT));
        assert!(SqlValue::accepts(&Type::INT8));
        assert!(SqlValue::accepts(&Type::DATE));
    }
}
